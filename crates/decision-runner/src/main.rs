//! decision-runner: a small demonstration binary that wires every
//! collaborator the decision graph needs and runs it once for a single
//! symbol/date, printing the resulting `Decision` as pretty JSON.
//!
//! Not a server, no authentication, no public contract — SPEC_FULL §13.
//!
//! Usage:
//!   cargo run -p decision-runner -- --symbol AAPL --trade-date 2025-10-26
//!   DECISION_RUNNER_MOCK=1 cargo run -p decision-runner -- --symbol AAPL --trade-date 2025-10-26 --analysts market,news

use std::sync::Arc;

use anyhow::Result;
use chat_model::{ChatModel, ChatModelFactory, MockChatModel};
use clap::Parser;
use decision_core::{Context, Request, RunOptions, ToolCallRecord};
use decision_graph::{ChatModelSource, EngineConfig, GraphDependencies, GraphResult, RunControl, ToolCallSink};
use memory_store::{HashEmbedder, InMemoryPersonaVectorStore, InMemoryRoleSummaryStore};
use persistence::{InMemoryDecisionRepository, InMemoryEvalSummarySink, InMemoryPromptLogSink};
use progress::RecordingProgressPublisher;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run the trading-decision orchestration engine once", long_about = None)]
struct Cli {
    /// Ticker symbol, e.g. AAPL
    #[arg(long)]
    symbol: String,

    /// Trade date, e.g. 2025-10-26
    #[arg(long)]
    trade_date: String,

    /// Comma-separated analyst subset (market,social,news,fundamentals); empty = all
    #[arg(long, value_delimiter = ',')]
    analysts: Vec<String>,

    /// Model id override; defaults to EngineConfig::default_trading_model
    #[arg(long)]
    model_id: Option<String>,

    /// Pre-loaded market technical report (skips the tool-call path for that channel)
    #[arg(long)]
    market_report: Option<String>,

    /// Pre-loaded news company report
    #[arg(long)]
    news_report: Option<String>,

    /// Pre-loaded social/reddit summary
    #[arg(long)]
    social_report: Option<String>,

    /// Pre-loaded fundamentals summary
    #[arg(long)]
    fundamentals_report: Option<String>,
}

/// Routes to a real provider-backed model, or a fixed [`MockChatModel`] reply
/// when `DECISION_RUNNER_MOCK=1` — lets the binary run end to end with no
/// API keys configured, the way SPEC_FULL §13 specifies.
struct MockChatModelSource;

impl ChatModelSource for MockChatModelSource {
    fn create_chat_model(&self, _model_id: &str, _temperature: f32) -> GraphResult<Arc<dyn ChatModel>> {
        Ok(Arc::new(MockChatModel::new(
            "Final Recommendation: BUY\n\nThe combined analyst and debate evidence favors accumulation.",
        )))
    }
}

struct RealChatModelSource {
    factory: ChatModelFactory,
}

impl ChatModelSource for RealChatModelSource {
    fn create_chat_model(&self, model_id: &str, temperature: f32) -> GraphResult<Arc<dyn ChatModel>> {
        Ok(self.factory.create_chat_model(model_id, temperature)?)
    }
}

/// Logs each analyst-stage tool call through `tracing` rather than
/// discarding it, so a human running the binary can see what was fetched.
struct LoggingToolCallSink;

#[async_trait::async_trait]
impl ToolCallSink for LoggingToolCallSink {
    async fn record(&self, calls: Vec<ToolCallRecord>) {
        for call in calls {
            tracing::info!(persona = ?call.persona, tool = %call.tool, "tool call");
        }
    }
}

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    std::panic::set_hook(Box::new(|info| {
        tracing::error!("PANIC: {info}");
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    tracing::info!(symbol = %cli.symbol, trade_date = %cli.trade_date, "starting decision-runner");

    let config = EngineConfig::from_env()?;

    let use_mock = std::env::var("DECISION_RUNNER_MOCK")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let chat_model_source: Arc<dyn ChatModelSource> = if use_mock {
        tracing::info!("DECISION_RUNNER_MOCK=1: using MockChatModel, no provider credentials required");
        Arc::new(MockChatModelSource)
    } else {
        Arc::new(RealChatModelSource {
            factory: ChatModelFactory::new(config.chat_model.clone())?,
        })
    };

    let context = Context {
        market_technical_report: cli.market_report,
        news_company: cli.news_report,
        social_reddit_summary: cli.social_report,
        fundamentals_summary: cli.fundamentals_report,
        ..Context::default()
    };

    let payload = Request {
        symbol: cli.symbol,
        trade_date: cli.trade_date,
        context,
        model_id: cli.model_id,
        analysts: if cli.analysts.is_empty() { None } else { Some(cli.analysts) },
    };

    let run_id = uuid::Uuid::new_v4().to_string();
    let options = RunOptions {
        run_id: Some(run_id.clone()),
        model_id: None,
        analysts: None,
    };

    let progress_publisher = Arc::new(RecordingProgressPublisher::new());

    let deps = GraphDependencies {
        chat_model_source,
        role_summary_store: Arc::new(InMemoryRoleSummaryStore::new()),
        persona_vector_store: Arc::new(InMemoryPersonaVectorStore::with_hash_embedder()),
        situation_embedder: Arc::new(HashEmbedder),
        progress_publisher: progress_publisher.clone(),
        prompt_log_sink: Arc::new(InMemoryPromptLogSink::new()),
        eval_summary_sink: Arc::new(InMemoryEvalSummarySink::new()),
        decision_repository: Arc::new(InMemoryDecisionRepository::new()),
        tool_call_sink: Arc::new(LoggingToolCallSink),
        run_control: Some(Arc::new(RunControl::new())),
    };

    let decision = decision_graph::run_decision_graph(payload, options, &config, &deps).await?;

    for event in progress_publisher.events() {
        tracing::info!(stage = ?event.stage, percent = event.percent, "progress");
    }

    println!("{}", serde_json::to_string_pretty(&decision)?);
    tracing::info!(run_id = %run_id, decision = %decision.decision, "decision-runner finished");

    Ok(())
}
