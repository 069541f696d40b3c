//! End-to-end scenarios from spec.md §8 (S1-S6), driven through the public
//! `run_decision_graph` entry point with a mocked chat model and in-memory
//! collaborators.

use std::sync::Arc;

use chat_model::{ChatModel, MockChatModel};
use decision_core::{Analyst, Context, DecisionToken, Request, RunOptions};
use memory_store::{InMemoryPersonaVectorStore, InMemoryRoleSummaryStore};
use persistence::{InMemoryDecisionRepository, InMemoryEvalSummarySink, InMemoryPromptLogSink};
use progress::{RecordingProgressPublisher, Stage};

use crate::analysts::NoopToolCallSink;
use crate::config::EngineConfig;
use crate::control::RunControl;
use crate::error::GraphError;
use crate::graph::{ChatModelSource, GraphDependencies};

struct FixedModelSource {
    model: Arc<dyn ChatModel>,
}

impl ChatModelSource for FixedModelSource {
    fn create_chat_model(&self, _model_id: &str, _temperature: f32) -> crate::error::GraphResult<Arc<dyn ChatModel>> {
        Ok(self.model.clone())
    }
}

fn deps_with_model(model: Arc<dyn ChatModel>) -> (GraphDependencies, Arc<RecordingProgressPublisher>) {
    let progress = Arc::new(RecordingProgressPublisher::new());
    let deps = GraphDependencies {
        chat_model_source: Arc::new(FixedModelSource { model }),
        role_summary_store: Arc::new(InMemoryRoleSummaryStore::new()),
        persona_vector_store: Arc::new(InMemoryPersonaVectorStore::with_hash_embedder()),
        situation_embedder: Arc::new(memory_store::HashEmbedder),
        progress_publisher: progress.clone(),
        prompt_log_sink: Arc::new(InMemoryPromptLogSink::new()),
        eval_summary_sink: Arc::new(InMemoryEvalSummarySink::new()),
        decision_repository: Arc::new(InMemoryDecisionRepository::new()),
        tool_call_sink: Arc::new(NoopToolCallSink),
        run_control: Some(Arc::new(RunControl::new())),
    };
    (deps, progress)
}

fn full_context() -> Context {
    Context {
        market_technical_report: Some("RSI 55, above 50-day MA".to_string()),
        social_reddit_summary: Some("mixed sentiment, slight bullish tilt".to_string()),
        news_company: Some("product launch well received".to_string()),
        news_global: Some("rates steady".to_string()),
        fundamentals_summary: Some("revenue growth 12% YoY".to_string()),
        ..Context::default()
    }
}

fn request(symbol: &str, analysts: Option<Vec<String>>) -> Request {
    Request {
        symbol: symbol.to_string(),
        trade_date: "2025-10-26".to_string(),
        context: full_context(),
        model_id: None,
        analysts,
    }
}

// S1: happy path, all analysts.
#[tokio::test]
async fn s1_happy_path_all_analysts() {
    let model = Arc::new(MockChatModel::new("Final Recommendation: BUY"));
    let (mut deps, _progress) = deps_with_model(model);
    let decision_repository = Arc::new(InMemoryDecisionRepository::new());
    deps.decision_repository = decision_repository.clone();
    let config = EngineConfig::for_tests();

    let decision = crate::graph::run_decision_graph(
        request("AAPL", None),
        RunOptions { run_id: Some("run-s1".into()), ..Default::default() },
        &config,
        &deps,
    )
    .await
    .expect("run succeeds");

    assert_eq!(decision.decision, DecisionToken::Buy);
    assert_eq!(decision.final_trade_decision, DecisionToken::Buy);
    assert!(decision.market_report.is_some());
    assert!(decision.sentiment_report.is_some());
    assert!(decision.news_report.is_some());
    assert!(decision.fundamentals_report.is_some());
    assert!(decision.execution_ms.unwrap_or(-1) >= 0);

    assert_eq!(decision_repository.rows().len(), 1);
}

// S2: analysts=[market] only.
#[tokio::test]
async fn s2_subset_analysts_omits_other_reports() {
    let model = Arc::new(MockChatModel::new("Final Recommendation: BUY"));
    let (deps, _progress) = deps_with_model(model);
    let config = EngineConfig::for_tests();

    let decision = crate::graph::run_decision_graph(
        request("AAPL", Some(vec!["market".to_string()])),
        RunOptions { run_id: Some("run-s2".into()), ..Default::default() },
        &config,
        &deps,
    )
    .await
    .expect("run succeeds");

    assert_eq!(decision.analysts, vec![Analyst::Market]);
    assert!(decision.market_report.is_some());
    assert!(decision.sentiment_report.is_none());
    assert!(decision.news_report.is_none());
    assert!(decision.fundamentals_report.is_none());
    assert_eq!(decision.decision, DecisionToken::Buy);
}

// S3: ambiguous verdict falls back to regex last-token match.
#[tokio::test]
async fn s3_ambiguous_verdict_falls_back_to_regex() {
    let model = Arc::new(MockChatModel::new(
        "We weighed risks. HOLD might be sensible but BUY is also plausible.",
    ));
    let (deps, _progress) = deps_with_model(model);
    let config = EngineConfig::for_tests();

    let decision = crate::graph::run_decision_graph(
        request("AAPL", None),
        RunOptions { run_id: Some("run-s3".into()), ..Default::default() },
        &config,
        &deps,
    )
    .await
    .expect("run succeeds");

    assert_eq!(decision.decision, DecisionToken::Buy);
}

// S4: early termination via kill switch.
#[tokio::test]
async fn s4_kill_switch_stops_after_one_round() {
    let model = Arc::new(MockChatModel::new("Final Recommendation: HOLD"));
    let (mut deps, _progress) = deps_with_model(model);
    let control = Arc::new(RunControl::new());
    control.stop_investment_debate();
    deps.run_control = Some(control);

    let mut config = EngineConfig::for_tests();
    config.invest_debate_rounds = 5;

    let decision = crate::graph::run_decision_graph(
        request("AAPL", None),
        RunOptions { run_id: Some("run-s4".into()), ..Default::default() },
        &config,
        &deps,
    )
    .await
    .expect("run succeeds");

    // Bear+Bull still run exactly once before the predicate is checked.
    assert!(decision.bull_argument.is_some());
    assert!(decision.bear_argument.is_some());
    assert_eq!(decision.decision, DecisionToken::Hold);
}

// S5: recursion limit exceeded is fatal.
#[tokio::test]
async fn s5_recursion_limit_is_fatal() {
    let model = Arc::new(MockChatModel::new("Final Recommendation: BUY"));
    let (deps, progress) = deps_with_model(model);

    let mut config = EngineConfig::for_tests();
    config.invest_debate_rounds = 50;
    config.max_recursion_limit = 10;

    let result = crate::graph::run_decision_graph(
        request("AAPL", None),
        RunOptions { run_id: Some("run-s5".into()), ..Default::default() },
        &config,
        &deps,
    )
    .await;

    assert!(matches!(result, Err(GraphError::RecursionLimitExceeded(10))));
    let events = progress.events();
    let last = events.last().expect("at least one event published");
    assert_eq!(last.stage, Stage::Finalizing);
    assert!(last.message.is_some());
}

// S6: persistence failure isolation — Decision is still returned.
#[tokio::test]
async fn s6_decision_repository_failure_does_not_fail_the_run() {
    let model = Arc::new(MockChatModel::new("Final Recommendation: SELL"));
    let (mut deps, progress) = deps_with_model(model);
    deps.decision_repository = Arc::new(InMemoryDecisionRepository::failing());

    let config = EngineConfig::for_tests();
    let decision = crate::graph::run_decision_graph(
        request("AAPL", None),
        RunOptions { run_id: Some("run-s6".into()), ..Default::default() },
        &config,
        &deps,
    )
    .await
    .expect("decision is still returned despite persistence failure");

    assert_eq!(decision.decision, DecisionToken::Sell);
    let events = progress.events();
    assert_eq!(events.last().unwrap().stage, Stage::Finalizing);
    assert_eq!(events.last().unwrap().percent, 100);
}

// P1/P2/P3: round counts and history lengths after loop exit. The eval
// summary sink carries the raw `debate_history`/`risk_debate_history`
// lists, so it's the vantage point for these invariants (the public
// `Decision` only exposes the synthesized transcripts).
#[tokio::test]
async fn p1_p2_p3_history_lengths_match_round_counts() {
    let model = Arc::new(MockChatModel::new("Final Recommendation: HOLD"));
    let (mut deps, _progress) = deps_with_model(model);
    let eval_summary_sink = Arc::new(InMemoryEvalSummarySink::new());
    deps.eval_summary_sink = eval_summary_sink.clone();

    let mut config = EngineConfig::for_tests();
    config.invest_debate_rounds = 2;
    config.risk_debate_rounds = 2;
    config.max_recursion_limit = crate::config::default_recursion_limit(2, 2);

    let decision = crate::graph::run_decision_graph(
        request("AAPL", None),
        RunOptions { run_id: Some("run-p123".into()), ..Default::default() },
        &config,
        &deps,
    )
    .await
    .expect("run succeeds");

    assert_eq!(decision.decision, DecisionToken::Hold);

    let summary = eval_summary_sink.get("run-p123").expect("eval summary written");
    // P1: len(debateHistory) == invest_round * 2 (Bear+Bull per round).
    assert_eq!(summary.debate_history.len(), 4);
    // P2: len(riskDebateHistory) == risk_round * 3.
    assert_eq!(summary.risk_debate_history.len(), 6);
}

// B1: investDebateRounds=1 -> exactly one Bear->Bull pair.
#[tokio::test]
async fn b1_single_invest_round_produces_one_pair() {
    let model = Arc::new(MockChatModel::new("Final Recommendation: BUY"));
    let (deps, progress) = deps_with_model(model);
    let config = EngineConfig::for_tests();

    crate::graph::run_decision_graph(
        request("AAPL", None),
        RunOptions { run_id: Some("run-b1".into()), ..Default::default() },
        &config,
        &deps,
    )
    .await
    .expect("run succeeds");

    let investment_debate_events: Vec<_> = progress
        .events()
        .into_iter()
        .filter(|e| e.stage == Stage::InvestmentDebate)
        .collect();
    // One entry event (no iteration) plus no further iterations since the
    // round ceiling of 1 is met after the first Bear+Bull pair.
    assert_eq!(investment_debate_events.len(), 1);
    assert!(investment_debate_events[0].iteration.is_none());
}

// B2: fully blank context still yields non-empty analyst reports.
#[tokio::test]
async fn b2_blank_context_still_produces_reports() {
    let model = Arc::new(MockChatModel::new("Final Recommendation: HOLD"));
    let (deps, _progress) = deps_with_model(model);
    let config = EngineConfig::for_tests();

    let mut payload = request("AAPL", None);
    payload.context = Context::default();

    let decision = crate::graph::run_decision_graph(
        payload,
        RunOptions { run_id: Some("run-b2".into()), ..Default::default() },
        &config,
        &deps,
    )
    .await
    .expect("run succeeds");

    assert!(decision.market_report.as_deref().unwrap_or("").len() > 0);
}
