use async_trait::async_trait;
use chrono::Utc;
use decision_core::{
    is_preloaded, Analyst, AnalystReports, ConversationLogEntry, Context, Persona, ToolCallRecord,
};
use personas::analysts::{
    build_fundamentals_user_message, build_market_user_message, build_news_user_message,
    build_social_user_message, fundamentals_system_prompt, market_system_prompt,
    news_system_prompt, run_fundamentals_analyst, run_market_analyst, run_news_analyst,
    run_social_analyst, social_system_prompt, AnalystInput,
};

use crate::error::GraphResult;

/// Sink for the analyst sub-graph's tool-call log (§4.3, SPEC_FULL §11.4).
/// Decoupled from the graph the way `notification-service`'s
/// `NotificationChannel` decouples "what happened" from "where it goes";
/// flushed once at the end of the analysts stage, not per call.
#[async_trait]
pub trait ToolCallSink: Send + Sync {
    async fn record(&self, calls: Vec<ToolCallRecord>);
}

/// Discards the tool-call log. Used by callers that don't observe it.
pub struct NoopToolCallSink;

#[async_trait]
impl ToolCallSink for NoopToolCallSink {
    async fn record(&self, _calls: Vec<ToolCallRecord>) {}
}

/// Output of running the enabled analyst subset (§4.3).
pub struct AnalystsOutcome {
    pub reports: AnalystReports,
    pub conversation_log: Vec<ConversationLogEntry>,
    pub tool_calls: Vec<ToolCallRecord>,
}

/// For a channel NOT preloaded for an enabled analyst, synthesize the tool
/// call the corresponding `build_*_user_message` told the model to make —
/// keeping the logged call names in lock-step with the persona prompts.
fn synthesize_tool_calls(analyst: Analyst, context: &Context) -> Vec<ToolCallRecord> {
    let now = Utc::now();
    let persona = match analyst {
        Analyst::Market => Persona::MarketAnalyst,
        Analyst::News => Persona::NewsAnalyst,
        Analyst::Social => Persona::SocialAnalyst,
        Analyst::Fundamentals => Persona::FundamentalsAnalyst,
    };
    let channels: &[(&str, &Option<String>)] = match analyst {
        Analyst::Market => &[
            ("get_market_technicals", &context.market_technical_report),
            ("get_price_history", &context.market_price_history),
        ],
        Analyst::News => &[
            ("get_company_news", &context.news_company),
            ("get_global_news", &context.news_global),
        ],
        Analyst::Social => &[
            ("get_social_sentiment", &context.social_reddit_summary),
            ("get_reddit_discussion", &context.news_reddit),
        ],
        Analyst::Fundamentals => &[
            ("get_fundamentals_summary", &context.fundamentals_summary),
            ("get_balance_sheet", &context.fundamentals_balance_sheet),
            ("get_cashflow_statement", &context.fundamentals_cashflow),
            ("get_income_statement", &context.fundamentals_income_stmt),
            ("get_insider_transactions", &context.fundamentals_insider_transactions),
        ],
    };

    channels
        .iter()
        .filter(|(_, value)| !is_preloaded(value))
        .map(|(tool, _)| ToolCallRecord {
            persona,
            tool: tool.to_string(),
            args: serde_json::json!({}),
            result_summary: "fetched via tool".to_string(),
            timestamp: now,
        })
        .collect()
}

/// Run the enabled analyst subset sequentially, in execution order
/// (Market → News → Social → Fundamentals, filtered by `enabled`).
pub async fn run_analysts(
    model: &dyn chat_model::ChatModel,
    symbol: &str,
    trade_date: &str,
    context: &Context,
    enabled: &[Analyst],
) -> GraphResult<AnalystsOutcome> {
    let mut reports = AnalystReports::default();
    let mut conversation_log = Vec::new();
    let mut tool_calls = Vec::new();

    let input = AnalystInput {
        symbol: symbol.to_string(),
        trade_date: trade_date.to_string(),
        context: context.clone(),
    };

    for analyst in Analyst::EXECUTION_ORDER {
        if !enabled.contains(&analyst) {
            continue;
        }

        let (system, user, text) = match analyst {
            Analyst::Market => (
                market_system_prompt(),
                build_market_user_message(&input),
                run_market_analyst(model, &input).await,
            ),
            Analyst::News => (
                news_system_prompt(),
                build_news_user_message(&input),
                run_news_analyst(model, &input).await,
            ),
            Analyst::Social => (
                social_system_prompt(),
                build_social_user_message(&input),
                run_social_analyst(model, &input).await,
            ),
            Analyst::Fundamentals => (
                fundamentals_system_prompt(),
                build_fundamentals_user_message(&input),
                run_fundamentals_analyst(model, &input).await,
            ),
        };

        // Transport failure within one analyst fails soft: a partial report
        // replaces the text, the persona's log entry still records what was
        // asked (§4.5 "Analysts... Fails soft on tool errors").
        let report_text = match text {
            Ok(t) => t,
            Err(err) => {
                tracing::warn!(analyst = analyst.as_str(), error = %err, "analyst transport error, using partial report");
                format!("(partial report: analyst call failed: {err})")
            }
        };

        reports.set(analyst, report_text);
        conversation_log.push(ConversationLogEntry {
            role_label: persona_label(analyst).to_string(),
            system: system.to_string(),
            user,
        });
        tool_calls.extend(synthesize_tool_calls(analyst, context));
    }

    Ok(AnalystsOutcome {
        reports,
        conversation_log,
        tool_calls,
    })
}

fn persona_label(analyst: Analyst) -> &'static str {
    match analyst {
        Analyst::Market => Persona::MarketAnalyst.label(),
        Analyst::News => Persona::NewsAnalyst.label(),
        Analyst::Social => Persona::SocialAnalyst.label(),
        Analyst::Fundamentals => Persona::FundamentalsAnalyst.label(),
    }
}
