use chat_model::{ChatMessage, ChatModel, ChatResult};
use decision_core::AnalystReports;

/// Input for the Trader persona (§4.2): the investment plan, every analyst's
/// report, and trader-scoped memories.
#[derive(Debug, Clone)]
pub struct TraderInput {
    pub company: String,
    pub trade_date: String,
    pub plan: Option<String>,
    pub reports: AnalystReports,
    pub past_memories: Option<String>,
}

const SYSTEM_PROMPT: &str = "You are the Trader. Translate the Research Manager's investment \
    plan into a concrete trading plan: entry considerations, sizing posture, and invalidation \
    conditions. You do not place orders or size positions numerically; describe the plan in \
    prose.";

pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

pub fn build_user_message(input: &TraderInput) -> String {
    let plan = input
        .plan
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "(no investment plan was produced)".to_string());
    let market = input.reports.market.clone().unwrap_or_else(|| "(no report)".into());
    let news = input.reports.news.clone().unwrap_or_else(|| "(no report)".into());
    let social = input.reports.social.clone().unwrap_or_else(|| "(no report)".into());
    let fundamentals = input
        .reports
        .fundamentals
        .clone()
        .unwrap_or_else(|| "(no report)".into());
    let memories = input
        .past_memories
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "(no relevant past memories)".to_string());

    format!(
        "Company: {}\nTrade date: {}\n\nInvestment plan:\n{plan}\n\n\
         Market report:\n{market}\n\nNews report:\n{news}\n\nSocial report:\n{social}\n\n\
         Fundamentals report:\n{fundamentals}\n\nPast trader memories:\n{memories}",
        input.company, input.trade_date
    )
}

pub async fn run_trader(model: &dyn ChatModel, input: &TraderInput) -> ChatResult<String> {
    let messages = vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::human(build_user_message(input)),
    ];
    model.invoke(&messages).await
}
