use chat_model::{ChatMessage, ChatModel, ChatResult};
use decision_core::AnalystReports;

/// Input for the Research Manager persona (§4.2): the full investment-debate
/// transcript, every analyst's report, and manager-scoped memories.
#[derive(Debug, Clone)]
pub struct ResearchManagerInput {
    pub symbol: String,
    pub trade_date: String,
    pub debate_history: Option<String>,
    pub reports: AnalystReports,
    pub past_memories: Option<String>,
}

const SYSTEM_PROMPT: &str = "You are the Research Manager. Read the full Bull/Bear debate and \
    the analyst reports, then render a clear, decisive investment plan with your reasoning. Do \
    not hedge into a non-answer.";

pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

pub fn build_user_message(input: &ResearchManagerInput) -> String {
    let debate = input
        .debate_history
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "(no debate occurred)".to_string());
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
        "Symbol: {}\nTrade date: {}\n\nInvestment debate transcript:\n{debate}\n\n\
         Market report:\n{market}\n\nNews report:\n{news}\n\nSocial report:\n{social}\n\n\
         Fundamentals report:\n{fundamentals}\n\nPast manager memories:\n{memories}",
        input.symbol, input.trade_date
    )
}

pub async fn run_research_manager(
    model: &dyn ChatModel,
    input: &ResearchManagerInput,
) -> ChatResult<String> {
    let messages = vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::human(build_user_message(input)),
    ];
    model.invoke(&messages).await
}
