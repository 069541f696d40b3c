use chat_model::{ChatMessage, ChatModel, ChatResult};
use decision_core::AnalystReports;

/// Input for the Risk Manager persona (§4.2, §4.5): the trader plan, the
/// full risk-debate transcript, every analyst's report, and risk-manager
/// memories.
#[derive(Debug, Clone)]
pub struct RiskManagerInput {
    pub symbol: String,
    pub trade_date: String,
    pub trader_plan: Option<String>,
    pub risk_debate: Option<String>,
    pub reports: AnalystReports,
    pub past_memories: Option<String>,
}

const SYSTEM_PROMPT: &str = "You are the Risk Manager. Read the trader's plan and the full \
    Aggressive/Conservative/Neutral risk debate, then render a final, decisive trading verdict. \
    Close your response with a clear final recommendation.";

pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

pub fn build_user_message(input: &RiskManagerInput) -> String {
    let plan = input
        .trader_plan
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "(no trader plan was produced)".to_string());
    let debate = input
        .risk_debate
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "(no risk debate occurred)".to_string());
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
        "Symbol: {}\nTrade date: {}\n\nTrader plan:\n{plan}\n\nRisk debate transcript:\n{debate}\n\n\
         Market report:\n{market}\n\nNews report:\n{news}\n\nSocial report:\n{social}\n\n\
         Fundamentals report:\n{fundamentals}\n\nPast risk-manager memories:\n{memories}",
        input.symbol, input.trade_date
    )
}

pub async fn run_risk_manager(model: &dyn ChatModel, input: &RiskManagerInput) -> ChatResult<String> {
    let messages = vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::human(build_user_message(input)),
    ];
    model.invoke(&messages).await
}
