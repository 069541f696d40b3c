use chat_model::{ChatMessage, ChatModel, ChatResult};

/// Shared input for the three risk-debate personas (§4.2, §4.5): the trader
/// plan, the running risk-debate transcript, the round counter, and the
/// latest turn from each sibling.
#[derive(Debug, Clone)]
pub struct RiskDebateInput {
    pub symbol: String,
    pub trade_date: String,
    pub trader_plan: Option<String>,
    pub history: Option<String>,
    pub round: u32,
    pub last_aggressive: Option<String>,
    pub last_conservative: Option<String>,
    pub last_neutral: Option<String>,
}

const AGGRESSIVE_SYSTEM_PROMPT: &str = "You are the Aggressive risk analyst. Argue for \
    embracing the trader's plan at full conviction, weighing upside against the other \
    analysts' caution.";

const CONSERVATIVE_SYSTEM_PROMPT: &str = "You are the Conservative risk analyst. Argue for \
    caution, capital preservation, and downside protection against the trader's plan.";

const NEUTRAL_SYSTEM_PROMPT: &str = "You are the Neutral risk analyst. Weigh the Aggressive and \
    Conservative positions evenhandedly and argue for a balanced middle path.";

pub fn aggressive_system_prompt() -> &'static str {
    AGGRESSIVE_SYSTEM_PROMPT
}

pub fn conservative_system_prompt() -> &'static str {
    CONSERVATIVE_SYSTEM_PROMPT
}

pub fn neutral_system_prompt() -> &'static str {
    NEUTRAL_SYSTEM_PROMPT
}

fn build_risk_user_message(input: &RiskDebateInput) -> String {
    let plan = input
        .trader_plan
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "(no trader plan was produced)".to_string());
    let history = input
        .history
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "(risk debate has not started)".to_string());
    let aggressive = input
        .last_aggressive
        .clone()
        .unwrap_or_else(|| "(no prior turn)".to_string());
    let conservative = input
        .last_conservative
        .clone()
        .unwrap_or_else(|| "(no prior turn)".to_string());
    let neutral = input
        .last_neutral
        .clone()
        .unwrap_or_else(|| "(no prior turn)".to_string());

    format!(
        "Symbol: {}\nTrade date: {}\nRound: {}\n\nTrader plan:\n{plan}\n\n\
         Risk debate so far:\n{history}\n\nAggressive's last turn:\n{aggressive}\n\n\
         Conservative's last turn:\n{conservative}\n\nNeutral's last turn:\n{neutral}",
        input.symbol, input.trade_date, input.round
    )
}

pub fn build_aggressive_user_message(input: &RiskDebateInput) -> String {
    build_risk_user_message(input)
}

pub fn build_conservative_user_message(input: &RiskDebateInput) -> String {
    build_risk_user_message(input)
}

pub fn build_neutral_user_message(input: &RiskDebateInput) -> String {
    build_risk_user_message(input)
}

pub async fn run_aggressive(model: &dyn ChatModel, input: &RiskDebateInput) -> ChatResult<String> {
    let messages = vec![
        ChatMessage::system(AGGRESSIVE_SYSTEM_PROMPT),
        ChatMessage::human(build_aggressive_user_message(input)),
    ];
    model.invoke(&messages).await
}

pub async fn run_conservative(model: &dyn ChatModel, input: &RiskDebateInput) -> ChatResult<String> {
    let messages = vec![
        ChatMessage::system(CONSERVATIVE_SYSTEM_PROMPT),
        ChatMessage::human(build_conservative_user_message(input)),
    ];
    model.invoke(&messages).await
}

pub async fn run_neutral(model: &dyn ChatModel, input: &RiskDebateInput) -> ChatResult<String> {
    let messages = vec![
        ChatMessage::system(NEUTRAL_SYSTEM_PROMPT),
        ChatMessage::human(build_neutral_user_message(input)),
    ];
    model.invoke(&messages).await
}
