use chat_model::{ChatMessage, ChatModel, ChatResult};
use decision_core::Context;

use crate::support::channel_line;

/// Shared input for the Bull and Bear investment debaters (§4.2, §4.5).
/// `context` is already the *debate context* view — analyst reports
/// overriding raw preloaded channels — assembled by the caller.
#[derive(Debug, Clone)]
pub struct DebateInput {
    pub symbol: String,
    pub trade_date: String,
    pub context: Context,
    /// Cumulative `debate.investment` transcript so far, if any.
    pub history: Option<String>,
    /// The opposing debater's most recent turn, if any.
    pub opponent_argument: Option<String>,
    /// Persona-scoped long-term reflections pulled from memory (top-k=2).
    pub reflections: Option<String>,
    pub round: u32,
}

const BULL_SYSTEM_PROMPT: &str = "You are the Bull researcher. Build the strongest evidence-based \
    case for taking a long position, directly rebutting the Bear's most recent argument when one \
    exists. Be persuasive but honest about weaknesses in your own case.";

const BEAR_SYSTEM_PROMPT: &str = "You are the Bear researcher. Build the strongest evidence-based \
    case against taking a long position, directly rebutting the Bull's most recent argument when \
    one exists. Be persuasive but honest about weaknesses in your own case.";

pub fn bull_system_prompt() -> &'static str {
    BULL_SYSTEM_PROMPT
}

pub fn bear_system_prompt() -> &'static str {
    BEAR_SYSTEM_PROMPT
}

fn build_debate_user_message(input: &DebateInput) -> String {
    let technical = channel_line(
        "Market technicals",
        &input.context.market_technical_report,
        "get_market_technicals",
        &input.symbol,
    );
    let fundamentals = channel_line(
        "Fundamentals",
        &input.context.fundamentals_summary,
        "get_fundamentals_summary",
        &input.symbol,
    );
    let news = channel_line(
        "News",
        &input.context.news_company,
        "get_company_news",
        &input.symbol,
    );
    let social = channel_line(
        "Social sentiment",
        &input.context.social_reddit_summary,
        "get_social_sentiment",
        &input.symbol,
    );

    let history = input
        .history
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "(debate has not started)".to_string());
    let opponent = input
        .opponent_argument
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "(no opposing argument yet)".to_string());
    let reflections = input
        .reflections
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "(no relevant past reflections)".to_string());

    format!(
        "Symbol: {}\nTrade date: {}\nRound: {}\n\n{technical}\n\n{fundamentals}\n\n{news}\n\n{social}\n\n\
         Debate so far:\n{history}\n\nOpponent's latest argument:\n{opponent}\n\nYour past reflections:\n{reflections}",
        input.symbol, input.trade_date, input.round
    )
}

pub fn build_bull_user_message(input: &DebateInput) -> String {
    build_debate_user_message(input)
}

pub fn build_bear_user_message(input: &DebateInput) -> String {
    build_debate_user_message(input)
}

pub async fn run_bull(model: &dyn ChatModel, input: &DebateInput) -> ChatResult<String> {
    let messages = vec![
        ChatMessage::system(BULL_SYSTEM_PROMPT),
        ChatMessage::human(build_bull_user_message(input)),
    ];
    model.invoke(&messages).await
}

pub async fn run_bear(model: &dyn ChatModel, input: &DebateInput) -> ChatResult<String> {
    let messages = vec![
        ChatMessage::system(BEAR_SYSTEM_PROMPT),
        ChatMessage::human(build_bear_user_message(input)),
    ];
    model.invoke(&messages).await
}
