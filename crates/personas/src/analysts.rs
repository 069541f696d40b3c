use chat_model::{ChatMessage, ChatModel, ChatResult};
use decision_core::Context;

use crate::support::{channel_line, collaboration_header};

/// Shared input shape for all four analyst personas (§4.2): each sees the
/// full [`Context`], not just the channels it specializes in.
#[derive(Debug, Clone)]
pub struct AnalystInput {
    pub symbol: String,
    pub trade_date: String,
    pub context: Context,
}

const MARKET_SYSTEM_PROMPT: &str = "You are the Market Analyst. Assess price action, trend, and \
    technical posture for the given symbol. Be concrete about levels and indicators; avoid \
    generic commentary.";

const NEWS_SYSTEM_PROMPT: &str = "You are the News Analyst. Summarize company-specific and \
    macro news relevant to the symbol's near-term outlook, weighing source credibility and \
    recency.";

const SOCIAL_SYSTEM_PROMPT: &str = "You are the Social Media Analyst. Summarize retail \
    sentiment and discussion volume from social and forum chatter, distinguishing signal from \
    noise.";

const FUNDAMENTALS_SYSTEM_PROMPT: &str = "You are the Fundamentals Analyst. Assess the \
    company's financial health from its statements and insider activity, and state whether \
    fundamentals support or undermine a bullish thesis.";

pub fn market_system_prompt() -> &'static str {
    MARKET_SYSTEM_PROMPT
}

pub fn build_market_user_message(input: &AnalystInput) -> String {
    let header = collaboration_header("Market Analyst");
    let technical = channel_line(
        "Technical report",
        &input.context.market_technical_report,
        "get_market_technicals",
        &input.symbol,
    );
    let price_history = channel_line(
        "Price history",
        &input.context.market_price_history,
        "get_price_history",
        &input.symbol,
    );
    format!(
        "{header}\n\nSymbol: {}\nTrade date: {}\n\n{technical}\n\n{price_history}",
        input.symbol, input.trade_date
    )
}

pub async fn run_market_analyst(model: &dyn ChatModel, input: &AnalystInput) -> ChatResult<String> {
    let messages = vec![
        ChatMessage::system(MARKET_SYSTEM_PROMPT),
        ChatMessage::human(build_market_user_message(input)),
    ];
    model.invoke(&messages).await
}

pub fn news_system_prompt() -> &'static str {
    NEWS_SYSTEM_PROMPT
}

pub fn build_news_user_message(input: &AnalystInput) -> String {
    let header = collaboration_header("News Analyst");
    let company_news = channel_line(
        "Company news",
        &input.context.news_company,
        "get_company_news",
        &input.symbol,
    );
    let global_news = channel_line(
        "Global/macro news",
        &input.context.news_global,
        "get_global_news",
        &input.symbol,
    );
    format!(
        "{header}\n\nSymbol: {}\nTrade date: {}\n\n{company_news}\n\n{global_news}",
        input.symbol, input.trade_date
    )
}

pub async fn run_news_analyst(model: &dyn ChatModel, input: &AnalystInput) -> ChatResult<String> {
    let messages = vec![
        ChatMessage::system(NEWS_SYSTEM_PROMPT),
        ChatMessage::human(build_news_user_message(input)),
    ];
    model.invoke(&messages).await
}

pub fn social_system_prompt() -> &'static str {
    SOCIAL_SYSTEM_PROMPT
}

pub fn build_social_user_message(input: &AnalystInput) -> String {
    let header = collaboration_header("Social Media Analyst");
    let reddit_summary = channel_line(
        "Reddit summary",
        &input.context.social_reddit_summary,
        "get_social_sentiment",
        &input.symbol,
    );
    let reddit_posts = channel_line(
        "Reddit discussion",
        &input.context.news_reddit,
        "get_reddit_discussion",
        &input.symbol,
    );
    format!(
        "{header}\n\nSymbol: {}\nTrade date: {}\n\n{reddit_summary}\n\n{reddit_posts}",
        input.symbol, input.trade_date
    )
}

pub async fn run_social_analyst(model: &dyn ChatModel, input: &AnalystInput) -> ChatResult<String> {
    let messages = vec![
        ChatMessage::system(SOCIAL_SYSTEM_PROMPT),
        ChatMessage::human(build_social_user_message(input)),
    ];
    model.invoke(&messages).await
}

pub fn fundamentals_system_prompt() -> &'static str {
    FUNDAMENTALS_SYSTEM_PROMPT
}

pub fn build_fundamentals_user_message(input: &AnalystInput) -> String {
    let header = collaboration_header("Fundamentals Analyst");
    let summary = channel_line(
        "Fundamentals summary",
        &input.context.fundamentals_summary,
        "get_fundamentals_summary",
        &input.symbol,
    );
    let balance_sheet = channel_line(
        "Balance sheet",
        &input.context.fundamentals_balance_sheet,
        "get_balance_sheet",
        &input.symbol,
    );
    let cashflow = channel_line(
        "Cash flow statement",
        &input.context.fundamentals_cashflow,
        "get_cashflow_statement",
        &input.symbol,
    );
    let income_stmt = channel_line(
        "Income statement",
        &input.context.fundamentals_income_stmt,
        "get_income_statement",
        &input.symbol,
    );
    let insider = channel_line(
        "Insider transactions",
        &input.context.fundamentals_insider_transactions,
        "get_insider_transactions",
        &input.symbol,
    );
    format!(
        "{header}\n\nSymbol: {}\nTrade date: {}\n\n{summary}\n\n{balance_sheet}\n\n{cashflow}\n\n{income_stmt}\n\n{insider}",
        input.symbol, input.trade_date
    )
}

pub async fn run_fundamentals_analyst(
    model: &dyn ChatModel,
    input: &AnalystInput,
) -> ChatResult<String> {
    let messages = vec![
        ChatMessage::system(FUNDAMENTALS_SYSTEM_PROMPT),
        ChatMessage::human(build_fundamentals_user_message(input)),
    ];
    model.invoke(&messages).await
}
