use anyhow::{Context, Result};
use chat_model::ChatModelConfig;

/// Every item enumerated in spec §6 "Configuration (enumerated)", loaded the
/// way `trading-agent::config::AgentConfig::from_env` does: required
/// provider credentials are validated lazily by `chat-model` itself
/// (resolution is name-based and happens there, not here), everything else
/// here has a sane default.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub default_trading_model: String,
    pub invest_debate_rounds: u32,
    pub risk_debate_rounds: u32,
    pub max_recursion_limit: usize,
    pub use_db_memories: bool,
    pub chat_model: ChatModelConfig,
    pub debug_langgraph: bool,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        let invest_debate_rounds: u32 = std::env::var("INVEST_DEBATE_ROUNDS")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .context("INVEST_DEBATE_ROUNDS must be a positive integer")?;
        let risk_debate_rounds: u32 = std::env::var("RISK_DEBATE_ROUNDS")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .context("RISK_DEBATE_ROUNDS must be a positive integer")?;
        let max_recursion_limit: usize = std::env::var("MAX_RECURSION_LIMIT")
            .unwrap_or_else(|_| default_recursion_limit(invest_debate_rounds, risk_debate_rounds).to_string())
            .parse()
            .context("MAX_RECURSION_LIMIT must be a positive integer")?;

        let chat_model = ChatModelConfig {
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            openai_base_url: std::env::var("OPENAI_BASE_URL").ok(),
            grok_api_key: std::env::var("GROK_API_KEY").ok(),
            grok_base_url: std::env::var("GROK_BASE_URL").ok(),
            grok_model_allowlist: parse_csv_list(std::env::var("GROK_MODEL_ALLOWLIST").unwrap_or_default()),
            google_api_key: std::env::var("GOOGLE_GENAI_API_KEY").ok(),
            google_base_url: std::env::var("GOOGLE_BASE_URL").ok(),
            google_model_allowlist: parse_csv_list(
                std::env::var("GOOGLE_MODEL_ALLOWLIST").unwrap_or_default(),
            ),
            request_timeout: ChatModelConfig::default_request_timeout(),
        };

        Ok(Self {
            default_trading_model: std::env::var("DEFAULT_TRADING_MODEL")
                .unwrap_or_else(|_| "gpt-4o".to_string()),
            invest_debate_rounds,
            risk_debate_rounds,
            max_recursion_limit,
            use_db_memories: std::env::var("USE_DB_MEMORIES")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(true),
            chat_model,
            debug_langgraph: std::env::var("DEBUG_LANGGRAPH")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }

    /// A fully-populated config with small round counts, for fast test loops
    /// (§10.3).
    pub fn for_tests() -> Self {
        Self {
            default_trading_model: "mock-model".to_string(),
            invest_debate_rounds: 1,
            risk_debate_rounds: 1,
            max_recursion_limit: default_recursion_limit(1, 1),
            use_db_memories: true,
            chat_model: ChatModelConfig::default(),
            debug_langgraph: false,
        }
    }
}

fn parse_csv_list(raw: String) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Default recursion ceiling: `4 * invest_rounds + 4 * risk_rounds + 8` node
/// visits (§4.4).
pub fn default_recursion_limit(invest_rounds: u32, risk_rounds: u32) -> usize {
    (4 * invest_rounds + 4 * risk_rounds + 8) as usize
}
