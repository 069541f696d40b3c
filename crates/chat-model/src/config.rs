use std::time::Duration;

/// Credentials, base URLs, and provider allow-lists needed to resolve and
/// build any [`crate::ChatModel`]. Owned by `decision-graph::EngineConfig`
/// and passed down rather than read from the environment here, so
/// `chat-model` stays free of env-var concerns (§10.3).
#[derive(Debug, Clone, Default)]
pub struct ChatModelConfig {
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,

    pub grok_api_key: Option<String>,
    pub grok_base_url: Option<String>,
    pub grok_model_allowlist: Vec<String>,

    pub google_api_key: Option<String>,
    pub google_base_url: Option<String>,
    pub google_model_allowlist: Vec<String>,

    /// Per-call HTTP timeout shared by every provider's client (§11.5).
    pub request_timeout: Duration,
}

impl ChatModelConfig {
    pub fn default_request_timeout() -> Duration {
        Duration::from_secs(60)
    }
}
