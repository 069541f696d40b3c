use std::sync::Arc;

use crate::config::ChatModelConfig;
use crate::error::{ChatModelError, ChatResult};
use crate::google_compat::GoogleCompatModel;
use crate::openai_compat::OpenAiCompatModel;
use crate::provider::ChatModel;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_GROK_BASE_URL: &str = "https://api.x.ai/v1";
const DEFAULT_GOOGLE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Builds [`ChatModel`] instances from a model id, sharing one HTTP
/// connection pool across every provider, the way `ml_client::MLClient::new`
/// builds a single `reqwest::Client` reused by all of its sub-clients.
pub struct ChatModelFactory {
    client: reqwest::Client,
    config: ChatModelConfig,
}

impl ChatModelFactory {
    pub fn new(config: ChatModelConfig) -> ChatResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(20)
            .build()
            .map_err(ChatModelError::Transport)?;
        Ok(Self { client, config })
    }

    /// Resolve a provider from `model_id` and build a [`ChatModel`] for it.
    ///
    /// Resolution order (§4.1, §9): lowercase prefix `"gemini-"` or Google
    /// allow-list membership wins first; prefix `"grok"` or Grok allow-list
    /// membership next; otherwise OpenAI-compatible is the default.
    pub fn create_chat_model(
        &self,
        model_id: &str,
        temperature: f32,
    ) -> ChatResult<Arc<dyn ChatModel>> {
        let lower = model_id.to_ascii_lowercase();

        if lower.starts_with("gemini-") || self.config.google_model_allowlist.iter().any(|m| m.eq_ignore_ascii_case(model_id)) {
            let api_key = self.config.google_api_key.clone().ok_or_else(|| {
                ChatModelError::Configuration("GOOGLE_GENAI_API_KEY not set".into())
            })?;
            let base_url = self
                .config
                .google_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_GOOGLE_BASE_URL.to_string());
            return Ok(Arc::new(GoogleCompatModel::new(
                self.client.clone(),
                base_url,
                api_key,
                model_id.to_string(),
                temperature,
            )));
        }

        if lower.starts_with("grok") || self.config.grok_model_allowlist.iter().any(|m| m.eq_ignore_ascii_case(model_id)) {
            let api_key = self
                .config
                .grok_api_key
                .clone()
                .ok_or_else(|| ChatModelError::Configuration("GROK_API_KEY not set".into()))?;
            let base_url = self
                .config
                .grok_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_GROK_BASE_URL.to_string());
            return Ok(Arc::new(OpenAiCompatModel::new(
                self.client.clone(),
                base_url,
                api_key,
                model_id.to_string(),
                temperature,
                "xai",
            )));
        }

        let api_key = self
            .config
            .openai_api_key
            .clone()
            .ok_or_else(|| ChatModelError::Configuration("OPENAI_API_KEY not set".into()))?;
        let base_url = self
            .config
            .openai_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
        Ok(Arc::new(OpenAiCompatModel::new(
            self.client.clone(),
            base_url,
            api_key,
            model_id.to_string(),
            temperature,
            "openai",
        )))
    }
}
