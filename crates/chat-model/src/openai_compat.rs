use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ChatModelError, ChatResult};
use crate::message::ChatMessage;
use crate::provider::ChatModel;

/// Chat-completion backend for any OpenAI-compatible API (OpenAI itself, and
/// xAI's Grok endpoint, which speaks the same wire format). Mirrors
/// `ml-client::sentiment::SentimentClient`'s POST/deserialize/status-check
/// shape.
pub struct OpenAiCompatModel {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    backend_name: &'static str,
}

impl OpenAiCompatModel {
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        api_key: String,
        model: String,
        temperature: f32,
        backend_name: &'static str,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            model,
            temperature,
            backend_name,
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Deserialize)]
struct ChatCompletionMessage {
    content: Option<String>,
}

fn to_wire_messages(messages: &[ChatMessage]) -> Vec<WireMessage> {
    messages
        .iter()
        .map(|m| WireMessage {
            role: match m {
                ChatMessage::System { .. } => "system",
                ChatMessage::Human { .. } => "user",
            },
            content: m.content().to_string(),
        })
        .collect()
}

#[async_trait]
impl ChatModel for OpenAiCompatModel {
    async fn invoke(&self, messages: &[ChatMessage]) -> ChatResult<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: to_wire_messages(messages),
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ChatModelError::ServiceUnavailable(format!(
                "{} returned {}",
                self.backend_name,
                response.status()
            )));
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ChatModelError::InvalidResponse(format!("{} returned no choices", self.backend_name))
            })
    }

    fn backend_name(&self) -> &'static str {
        self.backend_name
    }
}
