use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ChatModelError, ChatResult};
use crate::message::ChatMessage;
use crate::provider::ChatModel;

/// Chat-completion backend for Google's Gemini `generateContent` API, whose
/// wire shape (parts/contents, `systemInstruction`) differs from the
/// OpenAI-style backends.
pub struct GoogleCompatModel {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GoogleCompatModel {
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        api_key: String,
        model: String,
        temperature: f32,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            model,
            temperature,
        }
    }
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[async_trait]
impl ChatModel for GoogleCompatModel {
    async fn invoke(&self, messages: &[ChatMessage]) -> ChatResult<String> {
        let mut system_instruction = None;
        let mut contents = Vec::new();

        for message in messages {
            match message {
                ChatMessage::System { content } => {
                    system_instruction = Some(SystemInstruction {
                        parts: vec![Part {
                            text: content.clone(),
                        }],
                    });
                }
                ChatMessage::Human { content } => {
                    contents.push(Content {
                        role: "user",
                        parts: vec![Part {
                            text: content.clone(),
                        }],
                    });
                }
            }
        }

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            self.api_key
        );

        let request = GenerateContentRequest {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(ChatModelError::ServiceUnavailable(format!(
                "google returned {}",
                response.status()
            )));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| ChatModelError::InvalidResponse("google returned no candidates".into()))
    }

    fn backend_name(&self) -> &'static str {
        "google"
    }
}
