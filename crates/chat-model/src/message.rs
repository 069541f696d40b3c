use serde::{Deserialize, Serialize};

/// One message in a chat transcript sent to a provider. Only the two roles
/// the engine needs are modeled (§4.1: "system/human roles supported").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    System { content: String },
    Human { content: String },
}

impl ChatMessage {
    pub fn system<S: Into<String>>(content: S) -> Self {
        ChatMessage::System {
            content: content.into(),
        }
    }

    pub fn human<S: Into<String>>(content: S) -> Self {
        ChatMessage::Human {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            ChatMessage::System { content } => content,
            ChatMessage::Human { content } => content,
        }
    }
}
