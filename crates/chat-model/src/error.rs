use thiserror::Error;

/// Errors raised constructing or invoking a [`crate::ChatModel`].
#[derive(Error, Debug)]
pub enum ChatModelError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("provider unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("invalid response from provider: {0}")]
    InvalidResponse(String),

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type ChatResult<T> = Result<T, ChatModelError>;
