use thiserror::Error;

/// Errors raised while building or merging [`crate::types::GraphState`].
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid decision token: {0}")]
    InvalidDecisionToken(String),

    #[error("invalid analyst name: {0}")]
    InvalidAnalyst(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
