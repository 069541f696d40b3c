use thiserror::Error;

/// Errors raised while driving the decision graph (§7).
///
/// Configuration and transport failures from [`chat_model`] are fatal and
/// bubble straight through; recursion-limit overruns are this crate's own
/// fatal error (§4.4, §7 "Limits"). Memory and persistence failures never
/// reach this type — nodes that touch those repositories swallow and warn
/// internally (§7 "Persistence").
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("chat model error: {0}")]
    ChatModel(#[from] chat_model::ChatModelError),

    #[error("recursion limit of {0} node visits exceeded")]
    RecursionLimitExceeded(usize),

    #[error("{0}")]
    Other(String),
}

pub type GraphResult<T> = Result<T, GraphError>;
