use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryStoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type MemoryResult<T> = Result<T, MemoryStoreError>;
