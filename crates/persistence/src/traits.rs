use async_trait::async_trait;

use crate::error::PersistResult;
use crate::types::{DecisionRow, EvalSummary, PromptLogEntry};

/// Append-only prompt log sink, one entry per LLM turn (§6).
#[async_trait]
pub trait PromptLogSink: Send + Sync {
    async fn append(&self, run_id: &str, entry: PromptLogEntry) -> PersistResult<()>;
}

/// One eval-summary write per run (§6).
#[async_trait]
pub trait EvalSummarySink: Send + Sync {
    async fn write(&self, summary: EvalSummary) -> PersistResult<()>;
}

/// Decision-row repository (§6, §9: "best-effort persistence... a sink
/// interface with `try_write(record)` returning success/failure; never
/// raised to the caller" — enforced by the graph catching and logging
/// errors from this trait, not by the trait itself swallowing them).
#[async_trait]
pub trait DecisionRepository: Send + Sync {
    async fn insert(&self, row: DecisionRow) -> PersistResult<()>;
}
