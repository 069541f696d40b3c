use async_trait::async_trait;
use decision_core::PersonaMemory;

use crate::error::MemoryResult;

/// Structured memory keyed by symbol+date+role (§3, C4). Production
/// deployments back this with whatever store the platform already has; the
/// engine only needs get/put.
#[async_trait]
pub trait RoleSummaryStore: Send + Sync {
    async fn get_summary(&self, role: &str, symbol: &str, date: &str) -> MemoryResult<Option<String>>;

    async fn put_summary(
        &self,
        role: &str,
        symbol: &str,
        date: &str,
        summary: &str,
    ) -> MemoryResult<()>;
}

/// Situation-embedding similarity lookup, persona-scoped (§3, §9). The
/// repository treats embeddings as opaque vectors; similarity search is an
/// implementation detail of each backend.
#[async_trait]
pub trait PersonaVectorStore: Send + Sync {
    /// Return up to `k` recommendation strings for the persona/symbol pair,
    /// most similar to `situation` first.
    async fn top_k(
        &self,
        persona: &str,
        symbol: &str,
        situation: &str,
        k: usize,
    ) -> MemoryResult<Vec<String>>;

    async fn insert(&self, memory: PersonaMemory) -> MemoryResult<()>;
}

/// Turns situation text into a fixed-length embedding (§9: "Embedding model
/// is a collaborator, not part of the core").
pub trait SituationEmbedder: Send + Sync {
    fn embed(&self, text: &str) -> Vec<f32>;
}
