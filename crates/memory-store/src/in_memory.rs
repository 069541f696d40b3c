use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use decision_core::PersonaMemory;

use crate::embedder::{cosine_similarity, HashEmbedder};
use crate::error::MemoryResult;
use crate::traits::{PersonaVectorStore, RoleSummaryStore, SituationEmbedder};

/// Cache-TTL for repeated `top_k` lookups inside one run (SPEC_FULL §11.2).
/// Purely a performance supplement; never changes results, mirroring
/// `AnalysisOrchestrator`'s `CacheEntry<T>`/`DashMap` pattern.
const TOP_K_CACHE_TTL: Duration = Duration::from_secs(30);

struct CacheEntry<T> {
    data: T,
    cached_at: std::time::Instant,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() < ttl
    }
}

/// In-memory [`RoleSummaryStore`], keyed by `(role, symbol, date)`.
#[derive(Default)]
pub struct InMemoryRoleSummaryStore {
    rows: DashMap<(String, String, String), String>,
}

impl InMemoryRoleSummaryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleSummaryStore for InMemoryRoleSummaryStore {
    async fn get_summary(&self, role: &str, symbol: &str, date: &str) -> MemoryResult<Option<String>> {
        let key = (role.to_string(), symbol.to_string(), date.to_string());
        Ok(self.rows.get(&key).map(|entry| entry.value().clone()))
    }

    async fn put_summary(
        &self,
        role: &str,
        symbol: &str,
        date: &str,
        summary: &str,
    ) -> MemoryResult<()> {
        let key = (role.to_string(), symbol.to_string(), date.to_string());
        self.rows.insert(key, summary.to_string());
        Ok(())
    }
}

/// In-memory [`PersonaVectorStore`] backed by a `DashMap<persona, Vec<PersonaMemory>>`
/// and a pluggable [`SituationEmbedder`].
pub struct InMemoryPersonaVectorStore {
    rows: DashMap<String, Vec<PersonaMemory>>,
    embedder: Arc<dyn SituationEmbedder>,
    top_k_cache: DashMap<(String, String, String, usize), CacheEntry<Vec<String>>>,
}

impl InMemoryPersonaVectorStore {
    pub fn new(embedder: Arc<dyn SituationEmbedder>) -> Self {
        Self {
            rows: DashMap::new(),
            embedder,
            top_k_cache: DashMap::new(),
        }
    }

    pub fn with_hash_embedder() -> Self {
        Self::new(Arc::new(HashEmbedder))
    }
}

#[async_trait]
impl PersonaVectorStore for InMemoryPersonaVectorStore {
    async fn top_k(
        &self,
        persona: &str,
        symbol: &str,
        situation: &str,
        k: usize,
    ) -> MemoryResult<Vec<String>> {
        let cache_key = (persona.to_string(), symbol.to_string(), situation.to_string(), k);
        if let Some(entry) = self.top_k_cache.get(&cache_key) {
            if entry.is_fresh(TOP_K_CACHE_TTL) {
                return Ok(entry.data.clone());
            }
        }

        let query_embedding = self.embedder.embed(situation);
        let mut candidates: Vec<(f32, &PersonaMemory)> = self
            .rows
            .get(persona)
            .map(|memories| {
                memories
                    .value()
                    .iter()
                    .filter(|m| m.symbol == symbol)
                    .map(|m| (cosine_similarity(&query_embedding, &m.embedding), m))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        let result: Vec<String> = candidates
            .into_iter()
            .take(k)
            .map(|(_, memory)| memory.recommendation.clone())
            .collect();

        self.top_k_cache.insert(
            cache_key,
            CacheEntry {
                data: result.clone(),
                cached_at: std::time::Instant::now(),
            },
        );
        Ok(result)
    }

    async fn insert(&self, memory: PersonaMemory) -> MemoryResult<()> {
        self.rows.entry(memory.persona.clone()).or_default().push(memory);
        Ok(())
    }
}

/// Build a [`PersonaMemory`] ready for insertion, stamping `created_at` now.
pub fn new_persona_memory(
    persona: impl Into<String>,
    symbol: impl Into<String>,
    date: impl Into<String>,
    situation: String,
    recommendation: String,
    embedding: Vec<f32>,
) -> PersonaMemory {
    PersonaMemory {
        persona: persona.into(),
        symbol: symbol.into(),
        date: date.into(),
        situation,
        recommendation,
        embedding,
        created_at: Utc::now(),
    }
}
