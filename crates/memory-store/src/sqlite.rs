use async_trait::async_trait;
use chrono::{DateTime, Utc};
use decision_core::PersonaMemory;
use sqlx::SqlitePool;

use crate::embedder::cosine_similarity;
use crate::error::MemoryResult;
use crate::traits::{PersonaVectorStore, RoleSummaryStore, SituationEmbedder};

/// SQLite-backed [`RoleSummaryStore`], mirroring
/// `trading-agent::state_manager`'s `CREATE TABLE IF NOT EXISTS` +
/// `INSERT ... ON CONFLICT DO UPDATE` idiom.
pub struct SqliteRoleSummaryStore {
    pool: SqlitePool,
}

impl SqliteRoleSummaryStore {
    pub async fn new(pool: SqlitePool) -> MemoryResult<Self> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS role_summaries (
                role TEXT NOT NULL,
                symbol TEXT NOT NULL,
                date TEXT NOT NULL,
                summary TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (role, symbol, date)
            )",
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl RoleSummaryStore for SqliteRoleSummaryStore {
    async fn get_summary(&self, role: &str, symbol: &str, date: &str) -> MemoryResult<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT summary FROM role_summaries WHERE role = ? AND symbol = ? AND date = ?",
        )
        .bind(role)
        .bind(symbol)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(summary,)| summary))
    }

    async fn put_summary(
        &self,
        role: &str,
        symbol: &str,
        date: &str,
        summary: &str,
    ) -> MemoryResult<()> {
        sqlx::query(
            "INSERT INTO role_summaries (role, symbol, date, summary, updated_at)
             VALUES (?, ?, ?, ?, datetime('now'))
             ON CONFLICT(role, symbol, date)
             DO UPDATE SET summary = excluded.summary, updated_at = excluded.updated_at",
        )
        .bind(role)
        .bind(symbol)
        .bind(date)
        .bind(summary)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// SQLite-backed [`PersonaVectorStore`]. Embeddings are stored as a JSON
/// array of floats and scored in-process; the database itself knows nothing
/// about vector search (§9: embeddings are opaque to the repository
/// contract).
pub struct SqlitePersonaVectorStore {
    pool: SqlitePool,
}

impl SqlitePersonaVectorStore {
    pub async fn new(pool: SqlitePool) -> MemoryResult<Self> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS persona_memories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                persona TEXT NOT NULL,
                symbol TEXT NOT NULL,
                date TEXT NOT NULL,
                situation TEXT NOT NULL,
                recommendation TEXT NOT NULL,
                embedding TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl PersonaVectorStore for SqlitePersonaVectorStore {
    async fn top_k(
        &self,
        persona: &str,
        symbol: &str,
        situation: &str,
        k: usize,
    ) -> MemoryResult<Vec<String>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT recommendation, embedding FROM persona_memories WHERE persona = ? AND symbol = ?",
        )
        .bind(persona)
        .bind(symbol)
        .fetch_all(&self.pool)
        .await?;

        let embedder = crate::embedder::HashEmbedder;
        let query_embedding = embedder.embed(situation);

        let mut scored: Vec<(f32, String)> = Vec::with_capacity(rows.len());
        for (recommendation, embedding_json) in rows {
            let embedding: Vec<f32> = serde_json::from_str(&embedding_json)?;
            scored.push((cosine_similarity(&query_embedding, &embedding), recommendation));
        }
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored.into_iter().take(k).map(|(_, r)| r).collect())
    }

    async fn insert(&self, memory: PersonaMemory) -> MemoryResult<()> {
        let embedding_json = serde_json::to_string(&memory.embedding)?;
        let created_at: DateTime<Utc> = memory.created_at;
        sqlx::query(
            "INSERT INTO persona_memories (persona, symbol, date, situation, recommendation, embedding, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(memory.persona)
        .bind(memory.symbol)
        .bind(memory.date)
        .bind(memory.situation)
        .bind(memory.recommendation)
        .bind(embedding_json)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
