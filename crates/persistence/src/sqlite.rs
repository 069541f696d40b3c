use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::error::PersistResult;
use crate::traits::DecisionRepository;
use crate::types::DecisionRow;

/// SQLite-backed [`DecisionRepository`], mirroring
/// `trading-agent::state_manager`'s `CREATE TABLE IF NOT EXISTS` idiom.
pub struct SqliteDecisionRepository {
    pool: SqlitePool,
}

impl SqliteDecisionRepository {
    pub async fn new(pool: SqlitePool) -> PersistResult<Self> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS decisions (
                run_id TEXT PRIMARY KEY,
                symbol TEXT NOT NULL,
                trade_date TEXT NOT NULL,
                decision_token TEXT NOT NULL,
                investment_plan TEXT,
                trader_plan TEXT,
                risk_judge TEXT,
                model_id TEXT NOT NULL,
                analysts TEXT NOT NULL,
                orchestrator_version TEXT NOT NULL,
                prompt_hash TEXT,
                logs_path TEXT,
                execution_ms INTEGER,
                payload_blob TEXT NOT NULL,
                debate_extras_blob TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl DecisionRepository for SqliteDecisionRepository {
    async fn insert(&self, row: DecisionRow) -> PersistResult<()> {
        let analysts_json = serde_json::to_string(&row.analysts)?;
        let payload_json = serde_json::to_string(&row.payload_blob)?;
        let extras_json = serde_json::to_string(&row.debate_extras_blob)?;

        sqlx::query(
            "INSERT INTO decisions (
                run_id, symbol, trade_date, decision_token, investment_plan, trader_plan,
                risk_judge, model_id, analysts, orchestrator_version, prompt_hash, logs_path,
                execution_ms, payload_blob, debate_extras_blob
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(run_id) DO UPDATE SET
                decision_token = excluded.decision_token,
                investment_plan = excluded.investment_plan,
                trader_plan = excluded.trader_plan,
                risk_judge = excluded.risk_judge,
                execution_ms = excluded.execution_ms",
        )
        .bind(&row.run_id)
        .bind(&row.symbol)
        .bind(&row.trade_date)
        .bind(&row.decision_token)
        .bind(&row.investment_plan)
        .bind(&row.trader_plan)
        .bind(&row.risk_judge)
        .bind(&row.model_id)
        .bind(analysts_json)
        .bind(&row.orchestrator_version)
        .bind(&row.prompt_hash)
        .bind(&row.logs_path)
        .bind(row.execution_ms)
        .bind(payload_json)
        .bind(extras_json)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
