use chrono::{DateTime, Utc};
use decision_core::{AnalystReports, Analyst, DebateTurn};
use serde::{Deserialize, Serialize};

/// One turn of the prompt log (§6 "Prompt log"): appended once per
/// `ConversationLogEntry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptLogEntry {
    pub role_label: String,
    pub system: String,
    pub user: String,
    pub timestamp: DateTime<Utc>,
}

/// One-per-run summary snapshot (§6 "Eval summary").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalSummary {
    pub run_id: String,
    pub symbol: String,
    pub trade_date: String,
    pub decision_token: String,
    pub reports: AnalystReports,
    pub investment_debate: Option<String>,
    pub risk_debate: Option<String>,
    pub debate_history: Vec<DebateTurn>,
    pub risk_debate_history: Vec<DebateTurn>,
}

/// One persisted decision row (§6 "Decision row").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRow {
    pub run_id: String,
    pub symbol: String,
    pub trade_date: String,
    pub decision_token: String,
    pub investment_plan: Option<String>,
    pub trader_plan: Option<String>,
    pub risk_judge: Option<String>,
    pub model_id: String,
    pub analysts: Vec<Analyst>,
    pub orchestrator_version: String,
    pub prompt_hash: Option<String>,
    pub logs_path: Option<String>,
    pub execution_ms: Option<i64>,
    pub payload_blob: serde_json::Value,
    pub debate_extras_blob: serde_json::Value,
}
