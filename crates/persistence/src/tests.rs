use chrono::Utc;
use decision_core::{AnalystReports, Analyst};

use crate::file::{FileEvalSummarySink, FilePromptLogSink};
use crate::in_memory::{InMemoryDecisionRepository, InMemoryEvalSummarySink, InMemoryPromptLogSink};
use crate::sqlite::SqliteDecisionRepository;
use crate::traits::{DecisionRepository, EvalSummarySink, PromptLogSink};
use crate::types::{DecisionRow, EvalSummary, PromptLogEntry};

fn sample_entry() -> PromptLogEntry {
    PromptLogEntry {
        role_label: "Market Analyst".into(),
        system: "You are the Market Analyst.".into(),
        user: "Analyze AAPL.".into(),
        timestamp: Utc::now(),
    }
}

fn sample_row(run_id: &str) -> DecisionRow {
    DecisionRow {
        run_id: run_id.to_string(),
        symbol: "AAPL".into(),
        trade_date: "2025-10-26".into(),
        decision_token: "BUY".into(),
        investment_plan: Some("accumulate".into()),
        trader_plan: Some("enter on pullback".into()),
        risk_judge: Some("Final Recommendation: BUY".into()),
        model_id: "gpt-4o".into(),
        analysts: Analyst::CANONICAL_ORDER.to_vec(),
        orchestrator_version: "0.1.0".into(),
        prompt_hash: None,
        logs_path: None,
        execution_ms: Some(1200),
        payload_blob: serde_json::json!({"symbol": "AAPL"}),
        debate_extras_blob: serde_json::json!({}),
    }
}

#[tokio::test]
async fn in_memory_prompt_log_sink_scopes_entries_by_run_id() {
    let sink = InMemoryPromptLogSink::new();
    sink.append("run-1", sample_entry()).await.unwrap();
    sink.append("run-2", sample_entry()).await.unwrap();

    assert_eq!(sink.entries_for("run-1").len(), 1);
    assert_eq!(sink.entries_for("run-2").len(), 1);
    assert!(sink.entries_for("run-3").is_empty());
}

#[tokio::test]
async fn in_memory_decision_repository_round_trips_a_row() {
    let repo = InMemoryDecisionRepository::new();
    repo.insert(sample_row("run-1")).await.unwrap();

    let rows = repo.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].symbol, "AAPL");
}

// S6: persistence failure isolation — the repository fails, but the error
// never escapes as anything other than a `PersistResult` the caller can swallow.
#[tokio::test]
async fn in_memory_decision_repository_failing_mode_returns_error_without_panicking() {
    let repo = InMemoryDecisionRepository::failing();
    let err = repo.insert(sample_row("run-1")).await.unwrap_err();
    assert!(err.to_string().contains("simulated"));
    assert!(repo.rows().is_empty());
}

#[tokio::test]
async fn file_prompt_log_sink_appends_jsonl_lines() {
    let dir = tempfile::tempdir().unwrap();
    let sink = FilePromptLogSink::new(dir.path());

    sink.append("run-1", sample_entry()).await.unwrap();
    sink.append("run-1", sample_entry()).await.unwrap();

    let contents = tokio::fs::read_to_string(sink.log_path("run-1")).await.unwrap();
    assert_eq!(contents.lines().count(), 2);
    for line in contents.lines() {
        let parsed: PromptLogEntry = serde_json::from_str(line).unwrap();
        assert_eq!(parsed.role_label, "Market Analyst");
    }
}

#[tokio::test]
async fn file_eval_summary_sink_writes_one_json_file_per_run() {
    let dir = tempfile::tempdir().unwrap();
    let sink = FileEvalSummarySink::new(dir.path());

    let summary = EvalSummary {
        run_id: "run-1".into(),
        symbol: "AAPL".into(),
        trade_date: "2025-10-26".into(),
        decision_token: "BUY".into(),
        reports: AnalystReports::default(),
        investment_debate: None,
        risk_debate: None,
        debate_history: Vec::new(),
        risk_debate_history: Vec::new(),
    };
    sink.write(summary).await.unwrap();

    let contents = tokio::fs::read_to_string(sink.summary_path("run-1")).await.unwrap();
    let parsed: EvalSummary = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed.symbol, "AAPL");
    assert_eq!(parsed.decision_token, "BUY");
}

#[tokio::test]
async fn sqlite_decision_repository_round_trips_a_row() {
    let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
    let repo = SqliteDecisionRepository::new(pool).await.unwrap();
    repo.insert(sample_row("run-1")).await.unwrap();
    // Re-insert of the same run_id exercises the upsert path without erroring.
    repo.insert(sample_row("run-1")).await.unwrap();
}
