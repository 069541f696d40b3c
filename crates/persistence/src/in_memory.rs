use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::PersistResult;
use crate::traits::{DecisionRepository, EvalSummarySink, PromptLogSink};
use crate::types::{DecisionRow, EvalSummary, PromptLogEntry};

/// In-memory [`PromptLogSink`] for tests: records every appended entry,
/// keyed by `run_id`, in append order.
#[derive(Default)]
pub struct InMemoryPromptLogSink {
    entries: Mutex<Vec<(String, PromptLogEntry)>>,
}

impl InMemoryPromptLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries_for(&self, run_id: &str) -> Vec<PromptLogEntry> {
        self.entries
            .lock()
            .expect("prompt log lock poisoned")
            .iter()
            .filter(|(id, _)| id == run_id)
            .map(|(_, entry)| entry.clone())
            .collect()
    }
}

#[async_trait]
impl PromptLogSink for InMemoryPromptLogSink {
    async fn append(&self, run_id: &str, entry: PromptLogEntry) -> PersistResult<()> {
        self.entries
            .lock()
            .expect("prompt log lock poisoned")
            .push((run_id.to_string(), entry));
        Ok(())
    }
}

/// In-memory [`EvalSummarySink`] for tests, keyed by `run_id`.
#[derive(Default)]
pub struct InMemoryEvalSummarySink {
    summaries: Mutex<Vec<EvalSummary>>,
}

impl InMemoryEvalSummarySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, run_id: &str) -> Option<EvalSummary> {
        self.summaries
            .lock()
            .expect("eval summary lock poisoned")
            .iter()
            .find(|s| s.run_id == run_id)
            .cloned()
    }
}

#[async_trait]
impl EvalSummarySink for InMemoryEvalSummarySink {
    async fn write(&self, summary: EvalSummary) -> PersistResult<()> {
        self.summaries
            .lock()
            .expect("eval summary lock poisoned")
            .push(summary);
        Ok(())
    }
}

/// In-memory [`DecisionRepository`] for tests. Can be configured to fail
/// every insert, to exercise the engine's best-effort persistence-failure
/// isolation (§7, S6).
#[derive(Default)]
pub struct InMemoryDecisionRepository {
    rows: Mutex<Vec<DecisionRow>>,
    fail_inserts: bool,
}

impl InMemoryDecisionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            fail_inserts: true,
        }
    }

    pub fn rows(&self) -> Vec<DecisionRow> {
        self.rows.lock().expect("decision rows lock poisoned").clone()
    }
}

#[async_trait]
impl DecisionRepository for InMemoryDecisionRepository {
    async fn insert(&self, row: DecisionRow) -> PersistResult<()> {
        if self.fail_inserts {
            return Err(crate::error::PersistenceError::Other(
                "simulated decision repository failure".to_string(),
            ));
        }
        self.rows.lock().expect("decision rows lock poisoned").push(row);
        Ok(())
    }
}
