use chrono::{DateTime, Utc};
use decision_core::Analyst;
use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// One progress event (§4.7). Each node emits at most one on entry; the
/// engine also emits a `finalizing` error event on any thrown exception
/// before rethrowing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub run_id: String,
    pub stage: Stage,
    pub label: String,
    pub percent: u8,
    pub message: Option<String>,
    pub iteration: Option<u32>,
    pub model_id: String,
    pub analysts: Vec<Analyst>,
    pub timestamp: DateTime<Utc>,
}

impl ProgressEvent {
    pub fn for_stage(
        run_id: impl Into<String>,
        stage: Stage,
        model_id: impl Into<String>,
        analysts: Vec<Analyst>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            stage,
            label: stage.label().to_string(),
            percent: stage.canonical_percent(),
            message: None,
            iteration: None,
            model_id: model_id.into(),
            analysts,
            timestamp: Utc::now(),
        }
    }

    pub fn with_iteration(mut self, iteration: u32) -> Self {
        self.iteration = Some(iteration);
        self
    }

    pub fn error(
        run_id: impl Into<String>,
        model_id: impl Into<String>,
        analysts: Vec<Analyst>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            stage: Stage::Finalizing,
            label: "Workflow error".to_string(),
            percent: Stage::Finalizing.canonical_percent(),
            message: Some(message.into()),
            iteration: None,
            model_id: model_id.into(),
            analysts,
            timestamp: Utc::now(),
        }
    }
}
