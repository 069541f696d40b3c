use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::PersistResult;
use crate::traits::{EvalSummarySink, PromptLogSink};
use crate::types::{EvalSummary, PromptLogEntry};

/// Filesystem-backed [`PromptLogSink`] (§6 "Prompt log"): one JSON-lines
/// file per run under `root_dir`, appended one entry per LLM turn.
pub struct FilePromptLogSink {
    root_dir: PathBuf,
}

impl FilePromptLogSink {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn log_path(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(format!("{run_id}.prompts.jsonl"))
    }
}

#[async_trait]
impl PromptLogSink for FilePromptLogSink {
    async fn append(&self, run_id: &str, entry: PromptLogEntry) -> PersistResult<()> {
        fs::create_dir_all(&self.root_dir).await?;
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path(run_id))
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }
}

/// Filesystem-backed [`EvalSummarySink`] (§6 "Eval summary"): one pretty-printed
/// JSON file per run under `root_dir`.
pub struct FileEvalSummarySink {
    root_dir: PathBuf,
}

impl FileEvalSummarySink {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn summary_path(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(format!("{run_id}.eval.json"))
    }
}

#[async_trait]
impl EvalSummarySink for FileEvalSummarySink {
    async fn write(&self, summary: EvalSummary) -> PersistResult<()> {
        fs::create_dir_all(&self.root_dir).await?;
        let path: &Path = &self.summary_path(&summary.run_id);
        let body = serde_json::to_string_pretty(&summary)?;
        fs::write(path, body).await?;
        Ok(())
    }
}
