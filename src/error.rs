use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by a pipeline run.  Script failures are reported through
/// [`ScriptOutcome`](crate::script::ScriptOutcome) first and converted here
/// by the orchestrator when it aborts the run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("script {path} failed: {reason}")]
    ScriptFailed { path: PathBuf, reason: String },

    #[error("database error: {0}")]
    Db(#[from] duckdb::Error),

    #[error("report error: {0}")]
    Report(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<rust_xlsxwriter::XlsxError> for PipelineError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        PipelineError::Report(e.to_string())
    }
}
