//! tl-results: run cache, trajectories and diagnostics files.

pub mod hash;
pub mod store;
pub mod types;

pub use hash::compute_run_id;
pub use store::RunStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },

    #[error("Non-finite {what} at t={t}; run not saved")]
    NonFinite { t: f64, what: &'static str },

    #[error("Diagnostics file, line {line}: {reason}")]
    Diagnostics { line: usize, reason: String },
}
