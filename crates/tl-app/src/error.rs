//! Error types for the tl-app service layer.

use std::path::PathBuf;

/// Application error wrapping the backend crates' errors for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration validation failed: {0}")]
    Validation(String),

    #[error("Failed to read forcing file {path}: {message}")]
    ForcingFile { path: PathBuf, message: String },

    #[error("Model setup failed: {0}")]
    Model(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for tl-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<tl_project::ProjectError> for AppError {
    fn from(err: tl_project::ProjectError) -> Self {
        match err {
            tl_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Config(other.to_string()),
        }
    }
}

impl From<tl_lake::LakeError> for AppError {
    fn from(err: tl_lake::LakeError) -> Self {
        AppError::Model(err.to_string())
    }
}

impl From<tl_sim::SimError> for AppError {
    fn from(err: tl_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<tl_results::ResultsError> for AppError {
    fn from(err: tl_results::ResultsError) -> Self {
        match err {
            tl_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}
