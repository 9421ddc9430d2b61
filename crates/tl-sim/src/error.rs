//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered during transient simulation.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical state at t={t}: {what}")]
    NonPhysical { t: f64, what: &'static str },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<tl_core::TlError> for SimError {
    fn from(e: tl_core::TlError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}
