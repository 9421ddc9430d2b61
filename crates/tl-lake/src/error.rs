//! Error types for model setup and diagnostics output.

use thiserror::Error;
use tl_sim::SimError;

#[derive(Error, Debug)]
pub enum LakeError {
    #[error("Invalid forcing: {reason}")]
    InvalidForcing { reason: String },

    #[error("Invalid parameters: {reason}")]
    InvalidParameters { reason: String },

    #[error("Diagnostics write failed: {0}")]
    Diagnostics(#[from] std::io::Error),
}

pub type LakeResult<T> = Result<T, LakeError>;

impl From<LakeError> for SimError {
    fn from(e: LakeError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}
