//! Collector error types

use thiserror::Error;

use crate::types::ApiFailure;

/// Result type for collector operations
pub type CollectorResult<T> = Result<T, CollectorError>;

/// Collector error types
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Assessment submission failed: {reason}")]
    SubmissionFailed { reason: ApiFailure },
}

impl CollectorError {
    pub fn config(message: impl Into<String>) -> Self {
        CollectorError::ConfigError {
            message: message.into(),
        }
    }
}
