//! Core error types
use thiserror::Error;

use crate::validation::ValidationError;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// SLA rule violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlaError {
    #[error("SLA has not been started")]
    NotStarted,

    #[error("Extension must be a positive number of hours, got {0}")]
    InvalidHours(u32),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {}", format_validation(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Sla(#[from] SlaError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CoreError {
    pub fn is_validation_error(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
