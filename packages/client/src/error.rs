//! Client error types
use reqwest::StatusCode;
use thiserror::Error;

use regressivos_core::EditDecision;

/// Result type for backend calls
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The record can no longer be edited (expired SLA or finalized cycle).
    #[error("Edit rejected: {0}")]
    StaleEdit(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create an HTTP status error
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http {
            status: status.as_u16(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Local refusal from the edit gate
    pub fn denied(decision: EditDecision) -> Self {
        Self::StaleEdit(decision.to_string())
    }

    /// Check if this is a network-related error
    pub fn is_network_error(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }

    pub fn is_stale_edit(&self) -> bool {
        matches!(self, ClientError::StaleEdit(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::StaleEdit(_) => Some(StatusCode::FORBIDDEN.as_u16()),
            ClientError::NotFound(_) => Some(StatusCode::NOT_FOUND.as_u16()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(ClientError::Network("refused".into()).is_network_error());
        assert!(ClientError::StaleEdit("SLA vencido".into()).is_stale_edit());
        assert!(ClientError::NotFound("x".into()).is_not_found());
        assert!(!ClientError::config("bad").is_network_error());
    }

    #[test]
    fn test_display_and_status() {
        let err = ClientError::http(StatusCode::INTERNAL_SERVER_ERROR, "Erro ao iniciar SLA");
        assert_eq!(err.to_string(), "HTTP 500: Erro ao iniciar SLA");
        assert_eq!(err.status(), Some(500));
        assert_eq!(ClientError::StaleEdit(String::new()).status(), Some(403));
    }

    #[test]
    fn test_denied_carries_reason() {
        let err = ClientError::denied(EditDecision::Finalized);
        assert!(err.is_stale_edit());
        assert!(err.to_string().contains("finalizado"));
    }
}
