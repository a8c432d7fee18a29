use std::fmt;

use regressivos_client::ClientError;
use regressivos_core::EditDecision;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Short message shown after a user-initiated action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    /// Maps a failed action to what the operator should read.
    pub fn from_error(err: &ClientError) -> Self {
        match err {
            ClientError::Network(_) => {
                Self::error("Não foi possível conectar ao servidor. Tente novamente.")
            }
            ClientError::StaleEdit(reason) => Self::warning(reason.clone()),
            ClientError::NotFound(what) => Self::error(format!("Não encontrado: {}", what)),
            other => Self::error(other.to_string()),
        }
    }

    pub fn from_decision(decision: EditDecision) -> Self {
        if decision.is_allowed() {
            Self::info(decision.to_string())
        } else {
            Self::warning(decision.to_string())
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let n = Notification::from_error(&ClientError::Network("refused".into()));
        assert_eq!(n.level, NotificationLevel::Error);

        let n = Notification::from_error(&ClientError::StaleEdit(
            "SLA vencido. Não é possível editar este registro.".into(),
        ));
        assert_eq!(n.level, NotificationLevel::Warning);
        assert!(n.message.starts_with("SLA vencido"));
    }

    #[test]
    fn test_decision_mapping() {
        assert_eq!(
            Notification::from_decision(EditDecision::SlaExpired).level,
            NotificationLevel::Warning
        );
        assert_eq!(
            Notification::from_decision(EditDecision::Allowed).level,
            NotificationLevel::Info
        );
    }
}
