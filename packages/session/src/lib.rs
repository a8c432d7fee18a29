// ABOUTME: Operator session for the regressivos console
// ABOUTME: Name and role chosen at login, loaded at startup and saved on change

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

use regressivos_config::regressivos_home;

const SESSION_FILE: &str = "session.json";

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Name is required")]
    EmptyName,

    #[error("Invalid role: {0} (expected admin or quality)")]
    InvalidRole(String),

    #[error("Not logged in. Run `regressivos login` first")]
    NotLoggedIn,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupt session file: {0}")]
    Corrupt(String),
}

/// What the operator works as. Selecting a role is not an authorization
/// boundary; it only picks the landing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Quality,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Quality => write!(f, "quality"),
        }
    }
}

impl FromStr for Role {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "quality" | "qualidade" => Ok(Role::Quality),
            _ => Err(SessionError::InvalidRole(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub name: String,
    pub role: Role,
}

impl Session {
    pub fn new(name: impl Into<String>, role: Role) -> SessionResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }
        Ok(Self { name, role })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_quality(&self) -> bool {
        self.role == Role::Quality
    }
}

/// JSON file holding the current session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `session.json` under the console home directory
    pub fn default_location() -> Self {
        Self::new(regressivos_home().join(SESSION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the saved session, or `None` when nobody is logged in.
    pub async fn load(&self) -> SessionResult<Option<Session>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No saved session");
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| SessionError::Storage(format!("Failed to read session: {}", e)))?;

        let session: Session =
            serde_json::from_str(&content).map_err(|e| SessionError::Corrupt(e.to_string()))?;
        Ok(Some(session))
    }

    /// Like [`SessionStore::load`] but a missing session is an error.
    pub async fn require(&self) -> SessionResult<Session> {
        self.load().await?.ok_or(SessionError::NotLoggedIn)
    }

    pub async fn save(&self, session: &Session) -> SessionResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                SessionError::Storage(format!("Failed to create session dir: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(session)
            .map_err(|e| SessionError::Storage(format!("Failed to serialize session: {}", e)))?;

        fs::write(&self.path, content)
            .await
            .map_err(|e| SessionError::Storage(format!("Failed to write session: {}", e)))?;

        info!(name = %session.name, role = %session.role, "Session saved");
        Ok(())
    }

    /// Removes the saved session. Returns whether one existed.
    pub async fn clear(&self) -> SessionResult<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)
            .await
            .map_err(|e| SessionError::Storage(format!("Failed to remove session: {}", e)))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Quality".parse::<Role>().unwrap(), Role::Quality);
        assert!(matches!(
            "viewer".parse::<Role>(),
            Err(SessionError::InvalidRole(_))
        ));
    }

    #[test]
    fn test_session_requires_name() {
        assert!(matches!(
            Session::new("   ", Role::Admin),
            Err(SessionError::EmptyName)
        ));
        let session = Session::new(" Ana ", Role::Quality).unwrap();
        assert_eq!(session.name, "Ana");
        assert!(session.is_quality());
        assert!(!session.is_admin());
    }

    #[test]
    fn test_wire_shape() {
        let session = Session::new("Bruno", Role::Admin).unwrap();
        assert_eq!(
            serde_json::to_value(&session).unwrap(),
            serde_json::json!({"name": "Bruno", "role": "admin"})
        );
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));

        assert_eq!(store.load().await.unwrap(), None);
        assert!(matches!(store.require().await, Err(SessionError::NotLoggedIn)));

        let session = Session::new("Ana", Role::Quality).unwrap();
        store.save(&session).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(session.clone()));
        assert_eq!(store.require().await.unwrap(), session);

        assert!(store.clear().await.unwrap());
        assert!(!store.clear().await.unwrap());
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = SessionStore::new(&path);
        assert!(matches!(store.load().await, Err(SessionError::Corrupt(_))));
    }
}
