//! The explicit user session and its durable store.
//!
//! A session is created by a successful login and passed into every
//! dashboard controller. Operations that need an identity fail with
//! `Unauthenticated` when it is missing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;
use crate::model::{LoginResponse, Role, UserId};
use crate::routing::Route;

/// Text shown when an operation needs a logged-in user id.
pub const MISSING_USER_ID: &str = "User ID not found. Please ensure you are logged in correctly.";

/// Identity of the logged-in user.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub username: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"***")
            .field("role", &self.role)
            .field("username", &self.username)
            .field("user_id", &self.user_id)
            .finish()
    }
}

impl Session {
    /// Dashboard this session lands on after login.
    pub fn home(&self) -> Route {
        Route::for_role(&self.role)
    }
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Self {
            token: response.token,
            role: response.role,
            username: response.username,
            user_id: response.user_id,
        }
    }
}

/// Require a session, failing with `Unauthenticated` otherwise.
pub fn require(session: Option<&Session>) -> Result<&Session, DashboardError> {
    session.ok_or_else(|| DashboardError::Unauthenticated("Please log in first.".to_string()))
}

/// Require a session that carries a user id.
pub fn require_user_id(session: Option<&Session>) -> Result<UserId, DashboardError> {
    session
        .and_then(|s| s.user_id)
        .ok_or_else(|| DashboardError::Unauthenticated(MISSING_USER_ID.to_string()))
}

/// File-backed session storage.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session, if one exists.
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read session: {}", self.path.display()))?;
        let session = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse session: {}", self.path.display()))?;
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session).context("failed to serialize session")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write session to {}", self.path.display()))?;
        Ok(())
    }

    /// Remove the stored session. Missing files are not an error.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("failed to remove session {}", self.path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(user_id: Option<UserId>) -> Session {
        Session {
            token: "tok".into(),
            role: Role::Learner,
            username: "ada".into(),
            user_id,
        }
    }

    #[test]
    fn store_roundtrip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));
        assert!(store.load().unwrap().is_none());

        store.save(&session(Some(3))).unwrap();
        assert_eq!(store.load().unwrap(), Some(session(Some(3))));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn missing_session_is_unauthenticated() {
        assert!(matches!(
            require(None),
            Err(DashboardError::Unauthenticated(_))
        ));
        let err = require_user_id(Some(&session(None))).unwrap_err();
        assert_eq!(err.to_string(), format!("not authenticated: {MISSING_USER_ID}"));
        assert_eq!(require_user_id(Some(&session(Some(9)))).unwrap(), 9);
    }

    #[test]
    fn debug_masks_token() {
        let rendered = format!("{:?}", session(Some(1)));
        assert!(!rendered.contains("tok\""));
        assert!(rendered.contains("***"));
    }
}
