pub mod admin;
pub mod auth;
pub mod courses;
pub mod dashboard;
pub mod init;
pub mod learn;
pub mod lecturer;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use campus_client::{load_config_from, CampusConfig, HttpBackend};
use campus_core::error::DashboardError;
use campus_core::notify::Notices;
use campus_core::session::{Session, SessionStore};
use campus_core::traits::Backend;

/// Configuration plus the stored session, shared by every command.
pub struct App {
    pub config: CampusConfig,
    pub store: SessionStore,
    pub session: Option<Session>,
}

impl App {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = load_config_from(config_path)?;
        let store = SessionStore::new(config.session_file.clone());
        let session = store.load()?;
        Ok(Self {
            config,
            store,
            session,
        })
    }

    /// HTTP backend authenticated with the stored session, if any.
    pub fn backend(&self) -> Result<Arc<dyn Backend>> {
        let backend = HttpBackend::from_config(&self.config, self.session.as_ref())?;
        Ok(Arc::new(backend))
    }

    pub fn notices(&self) -> Notices {
        Notices::new(self.config.notification_ttl())
    }
}

/// Turn a failure into the message the user sees.
pub fn shown(e: DashboardError) -> anyhow::Error {
    anyhow::anyhow!(e.user_message())
}

/// A dashboard failure as the dashboard reported it: the last error
/// notice still visible, else the error's own message.
pub fn failure(notices: &Notices, e: DashboardError) -> anyhow::Error {
    match notices.active(Instant::now()).filter(|n| n.is_error()).last() {
        Some(notice) => anyhow::anyhow!(notice.text.clone()),
        None => shown(e),
    }
}

/// Print and discard pending notifications. Notices older than the
/// configured time-to-live are dropped unseen.
pub fn flush(notices: &mut Notices) {
    notices.expire(Instant::now());
    for notice in notices.drain() {
        if notice.is_error() {
            eprintln!("{}", notice.text);
        } else {
            println!("{}", notice.text);
        }
    }
}
