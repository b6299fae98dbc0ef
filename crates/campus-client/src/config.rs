//! Client configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level campus configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampusConfig {
    /// Base URL of the LMS REST API, including the `/api` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Where the login session is kept.
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
    /// Directory for local data such as the lecturer catalogue.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// How long notifications stay visible.
    #[serde(default = "default_notification_ttl")]
    pub notification_ttl_secs: u64,
    /// Output directory for generated certificates.
    #[serde(default = "default_certificate_dir")]
    pub certificate_dir: PathBuf,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_session_file() -> PathBuf {
    default_data_dir().join("session.json")
}
fn default_data_dir() -> PathBuf {
    dirs_path().unwrap_or_else(|| PathBuf::from(".campus"))
}
fn default_notification_ttl() -> u64 {
    5
}
fn default_certificate_dir() -> PathBuf {
    PathBuf::from("./certificates")
}

impl Default for CampusConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            session_file: default_session_file(),
            data_dir: default_data_dir(),
            notification_ttl_secs: default_notification_ttl(),
            certificate_dir: default_certificate_dir(),
        }
    }
}

impl CampusConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }

    /// Expand `${VAR}` references in every string-valued setting.
    fn resolve(mut self) -> Self {
        self.base_url = resolve_env_vars(&self.base_url);
        self.session_file = resolve_path(&self.session_file);
        self.data_dir = resolve_path(&self.data_dir);
        self.certificate_dir = resolve_path(&self.certificate_dir);
        self
    }
}

/// Sample configuration written by `campus init`.
pub const SAMPLE_CONFIG: &str = r#"# campus configuration

# LMS backend, including the /api prefix.
base_url = "http://localhost:5000/api"

# HTTP request timeout in seconds.
timeout_secs = 30

# Local state. ${VAR} references are expanded.
session_file = "${HOME}/.config/campus/session.json"
data_dir = "${HOME}/.config/campus"

# Seconds before a notification disappears; 0 hides them.
notification_ttl_secs = 5

# Where certificates are written.
certificate_dir = "./certificates"
"#;

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from the default locations.
pub fn load_config() -> Result<CampusConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. the explicit path, which must exist
/// 2. `campus.toml` in the current directory
/// 3. `~/.config/campus/config.toml`
///
/// `CAMPUS_BASE_URL` and `CAMPUS_SESSION_FILE` override the file.
pub fn load_config_from(path: Option<&Path>) -> Result<CampusConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("campus.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<CampusConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => CampusConfig::default(),
    };
    let mut config = config.resolve();

    if let Ok(url) = std::env::var("CAMPUS_BASE_URL") {
        config.base_url = url;
    }
    if let Ok(file) = std::env::var("CAMPUS_SESSION_FILE") {
        config.session_file = PathBuf::from(file);
    }

    tracing::debug!(
        path = ?config_path,
        base_url = %config.base_url,
        "configuration loaded"
    );
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("campus"))
}
