//! campus-client — backend access and configuration.
//!
//! Implements the `Backend` trait over the LMS REST API with reqwest, and
//! provides an in-memory `MockBackend` for tests and offline use.

pub mod config;
pub mod error;
pub mod http;
pub mod mock;

pub use config::{load_config, load_config_from, CampusConfig};
pub use http::HttpBackend;
pub use mock::MockBackend;
