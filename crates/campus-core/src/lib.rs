//! campus-core — data model, grading engine, and dashboard controllers.
//!
//! This crate defines the types and state machines that the rest of campus
//! builds on: the note-progress tracker, the assessment engine, the
//! explicit user session, and the controllers behind each dashboard. All
//! backend access goes through the [`traits::Backend`] trait.

pub mod admin;
pub mod assessment;
pub mod auth;
pub mod error;
pub mod learner;
pub mod lecturer;
pub mod model;
pub mod notify;
pub mod progress;
pub mod routing;
pub mod session;
pub mod traits;
pub mod validate;
