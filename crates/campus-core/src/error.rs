//! Error types shared across campus.
//!
//! `BackendError` is defined here rather than in `campus-client` so the
//! dashboard controllers can turn backend failures into user-facing text
//! without knowing which transport produced them.

use thiserror::Error;

use crate::assessment::AssessmentError;
use crate::validate::ValidationError;

/// Text shown when a failed response carries no usable message.
pub const GENERIC_SERVER_ERROR: &str = "Server error.";

/// Errors that can occur when talking to the LMS backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend answered with a non-success status.
    #[error("backend error (HTTP {status}): {}", .message.as_deref().unwrap_or(GENERIC_SERVER_ERROR))]
    Api {
        status: u16,
        /// The `message` or `error` field of the response body, if any.
        message: Option<String>,
    },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl BackendError {
    /// The text to show the user for this failure.
    pub fn user_message(&self) -> String {
        self.message_or(GENERIC_SERVER_ERROR)
    }

    /// The body message, or `fallback` when the response carried none.
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            BackendError::Api {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors surfaced by the dashboard controllers.
///
/// Every variant is also posted as an error notice before it is returned,
/// so callers may ignore the value and keep the view alive.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// No session, or the session lacks the user id the operation needs.
    #[error("not authenticated: {0}")]
    Unauthenticated(String),

    /// A form failed client-side validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The assessment engine refused the transition.
    #[error(transparent)]
    Assessment(#[from] AssessmentError),

    /// The view is not in a state where the action makes sense.
    #[error("{0}")]
    Precondition(String),

    /// Local storage or rendering failed.
    #[error("{message}")]
    Local {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl DashboardError {
    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        DashboardError::Precondition(message.into())
    }

    pub(crate) fn local(message: impl Into<String>, source: anyhow::Error) -> Self {
        DashboardError::Local {
            message: message.into(),
            source,
        }
    }

    /// The text to show the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Unauthenticated(message) => message.clone(),
            DashboardError::Backend(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_prefers_body_message() {
        let err = BackendError::Api {
            status: 409,
            message: Some("Already enrolled".into()),
        };
        assert_eq!(err.user_message(), "Already enrolled");
        assert_eq!(err.status(), Some(409));
        assert!(err.to_string().contains("409"));
    }

    #[test]
    fn errors_without_body_fall_back_to_generic_text() {
        let api = BackendError::Api {
            status: 500,
            message: None,
        };
        assert_eq!(api.user_message(), GENERIC_SERVER_ERROR);
        assert!(api.to_string().contains("Server error."));

        let network = BackendError::Network("connection refused".into());
        assert_eq!(network.user_message(), GENERIC_SERVER_ERROR);
        assert_eq!(network.status(), None);
        assert_eq!(network.message_or("Failed to load."), "Failed to load.");
    }

    #[test]
    fn dashboard_user_message_strips_prefixes() {
        let err = DashboardError::Unauthenticated("Please log in first.".into());
        assert_eq!(err.user_message(), "Please log in first.");

        let err = DashboardError::from(BackendError::Api {
            status: 400,
            message: Some("Bad title".into()),
        });
        assert_eq!(err.user_message(), "Bad title");

        let err = DashboardError::from(ValidationError("Credits must be a positive number.".into()));
        assert_eq!(err.user_message(), "Credits must be a positive number.");
    }
}
