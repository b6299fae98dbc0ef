//! Mapping transport failures onto [`BackendError`].

use campus_core::error::BackendError;
use serde::Deserialize;

/// The fields a failed response may use to explain itself.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Pull the user-facing message out of an error body.
///
/// `message` wins over `error`. Bodies that are not JSON, or carry neither
/// field, yield `None`.
pub(crate) fn body_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .message
        .or(parsed.error)
        .filter(|m| !m.trim().is_empty())
}

/// Convert a reqwest failure that produced no response.
pub(crate) fn from_reqwest(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Network(format!("request timed out: {err}"))
    } else if err.is_decode() {
        BackendError::Decode(err.to_string())
    } else {
        BackendError::Network(err.to_string())
    }
}

/// Convert a non-success response, consuming its body.
pub(crate) async fn from_response(response: reqwest::Response) -> BackendError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status, body = %body, "backend returned an error");
    BackendError::Api {
        status,
        message: body_message(&body),
    }
}
