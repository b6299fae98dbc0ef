//! Login, registration and password reset.

use tracing::instrument;

use crate::error::DashboardError;
use crate::routing::Route;
use crate::session::{Session, SessionStore};
use crate::traits::Backend;
use crate::validate::{self, RegistrationForm};

pub const REGISTRATION_OK: &str = "Registration successful! Please log in.";
pub const RESET_LINK_SENT: &str =
    "If an account with that email exists, a password reset link has been sent.";

/// A successful login: the stored session and where to go next.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub session: Session,
    pub route: Route,
}

/// Log in and persist the session.
#[instrument(skip(backend, store, password))]
pub async fn login(
    backend: &dyn Backend,
    store: &SessionStore,
    username: &str,
    password: &str,
) -> Result<LoginOutcome, DashboardError> {
    let credentials = validate::credentials(username, password)?;
    let response = backend.login(&credentials).await?;
    let session = Session::from(response);
    store
        .save(&session)
        .map_err(|e| DashboardError::local("Failed to store the session.", e))?;
    let route = session.home();
    tracing::info!(role = %session.role, route = %route, "logged in");
    Ok(LoginOutcome { session, route })
}

/// Register a new account. Returns the confirmation text.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn register(
    backend: &dyn Backend,
    form: RegistrationForm,
) -> Result<String, DashboardError> {
    let registration = validate::registration(form)?;
    backend.register(&registration).await?;
    Ok(REGISTRATION_OK.to_string())
}

/// Ask the backend to send a password reset link.
#[instrument(skip(backend))]
pub async fn reset_password(backend: &dyn Backend, email: &str) -> Result<String, DashboardError> {
    let email = validate::reset_email(email)?;
    let reply = backend.reset_password(&email).await?;
    Ok(reply.message.unwrap_or_else(|| RESET_LINK_SENT.to_string()))
}

/// Forget the stored session.
pub fn logout(store: &SessionStore) -> Result<(), DashboardError> {
    store
        .clear()
        .map_err(|e| DashboardError::local("Failed to remove the session.", e))
}
