//! The admin dashboard controller: module and user management, reports.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use crate::error::{BackendError, DashboardError};
use crate::model::{AdminUser, Course, CourseId, ReportKind, Role, SystemReports, UserId};
use crate::notify::Notices;
use crate::session::{self, Session};
use crate::traits::Backend;
use crate::validate::{self, ModuleForm};

pub const ADMIN_ROLE_REFUSED: &str = "Cannot change role of an administrator from here.";
pub const REPORTS_FAILED: &str = "Failed to fetch reports.";

/// The role a promote/demote toggle moves a user to.
///
/// Lecturers become learners and everyone else becomes a lecturer.
/// Administrators are never changed.
pub fn toggled_role(current: &Role) -> Option<Role> {
    match current {
        Role::Administrator => None,
        Role::Lecturer => Some(Role::Learner),
        Role::Learner | Role::Other(_) => Some(Role::Lecturer),
    }
}

/// Admin dashboard state.
pub struct AdminDashboard {
    backend: Arc<dyn Backend>,
    session: Option<Session>,
    modules: Vec<Course>,
    users: Vec<AdminUser>,
    reports: Option<SystemReports>,
    notices: Notices,
}

impl AdminDashboard {
    pub fn new(backend: Arc<dyn Backend>, session: Option<Session>) -> Self {
        Self {
            backend,
            session,
            modules: Vec::new(),
            users: Vec::new(),
            reports: None,
            notices: Notices::default(),
        }
    }

    /// Replace the notice queue, e.g. to use a configured time-to-live.
    pub fn with_notices(mut self, notices: Notices) -> Self {
        self.notices = notices;
        self
    }

    pub fn modules(&self) -> &[Course] {
        &self.modules
    }

    pub fn users(&self) -> &[AdminUser] {
        &self.users
    }

    pub fn reports(&self) -> Option<&SystemReports> {
        self.reports.as_ref()
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }

    fn fail<T>(&mut self, err: DashboardError) -> Result<T, DashboardError> {
        self.notices.error(err.user_message());
        Err(err)
    }

    fn fail_backend<T>(&mut self, prefix: &str, err: BackendError) -> Result<T, DashboardError> {
        tracing::error!(error = %err, "{prefix}");
        self.notices
            .error(format!("{prefix}: {}", err.user_message()));
        Err(err.into())
    }

    fn authorize(&mut self) -> Result<(), DashboardError> {
        match session::require(self.session.as_ref()) {
            Ok(_) => Ok(()),
            Err(e) => self.fail(e),
        }
    }

    /// Report the outcome of one mutating call.
    fn settle(
        &mut self,
        outcome: Result<(), BackendError>,
        success: String,
        failure: &str,
    ) -> Result<String, DashboardError> {
        match outcome {
            Ok(()) => {
                tracing::info!("{success}");
                self.notices.success(success.clone());
                Ok(success)
            }
            Err(e) => self.fail_backend(failure, e),
        }
    }

    // -- modules ------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn refresh_modules(&mut self) -> Result<&[Course], DashboardError> {
        match self.backend.admin_modules().await {
            Ok(modules) => {
                self.modules = modules;
                Ok(&self.modules)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch modules");
                self.notices.error("Failed to fetch modules.");
                Err(e.into())
            }
        }
    }

    #[instrument(skip_all, fields(title = %form.title))]
    pub async fn add_module(&mut self, form: &ModuleForm) -> Result<String, DashboardError> {
        self.authorize()?;
        let draft = match validate::module(form) {
            Ok(d) => d,
            Err(e) => return self.fail(e.into()),
        };
        let outcome = self.backend.add_module(&draft).await.map(drop);
        self.settle(
            outcome,
            "Module added successfully!".into(),
            "Failed to add module",
        )
    }

    #[instrument(skip(self, form))]
    pub async fn update_module(
        &mut self,
        id: CourseId,
        form: &ModuleForm,
    ) -> Result<String, DashboardError> {
        self.authorize()?;
        let draft = match validate::module(form) {
            Ok(d) => d,
            Err(e) => return self.fail(e.into()),
        };
        let outcome = self.backend.update_module(id, &draft).await.map(drop);
        self.settle(
            outcome,
            "Module updated successfully!".into(),
            "Failed to update module",
        )
    }

    #[instrument(skip(self))]
    pub async fn delete_module(&mut self, id: CourseId) -> Result<String, DashboardError> {
        self.authorize()?;
        let outcome = self.backend.delete_module(id).await.map(drop);
        self.settle(
            outcome,
            "Module deleted successfully!".into(),
            "Failed to delete module",
        )
    }

    /// Flip a module's published flag.
    #[instrument(skip(self))]
    pub async fn toggle_publish(
        &mut self,
        id: CourseId,
        currently_published: bool,
    ) -> Result<String, DashboardError> {
        self.authorize()?;
        let publish = !currently_published;
        let verb = if publish { "publish" } else { "unpublish" };
        let outcome = self.backend.publish_module(id, publish).await.map(drop);
        self.settle(
            outcome,
            format!("Module {verb}ed successfully!"),
            &format!("Failed to {verb} module"),
        )
    }

    /// Assign a lecturer typed in as free text.
    #[instrument(skip(self))]
    pub async fn assign_instructor(
        &mut self,
        id: CourseId,
        lecturer_input: &str,
    ) -> Result<String, DashboardError> {
        self.authorize()?;
        let lecturer_id = match validate::lecturer_id(lecturer_input) {
            Ok(l) => l,
            Err(e) => return self.fail(e.into()),
        };
        let outcome = self
            .backend
            .assign_instructor(id, lecturer_id)
            .await
            .map(drop);
        self.settle(
            outcome,
            "Instructor assigned successfully!".into(),
            "Failed to assign instructor. Check if ID is valid and belongs to a lecturer",
        )
    }

    // -- users --------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn refresh_users(&mut self) -> Result<&[AdminUser], DashboardError> {
        match self.backend.admin_users().await {
            Ok(users) => {
                self.users = users;
                Ok(&self.users)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch users");
                self.notices.error("Failed to fetch users.");
                Err(e.into())
            }
        }
    }

    fn find_user(&mut self, id: UserId) -> Result<AdminUser, DashboardError> {
        match self.users.iter().find(|u| u.id == id).cloned() {
            Some(user) => Ok(user),
            None => self.fail(DashboardError::precondition(format!(
                "User {id} not found."
            ))),
        }
    }

    /// Flip a listed user between lecturer and learner.
    #[instrument(skip(self))]
    pub async fn toggle_role(&mut self, id: UserId) -> Result<String, DashboardError> {
        self.authorize()?;
        let user = self.find_user(id)?;
        let Some(role) = toggled_role(&user.role) else {
            return self.fail(DashboardError::precondition(ADMIN_ROLE_REFUSED));
        };
        let outcome = self.backend.set_user_role(id, &role).await.map(drop);
        let message = self.settle(
            outcome,
            format!("User role updated to {role} successfully!"),
            "Failed to update user role",
        )?;
        if let Some(listed) = self.users.iter_mut().find(|u| u.id == id) {
            listed.role = role;
        }
        Ok(message)
    }

    /// Flip a listed user between active and disabled.
    #[instrument(skip(self))]
    pub async fn toggle_status(&mut self, id: UserId) -> Result<String, DashboardError> {
        self.authorize()?;
        let user = self.find_user(id)?;
        let status = user.status.toggled();
        let outcome = self.backend.set_user_status(id, status).await.map(drop);
        let message = self.settle(
            outcome,
            format!("User status set to {status} successfully!"),
            "Failed to update user status",
        )?;
        if let Some(listed) = self.users.iter_mut().find(|u| u.id == id) {
            listed.status = status;
        }
        Ok(message)
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&mut self, id: UserId) -> Result<String, DashboardError> {
        self.authorize()?;
        let outcome = self.backend.delete_user(id).await.map(drop);
        let message = self.settle(
            outcome,
            "User deleted successfully!".into(),
            "Failed to delete user",
        )?;
        self.users.retain(|u| u.id != id);
        Ok(message)
    }

    // -- reports ------------------------------------------------------------

    /// Fetch all three reports concurrently. Any failure fails the lot.
    #[instrument(skip(self))]
    pub async fn refresh_reports(&mut self) -> Result<&SystemReports, DashboardError> {
        let backend = Arc::clone(&self.backend);
        let fetched = futures::try_join!(
            backend.report(ReportKind::Enrollments),
            backend.report(ReportKind::CompletionRates),
            backend.report(ReportKind::Revenue),
        );
        match fetched {
            Ok((enrollments, completion_rates, revenue)) => Ok(self.reports.insert(SystemReports {
                enrollments,
                completion_rates,
                revenue,
                fetched_at: Utc::now(),
            })),
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch reports");
                self.notices.error(REPORTS_FAILED);
                Err(e.into())
            }
        }
    }
}
