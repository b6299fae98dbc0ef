//! The backend seam.
//!
//! Every dashboard controller talks to the LMS through [`Backend`].
//! `campus-client` provides the HTTP implementation and an in-memory mock.

use async_trait::async_trait;

use crate::error::BackendError;
use crate::model::{
    AdminUser, ApiMessage, CompletionRecord, Course, CourseId, Credentials, EnrollmentRequest,
    LoginResponse, ModuleDraft, NotePage, Question, Registration, ReportKind, Role, UploadFile,
    UserId, UserStatus,
};

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// REST operations offered by the LMS backend.
///
/// Implementations attach the session's bearer token themselves; callers
/// never pass credentials per call.
#[async_trait]
pub trait Backend: Send + Sync {
    // -- auth ---------------------------------------------------------------

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, BackendError>;

    async fn register(&self, registration: &Registration) -> Result<ApiMessage, BackendError>;

    async fn reset_password(&self, email: &str) -> Result<ApiMessage, BackendError>;

    // -- learner ------------------------------------------------------------

    async fn courses(&self) -> Result<Vec<Course>, BackendError>;

    async fn course(&self, id: CourseId) -> Result<Course, BackendError>;

    /// Fetch one page of notes. Courses are addressed by title here.
    async fn note_page(&self, course_title: &str, page: u32) -> Result<NotePage, BackendError>;

    async fn assessment_questions(&self, course_title: &str)
        -> Result<Vec<Question>, BackendError>;

    async fn enroll(&self, request: &EnrollmentRequest) -> Result<ApiMessage, BackendError>;

    async fn record_completion(&self, record: &CompletionRecord)
        -> Result<ApiMessage, BackendError>;

    // -- admin --------------------------------------------------------------

    async fn admin_modules(&self) -> Result<Vec<Course>, BackendError>;

    async fn add_module(&self, draft: &ModuleDraft) -> Result<ApiMessage, BackendError>;

    async fn update_module(
        &self,
        id: CourseId,
        draft: &ModuleDraft,
    ) -> Result<ApiMessage, BackendError>;

    async fn delete_module(&self, id: CourseId) -> Result<ApiMessage, BackendError>;

    async fn publish_module(
        &self,
        id: CourseId,
        is_published: bool,
    ) -> Result<ApiMessage, BackendError>;

    async fn assign_instructor(
        &self,
        id: CourseId,
        lecturer_id: UserId,
    ) -> Result<ApiMessage, BackendError>;

    async fn admin_users(&self) -> Result<Vec<AdminUser>, BackendError>;

    async fn set_user_role(&self, id: UserId, role: &Role) -> Result<ApiMessage, BackendError>;

    async fn set_user_status(
        &self,
        id: UserId,
        status: UserStatus,
    ) -> Result<ApiMessage, BackendError>;

    async fn delete_user(&self, id: UserId) -> Result<ApiMessage, BackendError>;

    /// Fetch one report body as computed by the backend.
    async fn report(&self, kind: ReportKind) -> Result<serde_json::Value, BackendError>;

    // -- files --------------------------------------------------------------

    async fn upload(&self, files: Vec<UploadFile>) -> Result<ApiMessage, BackendError>;
}
