//! In-memory backend for tests and offline runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use campus_core::error::BackendError;
use campus_core::model::{
    AdminUser, ApiMessage, CompletionRecord, Course, CourseId, Credentials, EnrollmentRequest,
    LoginResponse, ModuleDraft, NotePage, Question, Registration, ReportKind, Role, UploadFile,
    UserId, UserStatus,
};
use campus_core::traits::Backend;

/// A mock LMS backend that keeps everything in memory.
///
/// Operations can be made to fail by name with [`MockBackend::fail_on`],
/// using the same names as the `Backend` methods.
pub struct MockBackend {
    courses: Vec<Course>,
    notes: HashMap<(String, u32), String>,
    questions: HashMap<String, Vec<Question>>,
    login: Option<LoginResponse>,
    modules: Mutex<Vec<Course>>,
    users: Mutex<Vec<AdminUser>>,
    reports: HashMap<ReportKind, serde_json::Value>,
    failures: HashMap<&'static str, BackendError>,
    call_count: AtomicU32,
    calls: Mutex<Vec<String>>,
    enrollments: Mutex<Vec<EnrollmentRequest>>,
    completions: Mutex<Vec<CompletionRecord>>,
    uploads: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            courses: Vec::new(),
            notes: HashMap::new(),
            questions: HashMap::new(),
            login: None,
            modules: Mutex::new(Vec::new()),
            users: Mutex::new(Vec::new()),
            reports: HashMap::new(),
            failures: HashMap::new(),
            call_count: AtomicU32::new(0),
            calls: Mutex::new(Vec::new()),
            enrollments: Mutex::new(Vec::new()),
            completions: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
        }
    }

    /// Courses for learners; admins see the same list as modules.
    pub fn with_courses(mut self, courses: Vec<Course>) -> Self {
        *self.modules.get_mut().unwrap() = courses.clone();
        self.courses = courses;
        self
    }

    /// Explicit content for one note page. Pages without an entry get a
    /// generated placeholder.
    pub fn with_note(mut self, course_title: &str, page: u32, content: &str) -> Self {
        self.notes
            .insert((course_title.to_string(), page), content.to_string());
        self
    }

    pub fn with_questions(mut self, course_title: &str, questions: Vec<Question>) -> Self {
        self.questions.insert(course_title.to_string(), questions);
        self
    }

    pub fn with_login(mut self, response: LoginResponse) -> Self {
        self.login = Some(response);
        self
    }

    pub fn with_users(mut self, users: Vec<AdminUser>) -> Self {
        *self.users.get_mut().unwrap() = users;
        self
    }

    pub fn with_report(mut self, kind: ReportKind, body: serde_json::Value) -> Self {
        self.reports.insert(kind, body);
        self
    }

    /// Make `operation` fail with the given status and body message.
    pub fn fail_on(mut self, operation: &'static str, status: u16, message: Option<&str>) -> Self {
        self.failures.insert(
            operation,
            BackendError::Api {
                status,
                message: message.map(str::to_string),
            },
        );
        self
    }

    /// Number of backend calls made.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Names of the operations called, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn enrollments(&self) -> Vec<EnrollmentRequest> {
        self.enrollments.lock().unwrap().clone()
    }

    pub fn completions(&self) -> Vec<CompletionRecord> {
        self.completions.lock().unwrap().clone()
    }

    /// File names received through `upload`.
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn modules(&self) -> Vec<Course> {
        self.modules.lock().unwrap().clone()
    }

    pub fn users(&self) -> Vec<AdminUser> {
        self.users.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str) -> Result<(), BackendError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.calls.lock().unwrap().push(operation.to_string());
        match self.failures.get(operation) {
            Some(BackendError::Api { status, message }) => Err(BackendError::Api {
                status: *status,
                message: message.clone(),
            }),
            Some(other) => Err(BackendError::Network(other.to_string())),
            None => Ok(()),
        }
    }

    fn not_found(what: String) -> BackendError {
        BackendError::Api {
            status: 404,
            message: Some(format!("{what} not found")),
        }
    }

    fn ack(message: &str) -> ApiMessage {
        ApiMessage {
            message: Some(message.to_string()),
            error: None,
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, BackendError> {
        self.record("login")?;
        self.login.clone().ok_or_else(|| BackendError::Api {
            status: 401,
            message: Some(format!("Invalid credentials for {}", credentials.username)),
        })
    }

    async fn register(&self, _registration: &Registration) -> Result<ApiMessage, BackendError> {
        self.record("register")?;
        Ok(Self::ack("User registered"))
    }

    async fn reset_password(&self, _email: &str) -> Result<ApiMessage, BackendError> {
        self.record("reset_password")?;
        Ok(ApiMessage::default())
    }

    async fn courses(&self) -> Result<Vec<Course>, BackendError> {
        self.record("courses")?;
        Ok(self.courses.clone())
    }

    async fn course(&self, id: CourseId) -> Result<Course, BackendError> {
        self.record("course")?;
        self.courses
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found(format!("Course {id}")))
    }

    async fn note_page(&self, course_title: &str, page: u32) -> Result<NotePage, BackendError> {
        self.record("note_page")?;
        let content = self
            .notes
            .get(&(course_title.to_string(), page))
            .cloned()
            .unwrap_or_else(|| format!("<p>{course_title}, page {page}</p>"));
        Ok(NotePage {
            content,
            page_number: page,
        })
    }

    async fn assessment_questions(
        &self,
        course_title: &str,
    ) -> Result<Vec<Question>, BackendError> {
        self.record("assessment_questions")?;
        Ok(self
            .questions
            .get(course_title)
            .cloned()
            .unwrap_or_default())
    }

    async fn enroll(&self, request: &EnrollmentRequest) -> Result<ApiMessage, BackendError> {
        self.record("enroll")?;
        self.enrollments.lock().unwrap().push(request.clone());
        Ok(ApiMessage::default())
    }

    async fn record_completion(
        &self,
        record: &CompletionRecord,
    ) -> Result<ApiMessage, BackendError> {
        self.record("record_completion")?;
        self.completions.lock().unwrap().push(record.clone());
        Ok(Self::ack("Completion recorded"))
    }

    async fn admin_modules(&self) -> Result<Vec<Course>, BackendError> {
        self.record("admin_modules")?;
        Ok(self.modules())
    }

    async fn add_module(&self, draft: &ModuleDraft) -> Result<ApiMessage, BackendError> {
        self.record("add_module")?;
        let mut modules = self.modules.lock().unwrap();
        let id = modules.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        modules.push(Course {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            credits: draft.credits,
            lecturer_id: Some(draft.lecturer_id),
            pages: draft.pages,
            is_published: draft.is_published,
        });
        Ok(Self::ack("Module added"))
    }

    async fn update_module(
        &self,
        id: CourseId,
        draft: &ModuleDraft,
    ) -> Result<ApiMessage, BackendError> {
        self.record("update_module")?;
        let mut modules = self.modules.lock().unwrap();
        let module = modules
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| Self::not_found(format!("Module {id}")))?;
        module.title = draft.title.clone();
        module.description = draft.description.clone();
        module.credits = draft.credits;
        module.lecturer_id = Some(draft.lecturer_id);
        module.pages = draft.pages;
        module.is_published = draft.is_published;
        Ok(Self::ack("Module updated"))
    }

    async fn delete_module(&self, id: CourseId) -> Result<ApiMessage, BackendError> {
        self.record("delete_module")?;
        self.modules.lock().unwrap().retain(|m| m.id != id);
        Ok(ApiMessage::default())
    }

    async fn publish_module(
        &self,
        id: CourseId,
        is_published: bool,
    ) -> Result<ApiMessage, BackendError> {
        self.record("publish_module")?;
        let mut modules = self.modules.lock().unwrap();
        let module = modules
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| Self::not_found(format!("Module {id}")))?;
        module.is_published = is_published;
        Ok(ApiMessage::default())
    }

    async fn assign_instructor(
        &self,
        id: CourseId,
        lecturer_id: UserId,
    ) -> Result<ApiMessage, BackendError> {
        self.record("assign_instructor")?;
        let mut modules = self.modules.lock().unwrap();
        let module = modules
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| Self::not_found(format!("Module {id}")))?;
        module.lecturer_id = Some(lecturer_id);
        Ok(ApiMessage::default())
    }

    async fn admin_users(&self) -> Result<Vec<AdminUser>, BackendError> {
        self.record("admin_users")?;
        Ok(self.users())
    }

    async fn set_user_role(&self, id: UserId, role: &Role) -> Result<ApiMessage, BackendError> {
        self.record("set_user_role")?;
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| Self::not_found(format!("User {id}")))?;
        user.role = role.clone();
        Ok(ApiMessage::default())
    }

    async fn set_user_status(
        &self,
        id: UserId,
        status: UserStatus,
    ) -> Result<ApiMessage, BackendError> {
        self.record("set_user_status")?;
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| Self::not_found(format!("User {id}")))?;
        user.status = status;
        Ok(ApiMessage::default())
    }

    async fn delete_user(&self, id: UserId) -> Result<ApiMessage, BackendError> {
        self.record("delete_user")?;
        self.users.lock().unwrap().retain(|u| u.id != id);
        Ok(ApiMessage::default())
    }

    async fn report(&self, kind: ReportKind) -> Result<serde_json::Value, BackendError> {
        self.record("report")?;
        Ok(self
            .reports
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| serde_json::json!([])))
    }

    async fn upload(&self, files: Vec<UploadFile>) -> Result<ApiMessage, BackendError> {
        self.record("upload")?;
        self.uploads
            .lock()
            .unwrap()
            .extend(files.into_iter().map(|f| f.file_name));
        Ok(Self::ack("Files uploaded"))
    }
}
