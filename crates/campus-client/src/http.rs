//! `Backend` over the LMS REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use campus_core::error::BackendError;
use campus_core::model::{
    AdminUser, ApiMessage, CompletionRecord, Course, CourseId, Credentials, EnrollmentRequest,
    LoginResponse, ModuleDraft, NotePage, Question, Registration, ReportKind, Role, UploadFile,
    UserId, UserStatus,
};
use campus_core::session::Session;
use campus_core::traits::Backend;

use crate::config::CampusConfig;
use crate::error::{from_reqwest, from_response};

/// Multipart field name the upload endpoint expects.
const UPLOAD_FIELD: &str = "files";

/// HTTP implementation of [`Backend`].
///
/// The bearer token, when there is one, is installed as a default header
/// and therefore sent with every request.
pub struct HttpBackend {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(
        base_url: &str,
        token: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BackendError::Network(format!("invalid base URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::Network(format!(
                "invalid base URL {base_url}"
            )));
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| BackendError::Network(format!("invalid session token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(from_reqwest)?;

        Ok(Self { base_url, client })
    }

    /// Build a client for `config`, authenticated as `session` if given.
    pub fn from_config(
        config: &CampusConfig,
        session: Option<&Session>,
    ) -> Result<Self, BackendError> {
        Self::new(
            &config.base_url,
            session.map(|s| s.token.as_str()),
            config.timeout(),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        tracing::debug!(%method, %url, "backend request");
        self.client.request(method, url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response = request.send().await.map_err(from_reqwest)?;
        if !response.status().is_success() {
            return Err(from_response(response).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Send a mutating request whose reply is an optional message.
    async fn send_ack(&self, request: RequestBuilder) -> Result<ApiMessage, BackendError> {
        let response = request.send().await.map_err(from_reqwest)?;
        if !response.status().is_success() {
            return Err(from_response(response).await);
        }
        let body = response.text().await.map_err(from_reqwest)?;
        if body.trim().is_empty() {
            return Ok(ApiMessage::default());
        }
        // Acknowledgements that are not JSON objects carry nothing useful.
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<ApiMessage, BackendError> {
        self.send_ack(self.request(method, segments).json(body)).await
    }
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, BackendError> {
        self.send(self.request(Method::POST, &["login"]).json(credentials))
            .await
    }

    #[instrument(skip_all, fields(username = %registration.username))]
    async fn register(&self, registration: &Registration) -> Result<ApiMessage, BackendError> {
        self.send_json(Method::POST, &["registration"], registration)
            .await
    }

    #[instrument(skip(self))]
    async fn reset_password(&self, email: &str) -> Result<ApiMessage, BackendError> {
        self.send_json(Method::POST, &["reset-password"], &json!({ "email": email }))
            .await
    }

    #[instrument(skip(self))]
    async fn courses(&self) -> Result<Vec<Course>, BackendError> {
        self.send(self.request(Method::GET, &["courses"])).await
    }

    #[instrument(skip(self))]
    async fn course(&self, id: CourseId) -> Result<Course, BackendError> {
        let id = id.to_string();
        self.send(self.request(Method::GET, &["courses", &id])).await
    }

    #[instrument(skip(self))]
    async fn note_page(&self, course_title: &str, page: u32) -> Result<NotePage, BackendError> {
        let page = page.to_string();
        self.send(self.request(Method::GET, &["courses", course_title, "notes", &page]))
            .await
    }

    #[instrument(skip(self))]
    async fn assessment_questions(
        &self,
        course_title: &str,
    ) -> Result<Vec<Question>, BackendError> {
        self.send(self.request(Method::GET, &["assessments", course_title]))
            .await
    }

    #[instrument(skip(self))]
    async fn enroll(&self, request: &EnrollmentRequest) -> Result<ApiMessage, BackendError> {
        self.send_json(Method::POST, &["enrollments"], request).await
    }

    #[instrument(skip(self))]
    async fn record_completion(
        &self,
        record: &CompletionRecord,
    ) -> Result<ApiMessage, BackendError> {
        self.send_json(Method::PUT, &["enrollments", "complete"], record)
            .await
    }

    #[instrument(skip(self))]
    async fn admin_modules(&self) -> Result<Vec<Course>, BackendError> {
        self.send(self.request(Method::GET, &["admin", "modules"]))
            .await
    }

    #[instrument(skip(self))]
    async fn add_module(&self, draft: &ModuleDraft) -> Result<ApiMessage, BackendError> {
        self.send_json(Method::POST, &["admin", "modules"], draft)
            .await
    }

    #[instrument(skip(self))]
    async fn update_module(
        &self,
        id: CourseId,
        draft: &ModuleDraft,
    ) -> Result<ApiMessage, BackendError> {
        let id = id.to_string();
        self.send_json(Method::PUT, &["admin", "modules", &id], draft)
            .await
    }

    #[instrument(skip(self))]
    async fn delete_module(&self, id: CourseId) -> Result<ApiMessage, BackendError> {
        let id = id.to_string();
        self.send_ack(self.request(Method::DELETE, &["admin", "modules", &id]))
            .await
    }

    #[instrument(skip(self))]
    async fn publish_module(
        &self,
        id: CourseId,
        is_published: bool,
    ) -> Result<ApiMessage, BackendError> {
        let id = id.to_string();
        self.send_json(
            Method::PUT,
            &["admin", "modules", &id, "publish"],
            &json!({ "is_published": is_published }),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn assign_instructor(
        &self,
        id: CourseId,
        lecturer_id: UserId,
    ) -> Result<ApiMessage, BackendError> {
        let id = id.to_string();
        self.send_json(
            Method::PUT,
            &["admin", "modules", &id, "assign-instructor"],
            &json!({ "lecturer_id": lecturer_id }),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn admin_users(&self) -> Result<Vec<AdminUser>, BackendError> {
        self.send(self.request(Method::GET, &["admin", "users"]))
            .await
    }

    #[instrument(skip(self))]
    async fn set_user_role(&self, id: UserId, role: &Role) -> Result<ApiMessage, BackendError> {
        let id = id.to_string();
        self.send_json(
            Method::PUT,
            &["admin", "users", &id, "promote"],
            &json!({ "role": role }),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn set_user_status(
        &self,
        id: UserId,
        status: UserStatus,
    ) -> Result<ApiMessage, BackendError> {
        let id = id.to_string();
        self.send_json(
            Method::PUT,
            &["admin", "users", &id, "status"],
            &json!({ "status": status }),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: UserId) -> Result<ApiMessage, BackendError> {
        let id = id.to_string();
        self.send_ack(self.request(Method::DELETE, &["admin", "users", &id]))
            .await
    }

    #[instrument(skip(self))]
    async fn report(&self, kind: ReportKind) -> Result<serde_json::Value, BackendError> {
        self.send(self.request(Method::GET, &["admin", "reports", kind.slug()]))
            .await
    }

    #[instrument(skip_all, fields(count = files.len()))]
    async fn upload(&self, files: Vec<UploadFile>) -> Result<ApiMessage, BackendError> {
        let mut form = reqwest::multipart::Form::new();
        for file in files {
            let part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.file_name);
            form = form.part(UPLOAD_FIELD, part);
        }
        self.send_ack(self.request(Method::POST, &["upload"]).multipart(form))
            .await
    }
}
