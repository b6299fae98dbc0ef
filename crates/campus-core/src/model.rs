//! Core data model types for campus.
//!
//! These mirror the JSON shapes exchanged with the LMS backend. Field names
//! follow the backend: courses and admin payloads are snake_case, while the
//! enrollment and note endpoints use camelCase.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

pub type CourseId = i64;
pub type UserId = i64;
pub type QuestionId = i64;

/// An enrollable unit of content. The backend calls these both courses and
/// modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Credit count.
    #[serde(default)]
    pub credits: u32,
    /// Owning lecturer.
    #[serde(default)]
    pub lecturer_id: Option<UserId>,
    /// Number of note pages; zero means no notes are configured.
    #[serde(default)]
    pub pages: u32,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

fn default_true() -> bool {
    true
}

/// One page of course notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePage {
    /// HTML content of the page.
    pub content: String,
    pub page_number: u32,
}

/// Completion status of an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    Pending,
    Completed,
    Failed,
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionStatus::Pending => write!(f, "pending"),
            CompletionStatus::Completed => write!(f, "completed"),
            CompletionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A learner's enrollment in a course, as tracked by the learner dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub user_id: UserId,
    pub module_id: CourseId,
    pub completion_status: CompletionStatus,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub completion_date: Option<DateTime<Utc>>,
}

impl Enrollment {
    /// A freshly created, not yet graded enrollment.
    pub fn pending(user_id: UserId, module_id: CourseId) -> Self {
        Self {
            user_id,
            module_id,
            completion_status: CompletionStatus::Pending,
            score: None,
            completion_date: None,
        }
    }
}

/// Body of `POST /enrollments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRequest {
    pub user_id: UserId,
    pub module_id: CourseId,
}

/// Body of `PUT /enrollments/complete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub user_id: UserId,
    pub module_id: CourseId,
    pub completion_status: CompletionStatus,
    pub score: f64,
    pub completion_date: DateTime<Utc>,
}

/// An assessment question.
///
/// A question with a non-empty option list is multiple choice; otherwise it
/// is free text. The backend may send `options` as a JSON-encoded string, so
/// it is decoded leniently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    /// Prompt text.
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(default, deserialize_with = "deserialize_options")]
    pub options: Vec<String>,
    /// The correct answer (an option literal for multiple choice).
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub answer: String,
}

impl Question {
    pub fn is_multiple_choice(&self) -> bool {
        !self.options.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOptions {
    List(Vec<String>),
    Encoded(String),
}

fn deserialize_options<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawOptions>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(RawOptions::List(options)) => Ok(options),
        Some(RawOptions::Encoded(encoded)) => {
            let encoded = encoded.trim();
            if encoded.is_empty() || encoded == "null" {
                return Ok(Vec::new());
            }
            serde_json::from_str::<Option<Vec<String>>>(encoded)
                .map(Option::unwrap_or_default)
                .map_err(|e| de::Error::custom(format!("invalid encoded options: {e}")))
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawScalar>::deserialize(deserializer)? {
        None => String::new(),
        Some(RawScalar::Text(s)) => s,
        Some(RawScalar::Integer(n)) => n.to_string(),
        Some(RawScalar::Float(n)) => n.to_string(),
        Some(RawScalar::Flag(b)) => b.to_string(),
    })
}

/// User roles recognised by the dashboards.
///
/// Anything the backend sends that is not one of the three known roles is
/// kept verbatim in `Other` and routed to the default dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Learner,
    Lecturer,
    Administrator,
    Other(String),
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "learner" => Role::Learner,
            "lecturer" => Role::Lecturer,
            "administrator" => Role::Administrator,
            _ => Role::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Learner => write!(f, "learner"),
            Role::Lecturer => write!(f, "lecturer"),
            Role::Administrator => write!(f, "administrator"),
            Role::Other(other) => write!(f, "{other}"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("role must not be empty".to_string());
        }
        Ok(Role::from(s.trim().to_string()))
    }
}

/// Body of `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Body of `POST /registration`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Successful login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub username: String,
    #[serde(default, alias = "userId", alias = "id")]
    pub user_id: Option<UserId>,
}

/// Generic acknowledgement body. Most mutating endpoints answer with an
/// optional `message`; failures carry an `error`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Module payload for the admin create/update endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub credits: u32,
    pub lecturer_id: UserId,
    pub pages: u32,
    pub is_published: bool,
}

/// Account status toggled by administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Disabled,
}

impl UserStatus {
    pub fn toggled(self) -> Self {
        match self {
            UserStatus::Active => UserStatus::Disabled,
            UserStatus::Disabled => UserStatus::Active,
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Disabled => write!(f, "disabled"),
        }
    }
}

impl FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(UserStatus::Active),
            "disabled" => Ok(UserStatus::Disabled),
            other => Err(format!("unknown user status: {other}")),
        }
    }
}

/// A user as listed by `GET /admin/users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    #[serde(default = "default_status")]
    pub status: UserStatus,
}

fn default_status() -> UserStatus {
    UserStatus::Active
}

/// The three admin report endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    Enrollments,
    CompletionRates,
    Revenue,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [
        ReportKind::Enrollments,
        ReportKind::CompletionRates,
        ReportKind::Revenue,
    ];

    /// Path segment under `/admin/reports/`.
    pub fn slug(self) -> &'static str {
        match self {
            ReportKind::Enrollments => "enrollments",
            ReportKind::CompletionRates => "completion-rates",
            ReportKind::Revenue => "revenue",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportKind::Enrollments => "Enrollments",
            ReportKind::CompletionRates => "Completion Rates",
            ReportKind::Revenue => "Revenue",
        }
    }
}

/// The three admin reports, fetched together.
///
/// Report bodies are computed by the backend and displayed as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemReports {
    pub enrollments: serde_json::Value,
    pub completion_rates: serde_json::Value,
    pub revenue: serde_json::Value,
    pub fetched_at: DateTime<Utc>,
}

impl SystemReports {
    pub fn get(&self, kind: ReportKind) -> &serde_json::Value {
        match kind {
            ReportKind::Enrollments => &self.enrollments,
            ReportKind::CompletionRates => &self.completion_rates,
            ReportKind::Revenue => &self.revenue,
        }
    }
}

/// A module kept in the lecturer's local catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LecturerModule {
    pub id: i64,
    pub title: String,
    pub code: String,
    pub description: String,
    /// Name of the attached file, or `"No file"`.
    pub file_name: String,
}

/// A file to send through `POST /upload`.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Everything a completion certificate shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateData {
    pub learner_name: String,
    pub course_title: String,
    /// Percentage score in `[0, 100]`.
    pub score: f64,
    pub issued_on: NaiveDate,
}

impl CertificateData {
    /// The score as printed on the certificate, e.g. `"100.00%"`.
    pub fn score_label(&self) -> String {
        format!("{:.2}%", self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_options_decode_from_encoded_string() {
        let json = r#"{"id": 1, "question": "Capital of France?", "options": "[\"Paris\", \"Lyon\"]", "answer": "Paris"}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.options, vec!["Paris", "Lyon"]);
        assert!(q.is_multiple_choice());
    }

    #[test]
    fn question_options_accept_array_null_and_missing() {
        let array: Question = serde_json::from_str(
            r#"{"id": 1, "question": "q", "options": ["a", "b"], "answer": "a"}"#,
        )
        .unwrap();
        assert_eq!(array.options.len(), 2);

        let null: Question =
            serde_json::from_str(r#"{"id": 2, "question": "q", "options": null, "answer": "x"}"#)
                .unwrap();
        assert!(!null.is_multiple_choice());

        let missing: Question =
            serde_json::from_str(r#"{"id": 3, "question": "q", "answer": "x"}"#).unwrap();
        assert!(missing.options.is_empty());

        let empty_string: Question =
            serde_json::from_str(r#"{"id": 4, "question": "q", "options": "", "answer": "x"}"#)
                .unwrap();
        assert!(empty_string.options.is_empty());
    }

    #[test]
    fn question_rejects_malformed_encoded_options() {
        let result = serde_json::from_str::<Question>(
            r#"{"id": 1, "question": "q", "options": "[not json", "answer": "x"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn numeric_answers_become_strings() {
        let q: Question =
            serde_json::from_str(r#"{"id": 9, "question": "2 + 2?", "answer": 4}"#).unwrap();
        assert_eq!(q.answer, "4");
    }

    #[test]
    fn role_parse_and_display() {
        assert_eq!("learner".parse::<Role>().unwrap(), Role::Learner);
        assert_eq!("Lecturer".parse::<Role>().unwrap(), Role::Lecturer);
        assert_eq!(
            "administrator".parse::<Role>().unwrap(),
            Role::Administrator
        );
        assert_eq!(
            "guest".parse::<Role>().unwrap(),
            Role::Other("guest".into())
        );
        assert!("  ".parse::<Role>().is_err());
        assert_eq!(Role::Other("guest".into()).to_string(), "guest");
    }

    #[test]
    fn login_response_accepts_user_id_aliases() {
        let camel: LoginResponse = serde_json::from_str(
            r#"{"token": "t", "role": "learner", "username": "ada", "userId": 7}"#,
        )
        .unwrap();
        assert_eq!(camel.user_id, Some(7));
        assert_eq!(camel.role, Role::Learner);

        let absent: LoginResponse =
            serde_json::from_str(r#"{"token": "t", "role": "admin", "username": "root"}"#)
                .unwrap();
        assert_eq!(absent.user_id, None);
        assert_eq!(absent.role, Role::Other("admin".into()));
    }

    #[test]
    fn completion_record_uses_camel_case() {
        let record = CompletionRecord {
            user_id: 1,
            module_id: 2,
            completion_status: CompletionStatus::Completed,
            score: 100.0,
            completion_date: Utc::now(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["userId"], 1);
        assert_eq!(value["moduleId"], 2);
        assert_eq!(value["completionStatus"], "completed");
        assert!(value.get("completionDate").is_some());
    }

    #[test]
    fn course_defaults_for_sparse_payload() {
        let course: Course = serde_json::from_str(r#"{"id": 3, "title": "Rust"}"#).unwrap();
        assert_eq!(course.pages, 0);
        assert!(course.is_published);
        assert_eq!(course.lecturer_id, None);
    }

    #[test]
    fn certificate_score_label_has_two_decimals() {
        let cert = CertificateData {
            learner_name: "Ada".into(),
            course_title: "Rust".into(),
            score: 100.0,
            issued_on: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        };
        assert_eq!(cert.score_label(), "100.00%");
    }

    #[test]
    fn user_status_toggles() {
        assert_eq!(UserStatus::Active.toggled(), UserStatus::Disabled);
        assert_eq!("DISABLED".parse::<UserStatus>().unwrap(), UserStatus::Disabled);
        assert!("banned".parse::<UserStatus>().is_err());
    }
}
