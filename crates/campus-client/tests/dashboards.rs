//! Auth, admin and lecturer flows against the in-memory backend.

use std::sync::Arc;

use campus_client::MockBackend;
use campus_core::admin::{AdminDashboard, ADMIN_ROLE_REFUSED, REPORTS_FAILED};
use campus_core::auth;
use campus_core::error::DashboardError;
use campus_core::lecturer::{LecturerCatalog, LecturerDashboard, NO_FILE};
use campus_core::model::{AdminUser, Course, LoginResponse, ReportKind, Role, UploadFile, UserStatus};
use campus_core::routing::Route;
use campus_core::session::{Session, SessionStore};
use campus_core::validate::{LecturerModuleForm, ModuleForm, RegistrationForm};

fn session(role: Role) -> Session {
    Session {
        token: "tok".into(),
        role,
        username: "root".into(),
        user_id: Some(1),
    }
}

fn user(id: i64, role: Role, status: UserStatus) -> AdminUser {
    AdminUser {
        id,
        username: format!("user{id}"),
        email: format!("user{id}@example.com"),
        role,
        status,
    }
}

fn module_form() -> ModuleForm {
    ModuleForm {
        title: "Databases".into(),
        description: "SQL basics".into(),
        credits: "20".into(),
        lecturer_id: "3".into(),
        pages: "12".into(),
        is_published: true,
    }
}

fn lecturer_form(title: &str) -> LecturerModuleForm {
    LecturerModuleForm {
        title: title.into(),
        code: "CS101".into(),
        description: "Intro".into(),
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_stores_session_and_routes_by_role() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));
    let backend = MockBackend::new().with_login(LoginResponse {
        token: "abc".into(),
        role: Role::Administrator,
        username: "root".into(),
        user_id: Some(1),
    });

    let outcome = auth::login(&backend, &store, "root", "pw").await.unwrap();
    assert_eq!(outcome.route, Route::AdminDashboard);
    assert_eq!(store.load().unwrap().unwrap().token, "abc");

    auth::logout(&store).unwrap();
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn unknown_role_lands_on_default_dashboard() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));
    let backend = MockBackend::new().with_login(LoginResponse {
        token: "abc".into(),
        role: Role::Other("auditor".into()),
        username: "eve".into(),
        user_id: None,
    });

    let outcome = auth::login(&backend, &store, "eve", "pw").await.unwrap();
    assert_eq!(outcome.route, Route::DefaultDashboard);
}

#[tokio::test]
async fn login_validation_happens_before_request() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));
    let backend = MockBackend::new();

    let err = auth::login(&backend, &store, "", "pw").await.unwrap_err();
    assert!(matches!(err, DashboardError::Validation(_)));
    assert_eq!(err.user_message(), "Please enter your username and password.");
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn rejected_login_surfaces_backend_message() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));
    let backend = MockBackend::new().fail_on("login", 401, Some("Invalid username or password."));

    let err = auth::login(&backend, &store, "root", "bad").await.unwrap_err();
    assert_eq!(err.user_message(), "Invalid username or password.");
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn register_and_reset_password() {
    let backend = MockBackend::new();
    let form = RegistrationForm {
        firstname: "Ada".into(),
        lastname: "Lovelace".into(),
        username: "ada".into(),
        email: "ada@example.com".into(),
        password: "pw".into(),
        role: None,
    };
    let message = auth::register(&backend, form).await.unwrap();
    assert_eq!(message, auth::REGISTRATION_OK);

    let message = auth::reset_password(&backend, "ada@example.com").await.unwrap();
    assert_eq!(message, auth::RESET_LINK_SENT);

    assert!(auth::reset_password(&backend, " ").await.is_err());
    assert_eq!(backend.calls(), vec!["register", "reset_password"]);
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_module_lifecycle() {
    let backend = Arc::new(MockBackend::new());
    let mut dashboard = AdminDashboard::new(backend.clone(), Some(session(Role::Administrator)));

    let message = dashboard.add_module(&module_form()).await.unwrap();
    assert_eq!(message, "Module added successfully!");
    let modules = dashboard.refresh_modules().await.unwrap().to_vec();
    assert_eq!(modules.len(), 1);
    let id = modules[0].id;

    let message = dashboard.toggle_publish(id, true).await.unwrap();
    assert_eq!(message, "Module unpublished successfully!");
    assert!(!backend.modules()[0].is_published);

    let message = dashboard.assign_instructor(id, "8").await.unwrap();
    assert_eq!(message, "Instructor assigned successfully!");
    assert_eq!(backend.modules()[0].lecturer_id, Some(8));

    let mut form = module_form();
    form.title = "Advanced Databases".into();
    dashboard.update_module(id, &form).await.unwrap();
    assert_eq!(backend.modules()[0].title, "Advanced Databases");

    dashboard.delete_module(id).await.unwrap();
    assert!(backend.modules().is_empty());
}

#[tokio::test]
async fn invalid_module_form_never_reaches_backend() {
    let backend = Arc::new(MockBackend::new());
    let mut dashboard = AdminDashboard::new(backend.clone(), Some(session(Role::Administrator)));

    let mut form = module_form();
    form.credits = "-3".into();
    let err = dashboard.add_module(&form).await.unwrap_err();
    assert!(matches!(err, DashboardError::Validation(_)));
    assert_eq!(
        dashboard.notices().last_error(),
        Some("Credits must be a positive number.")
    );

    let err = dashboard.assign_instructor(1, "zero").await.unwrap_err();
    assert_eq!(
        err.user_message(),
        "Invalid Lecturer ID. Please enter a positive number."
    );
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn admin_failure_message_includes_backend_error() {
    let backend = Arc::new(MockBackend::new().fail_on("delete_module", 400, Some("Module has enrollments")));
    let mut dashboard = AdminDashboard::new(backend, Some(session(Role::Administrator)));

    dashboard.delete_module(4).await.unwrap_err();
    assert_eq!(
        dashboard.notices().last_error(),
        Some("Failed to delete module: Module has enrollments")
    );
}

#[tokio::test]
async fn user_role_and_status_toggles() {
    let backend = Arc::new(MockBackend::new().with_users(vec![
        user(1, Role::Administrator, UserStatus::Active),
        user(2, Role::Lecturer, UserStatus::Active),
        user(3, Role::Learner, UserStatus::Disabled),
    ]));
    let mut dashboard = AdminDashboard::new(backend.clone(), Some(session(Role::Administrator)));
    dashboard.refresh_users().await.unwrap();

    let err = dashboard.toggle_role(1).await.unwrap_err();
    assert_eq!(err.user_message(), ADMIN_ROLE_REFUSED);
    assert_eq!(backend.users()[0].role, Role::Administrator);

    let message = dashboard.toggle_role(2).await.unwrap();
    assert_eq!(message, "User role updated to learner successfully!");
    assert_eq!(backend.users()[1].role, Role::Learner);
    assert_eq!(dashboard.users()[1].role, Role::Learner);

    dashboard.toggle_role(3).await.unwrap();
    assert_eq!(backend.users()[2].role, Role::Lecturer);

    let message = dashboard.toggle_status(3).await.unwrap();
    assert_eq!(message, "User status set to active successfully!");
    assert_eq!(backend.users()[2].status, UserStatus::Active);

    dashboard.delete_user(2).await.unwrap();
    assert_eq!(backend.users().len(), 2);
    assert_eq!(dashboard.users().len(), 2);
}

#[tokio::test]
async fn reports_are_fetched_together() {
    let backend = Arc::new(
        MockBackend::new()
            .with_report(ReportKind::Enrollments, serde_json::json!([{"module": "Rust", "count": 12}]))
            .with_report(ReportKind::Revenue, serde_json::json!({"total": 1200})),
    );
    let mut dashboard = AdminDashboard::new(backend.clone(), Some(session(Role::Administrator)));

    let reports = dashboard.refresh_reports().await.unwrap();
    assert_eq!(reports.get(ReportKind::Enrollments)[0]["count"], 12);
    assert_eq!(reports.get(ReportKind::Revenue)["total"], 1200);
    assert_eq!(reports.get(ReportKind::CompletionRates), &serde_json::json!([]));
    assert_eq!(backend.call_count(), 3);
}

#[tokio::test]
async fn any_report_failure_fails_all() {
    let backend = Arc::new(MockBackend::new().fail_on("report", 500, None));
    let mut dashboard = AdminDashboard::new(backend, Some(session(Role::Administrator)));

    assert!(dashboard.refresh_reports().await.is_err());
    assert!(dashboard.reports().is_none());
    assert_eq!(dashboard.notices().last_error(), Some(REPORTS_FAILED));
}

#[tokio::test]
async fn admin_mutations_need_a_session() {
    let backend = Arc::new(MockBackend::new().with_courses(vec![Course {
        id: 1,
        title: "Rust".into(),
        description: String::new(),
        credits: 5,
        lecturer_id: None,
        pages: 2,
        is_published: true,
    }]));
    let mut dashboard = AdminDashboard::new(backend.clone(), None);

    let err = dashboard.delete_module(1).await.unwrap_err();
    assert!(matches!(err, DashboardError::Unauthenticated(_)));
    assert_eq!(backend.modules().len(), 1);
}

// ---------------------------------------------------------------------------
// Lecturer
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lecturer_catalogue_with_attachments() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(MockBackend::new());
    let catalog = LecturerCatalog::in_dir(dir.path());
    let mut dashboard =
        LecturerDashboard::new(backend.clone(), Some(session(Role::Lecturer)), catalog.clone());
    dashboard.load().unwrap();

    let plain = dashboard.add(lecturer_form("Intro"), None).await.unwrap();
    assert_eq!(plain.file_name, NO_FILE);
    assert_eq!(
        dashboard.notices().last(),
        Some("Module \"Intro\" added successfully!")
    );

    let file = UploadFile {
        file_name: "week1.pdf".into(),
        bytes: vec![1, 2, 3],
    };
    let attached = dashboard.add(lecturer_form("Week 1"), Some(file)).await.unwrap();
    assert_eq!(attached.file_name, "week1.pdf");
    assert_eq!(backend.uploads(), vec!["week1.pdf"]);
    assert!(attached.id > plain.id);

    let updated = dashboard
        .update(attached.id, lecturer_form("Week One"), None)
        .await
        .unwrap();
    assert_eq!(updated.file_name, "week1.pdf");
    assert_eq!(updated.title, "Week One");

    dashboard.delete(plain.id).unwrap();
    let stored = catalog.load().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].title, "Week One");
}

#[tokio::test]
async fn lecturer_validation_and_session_rules() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(MockBackend::new());
    let catalog = LecturerCatalog::in_dir(dir.path());

    let mut anonymous = LecturerDashboard::new(backend.clone(), None, catalog.clone());
    let err = anonymous.add(lecturer_form("Intro"), None).await.unwrap_err();
    assert!(matches!(err, DashboardError::Unauthenticated(_)));

    let mut dashboard = LecturerDashboard::new(backend, Some(session(Role::Lecturer)), catalog.clone());
    let err = dashboard
        .add(lecturer_form(" "), None)
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Please fill all module fields.");

    assert!(dashboard.delete(42).is_err());
    assert!(catalog.load().unwrap().is_empty());
}

#[tokio::test]
async fn failed_upload_does_not_add_module() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(MockBackend::new().fail_on("upload", 413, Some("File too large")));
    let catalog = LecturerCatalog::in_dir(dir.path());
    let mut dashboard = LecturerDashboard::new(backend, Some(session(Role::Lecturer)), catalog.clone());

    let file = UploadFile {
        file_name: "huge.mp4".into(),
        bytes: vec![0; 16],
    };
    dashboard
        .add(lecturer_form("Video"), Some(file))
        .await
        .unwrap_err();
    assert_eq!(
        dashboard.notices().last_error(),
        Some("Failed to upload file: File too large")
    );
    assert!(dashboard.modules().is_empty());
    assert!(catalog.load().unwrap().is_empty());
}
