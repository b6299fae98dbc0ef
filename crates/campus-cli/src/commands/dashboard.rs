//! The `campus dashboard` command: open a route and render its view.

use std::path::Path;

use anyhow::Result;

use campus_core::admin::AdminDashboard;
use campus_core::learner::LearnerDashboard;
use campus_core::lecturer::{LecturerCatalog, LecturerDashboard};
use campus_core::routing::{Route, View};

use super::{admin, courses, failure, lecturer, App};

pub async fn execute(config_path: Option<&Path>, path: Option<String>) -> Result<()> {
    let app = App::load(config_path)?;
    let route = match (&path, &app.session) {
        (Some(path), _) => Route::parse(path),
        (None, Some(session)) => session.home(),
        (None, None) => Route::Login,
    };
    tracing::debug!(%route, "opening route");

    match route.view() {
        View::NotFound => {
            println!("404 - Page Not Found");
            println!("No page at {route}.");
        }
        View::LoginRegister { register: false } => {
            println!("Log in with: campus login --username <name> --password <password>");
            println!("No account? campus register --help");
        }
        View::LoginRegister { register: true } => {
            println!("Create an account with:");
            println!(
                "  campus register --firstname <first> --lastname <last> \\\n    --username <name> --email <email> --password <password>"
            );
        }
        View::Learner => {
            println!("Learner dashboard ({route})");
            let mut dashboard = LearnerDashboard::new(app.backend()?, app.session.clone())
                .with_notices(app.notices());
            match dashboard.refresh_courses().await {
                Ok(courses) => courses::print_courses(courses),
                Err(e) => return Err(failure(dashboard.notices(), e)),
            }
            println!("Start a course with: campus learn --course <id>");
        }
        View::Lecturer => {
            println!("Lecturer dashboard ({route})");
            let catalog = LecturerCatalog::in_dir(&app.config.data_dir);
            let mut dashboard =
                LecturerDashboard::new(app.backend()?, app.session.clone(), catalog)
                    .with_notices(app.notices());
            match dashboard.load() {
                Ok(modules) => lecturer::print_modules(modules),
                Err(e) => return Err(failure(dashboard.notices(), e)),
            }
        }
        View::Admin => {
            println!("Admin dashboard ({route})");
            let mut dashboard =
                AdminDashboard::new(app.backend()?, app.session.clone()).with_notices(app.notices());
            match dashboard.refresh_modules().await {
                Ok(modules) => admin::print_modules(modules),
                Err(e) => return Err(failure(dashboard.notices(), e)),
            }
            match dashboard.refresh_users().await {
                Ok(users) => admin::print_users(users),
                Err(e) => return Err(failure(dashboard.notices(), e)),
            }
        }
        View::PdfViewer => {
            println!("Certificates ({route})");
            print_certificates(&app.config.certificate_dir)?;
        }
    }

    Ok(())
}

fn print_certificates(dir: &Path) -> Result<()> {
    if !dir.exists() {
        println!("No certificates yet. Pass an assessment with `campus learn` to earn one.");
        return Ok(());
    }
    let mut found = false;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "html") {
            found = true;
            println!("  {}", path.display());
        }
    }
    if !found {
        println!("No certificates in {}.", dir.display());
    }
    Ok(())
}
