//! The `campus courses` command.

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Table};

use campus_core::learner::LearnerDashboard;
use campus_core::model::Course;

use super::{failure, App};

pub async fn execute(config_path: Option<&Path>) -> Result<()> {
    let app = App::load(config_path)?;
    let mut dashboard =
        LearnerDashboard::new(app.backend()?, app.session.clone()).with_notices(app.notices());

    match dashboard.refresh_courses().await {
        Ok(courses) => print_courses(courses),
        Err(e) => return Err(failure(dashboard.notices(), e)),
    }
    Ok(())
}

pub fn print_courses(courses: &[Course]) {
    if courses.is_empty() {
        println!("No courses available.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Credits", "Pages", "Published"]);
    for course in courses {
        table.add_row(vec![
            Cell::new(course.id),
            Cell::new(&course.title),
            Cell::new(course.credits),
            Cell::new(course.pages),
            Cell::new(if course.is_published { "yes" } else { "no" }),
        ]);
    }
    println!("{table}");
}
