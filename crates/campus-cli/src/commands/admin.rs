//! The `campus admin` commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use comfy_table::{Cell, Table};

use campus_core::admin::AdminDashboard;
use campus_core::error::DashboardError;
use campus_core::model::{AdminUser, Course, ReportKind, SystemReports};
use campus_core::validate::ModuleForm;
use campus_report::{write_reports_html, ReportTable};

use super::{failure, App};

#[derive(Args)]
pub struct ModuleArgs {
    #[arg(long)]
    title: String,

    #[arg(long, default_value = "")]
    description: String,

    #[arg(long)]
    credits: String,

    #[arg(long)]
    lecturer_id: String,

    /// Number of note pages
    #[arg(long)]
    pages: String,

    /// Keep the module hidden from learners
    #[arg(long)]
    unpublished: bool,
}

impl From<ModuleArgs> for ModuleForm {
    fn from(args: ModuleArgs) -> Self {
        ModuleForm {
            title: args.title,
            description: args.description,
            credits: args.credits,
            lecturer_id: args.lecturer_id,
            pages: args.pages,
            is_published: !args.unpublished,
        }
    }
}

#[derive(Subcommand)]
pub enum AdminAction {
    /// List all modules
    Modules,

    /// Create a module
    AddModule(ModuleArgs),

    /// Replace a module's fields
    UpdateModule {
        #[arg(long)]
        id: i64,

        #[command(flatten)]
        module: ModuleArgs,
    },

    /// Delete a module
    DeleteModule {
        #[arg(long)]
        id: i64,
    },

    /// Make a module visible to learners
    Publish {
        #[arg(long)]
        id: i64,
    },

    /// Hide a module from learners
    Unpublish {
        #[arg(long)]
        id: i64,
    },

    /// Assign a lecturer to a module
    AssignInstructor {
        #[arg(long)]
        id: i64,

        /// Lecturer user id
        #[arg(long)]
        lecturer: String,
    },

    /// List all users
    Users,

    /// Switch a user between lecturer and learner
    ToggleRole {
        #[arg(long)]
        id: i64,
    },

    /// Switch a user between active and disabled
    ToggleStatus {
        #[arg(long)]
        id: i64,
    },

    /// Delete a user
    DeleteUser {
        #[arg(long)]
        id: i64,
    },

    /// Show the system reports
    Reports {
        /// Also write the reports as an HTML page
        #[arg(long)]
        html: Option<PathBuf>,
    },
}

pub async fn execute(config_path: Option<&Path>, action: AdminAction) -> Result<()> {
    let app = App::load(config_path)?;
    let mut dashboard =
        AdminDashboard::new(app.backend()?, app.session.clone()).with_notices(app.notices());
    let html = match &action {
        AdminAction::Reports { html } => html.clone(),
        _ => None,
    };

    match perform(&mut dashboard, action).await {
        Ok(Some(message)) => println!("{message}"),
        Ok(None) => {}
        Err(e) => return Err(failure(dashboard.notices(), e)),
    }

    if let (Some(path), Some(reports)) = (html, dashboard.reports()) {
        write_reports_html(reports, &path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Reports written to {}", path.display());
    }
    Ok(())
}

/// Run one action. Listings print themselves; mutations return the
/// confirmation to show.
async fn perform(
    dashboard: &mut AdminDashboard,
    action: AdminAction,
) -> Result<Option<String>, DashboardError> {
    let message = match action {
        AdminAction::Modules => {
            print_modules(dashboard.refresh_modules().await?);
            return Ok(None);
        }
        AdminAction::AddModule(module) => dashboard.add_module(&module.into()).await?,
        AdminAction::UpdateModule { id, module } => {
            dashboard.update_module(id, &module.into()).await?
        }
        AdminAction::DeleteModule { id } => dashboard.delete_module(id).await?,
        AdminAction::Publish { id } => dashboard.toggle_publish(id, false).await?,
        AdminAction::Unpublish { id } => dashboard.toggle_publish(id, true).await?,
        AdminAction::AssignInstructor { id, lecturer } => {
            dashboard.assign_instructor(id, &lecturer).await?
        }
        AdminAction::Users => {
            print_users(dashboard.refresh_users().await?);
            return Ok(None);
        }
        AdminAction::ToggleRole { id } => {
            dashboard.refresh_users().await?;
            dashboard.toggle_role(id).await?
        }
        AdminAction::ToggleStatus { id } => {
            dashboard.refresh_users().await?;
            dashboard.toggle_status(id).await?
        }
        AdminAction::DeleteUser { id } => dashboard.delete_user(id).await?,
        AdminAction::Reports { .. } => {
            print_reports(dashboard.refresh_reports().await?);
            return Ok(None);
        }
    };
    Ok(Some(message))
}

pub fn print_modules(modules: &[Course]) {
    if modules.is_empty() {
        println!("No modules.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "ID",
        "Title",
        "Credits",
        "Lecturer",
        "Pages",
        "Published",
    ]);
    for module in modules {
        table.add_row(vec![
            Cell::new(module.id),
            Cell::new(&module.title),
            Cell::new(module.credits),
            Cell::new(
                module
                    .lecturer_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(module.pages),
            Cell::new(if module.is_published { "yes" } else { "no" }),
        ]);
    }
    println!("{table}");
}

pub fn print_users(users: &[AdminUser]) {
    if users.is_empty() {
        println!("No users.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Username", "Email", "Role", "Status"]);
    for user in users {
        table.add_row(vec![
            Cell::new(user.id),
            Cell::new(&user.username),
            Cell::new(&user.email),
            Cell::new(&user.role),
            Cell::new(user.status),
        ]);
    }
    println!("{table}");
}

fn print_reports(reports: &SystemReports) {
    for kind in ReportKind::ALL {
        println!("\n{}", kind.title());
        let report = ReportTable::from_value(reports.get(kind));
        if report.is_empty() {
            println!("No data.");
            continue;
        }
        let mut table = Table::new();
        table.set_header(report.headers.clone());
        for row in &report.rows {
            table.add_row(row.clone());
        }
        println!("{table}");
    }
}
