//! The `campus lecturer` commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use comfy_table::{Cell, Table};

use campus_core::error::DashboardError;
use campus_core::lecturer::{LecturerCatalog, LecturerDashboard};
use campus_core::model::{LecturerModule, UploadFile};
use campus_core::validate::LecturerModuleForm;

use super::{failure, flush, App};

#[derive(Args)]
pub struct ModuleArgs {
    #[arg(long)]
    title: String,

    /// Module code, e.g. CS101
    #[arg(long)]
    code: String,

    #[arg(long)]
    description: String,

    /// File to upload and attach
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum LecturerAction {
    /// List the catalogue
    List,

    /// Add a module
    Add(ModuleArgs),

    /// Replace a module's fields; the attachment is kept unless --file is given
    Update {
        #[arg(long)]
        id: i64,

        #[command(flatten)]
        module: ModuleArgs,
    },

    /// Remove a module
    Delete {
        #[arg(long)]
        id: i64,
    },
}

pub async fn execute(config_path: Option<&Path>, action: LecturerAction) -> Result<()> {
    let app = App::load(config_path)?;
    let file = match &action {
        LecturerAction::Add(args) | LecturerAction::Update { module: args, .. } => {
            args.file.as_deref().map(read_upload).transpose()?
        }
        _ => None,
    };

    let catalog = LecturerCatalog::in_dir(&app.config.data_dir);
    let mut dashboard = LecturerDashboard::new(app.backend()?, app.session.clone(), catalog)
        .with_notices(app.notices());
    if let Err(e) = apply(&mut dashboard, action, file).await {
        return Err(failure(dashboard.notices(), e));
    }
    flush(dashboard.notices_mut());
    Ok(())
}

async fn apply(
    dashboard: &mut LecturerDashboard,
    action: LecturerAction,
    file: Option<UploadFile>,
) -> Result<(), DashboardError> {
    dashboard.load()?;
    match action {
        LecturerAction::List => print_modules(dashboard.modules()),
        LecturerAction::Add(args) => {
            dashboard.add(args.into(), file).await?;
        }
        LecturerAction::Update { id, module } => {
            dashboard.update(id, module.into(), file).await?;
        }
        LecturerAction::Delete { id } => dashboard.delete(id)?,
    }
    Ok(())
}

impl From<ModuleArgs> for LecturerModuleForm {
    fn from(args: ModuleArgs) -> Self {
        LecturerModuleForm {
            title: args.title,
            code: args.code,
            description: args.description,
        }
    }
}

fn read_upload(path: &Path) -> Result<UploadFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("not a file: {}", path.display()))?;
    Ok(UploadFile { file_name, bytes })
}

pub fn print_modules(modules: &[LecturerModule]) {
    if modules.is_empty() {
        println!("No modules yet. Add one with: campus lecturer add --help");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Code", "Title", "Description", "File"]);
    for module in modules {
        table.add_row(vec![
            Cell::new(module.id),
            Cell::new(&module.code),
            Cell::new(&module.title),
            Cell::new(&module.description),
            Cell::new(&module.file_name),
        ]);
    }
    println!("{table}");
}
