//! The lecturer dashboard: a locally stored module catalogue with file
//! attachments uploaded to the backend.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::instrument;

use crate::error::DashboardError;
use crate::model::{LecturerModule, UploadFile};
use crate::notify::Notices;
use crate::session::{self, Session};
use crate::traits::Backend;
use crate::validate::{self, LecturerModuleForm};

/// File name recorded for modules without an attachment.
pub const NO_FILE: &str = "No file";

/// Catalogue file name inside the data directory.
pub const CATALOG_FILE: &str = "lecturer_modules.json";

/// JSON file holding the lecturer's modules.
#[derive(Debug, Clone)]
pub struct LecturerCatalog {
    path: PathBuf,
}

impl LecturerCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The catalogue inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(CATALOG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored modules. A missing file is an empty catalogue.
    pub fn load(&self) -> Result<Vec<LecturerModule>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read catalogue: {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse catalogue: {}", self.path.display()))
    }

    pub fn save(&self, modules: &[LecturerModule]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(modules)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write catalogue: {}", self.path.display()))
    }
}

/// Lecturer dashboard state.
pub struct LecturerDashboard {
    backend: Arc<dyn Backend>,
    session: Option<Session>,
    catalog: LecturerCatalog,
    modules: Vec<LecturerModule>,
    notices: Notices,
}

impl LecturerDashboard {
    pub fn new(backend: Arc<dyn Backend>, session: Option<Session>, catalog: LecturerCatalog) -> Self {
        Self {
            backend,
            session,
            catalog,
            modules: Vec::new(),
            notices: Notices::default(),
        }
    }

    pub fn with_notices(mut self, notices: Notices) -> Self {
        self.notices = notices;
        self
    }

    pub fn modules(&self) -> &[LecturerModule] {
        &self.modules
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

    /// Reload the catalogue from disk.
    pub fn load(&mut self) -> Result<&[LecturerModule], DashboardError> {
        match self.catalog.load() {
            Ok(modules) => {
                self.modules = modules;
                Ok(&self.modules)
            }
            Err(e) => self.fail(DashboardError::local("Failed to load courses.", e)),
        }
    }

    fn persist(&mut self, failure: &str) -> Result<(), DashboardError> {
        match self.catalog.save(&self.modules) {
            Ok(()) => Ok(()),
            Err(e) => self.fail(DashboardError::local(failure, e)),
        }
    }

    /// Upload the attachment, if any, and return the name to record.
    async fn attach(&mut self, file: Option<UploadFile>) -> Result<String, DashboardError> {
        let Some(file) = file else {
            return Ok(NO_FILE.to_string());
        };
        let file_name = file.file_name.clone();
        match self.backend.upload(vec![file]).await {
            Ok(_) => {
                tracing::info!(%file_name, "attachment uploaded");
                Ok(file_name)
            }
            Err(e) => {
                self.notices
                    .error(format!("Failed to upload file: {}", e.user_message()));
                Err(e.into())
            }
        }
    }

    fn next_id(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let highest = self.modules.iter().map(|m| m.id).max().unwrap_or(0);
        now.max(highest + 1)
    }

    #[instrument(skip_all, fields(title = %form.title))]
    pub async fn add(
        &mut self,
        form: LecturerModuleForm,
        file: Option<UploadFile>,
    ) -> Result<LecturerModule, DashboardError> {
        if let Err(e) = session::require(self.session.as_ref()) {
            return self.fail(e);
        }
        if let Err(e) = validate::lecturer_module(&form) {
            return self.fail(e.into());
        }
        let file_name = self.attach(file).await?;
        let module = LecturerModule {
            id: self.next_id(),
            title: form.title.trim().to_string(),
            code: form.code.trim().to_string(),
            description: form.description.trim().to_string(),
            file_name,
        };
        self.modules.push(module.clone());
        self.persist("Failed to add module.")?;
        self.notices
            .success(format!("Module \"{}\" added successfully!", module.title));
        Ok(module)
    }

    /// Replace a module's fields. Without a new file the old attachment
    /// name is kept.
    #[instrument(skip(self, form, file))]
    pub async fn update(
        &mut self,
        id: i64,
        form: LecturerModuleForm,
        file: Option<UploadFile>,
    ) -> Result<LecturerModule, DashboardError> {
        if let Err(e) = session::require(self.session.as_ref()) {
            return self.fail(e);
        }
        if let Err(e) = validate::lecturer_module(&form) {
            return self.fail(e.into());
        }
        let Some(index) = self.modules.iter().position(|m| m.id == id) else {
            return self.fail(DashboardError::precondition(format!(
                "Module {id} not found."
            )));
        };
        let file_name = match file {
            Some(file) => self.attach(Some(file)).await?,
            None => self.modules[index].file_name.clone(),
        };
        let updated = LecturerModule {
            id,
            title: form.title.trim().to_string(),
            code: form.code.trim().to_string(),
            description: form.description.trim().to_string(),
            file_name,
        };
        self.modules[index] = updated.clone();
        self.persist("Failed to update module.")?;
        self.notices
            .success(format!("Module \"{}\" updated successfully!", updated.title));
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub fn delete(&mut self, id: i64) -> Result<(), DashboardError> {
        if let Err(e) = session::require(self.session.as_ref()) {
            return self.fail(e);
        }
        let before = self.modules.len();
        self.modules.retain(|m| m.id != id);
        if self.modules.len() == before {
            return self.fail(DashboardError::precondition(format!(
                "Module {id} not found."
            )));
        }
        self.persist("Failed to delete module.")?;
        self.notices.success("Module deleted successfully!");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(id: i64) -> LecturerModule {
        LecturerModule {
            id,
            title: "Intro".into(),
            code: "CS101".into(),
            description: "Basics".into(),
            file_name: NO_FILE.into(),
        }
    }

    #[test]
    fn catalog_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = LecturerCatalog::in_dir(dir.path());
        assert!(catalog.load().unwrap().is_empty());
    }

    #[test]
    fn catalog_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = LecturerCatalog::in_dir(&dir.path().join("data"));
        catalog.save(&[module(1), module(2)]).unwrap();
        let loaded = catalog.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].id, 2);
    }

    #[test]
    fn catalog_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = LecturerCatalog::in_dir(dir.path());
        std::fs::write(catalog.path(), "not json").unwrap();
        let err = catalog.load().unwrap_err();
        assert!(err.to_string().contains("failed to parse catalogue"));
    }
}
