//! Workflow template loading.
//!
//! Templates are JSON files in a single directory. The canonical template
//! is preferred; when it is absent the lexicographically first `*.json`
//! file is used instead and the substitution is reported back as a warning.

use std::path::{Path, PathBuf};

use relay_core::error::CoreError;
use relay_core::workflow::WorkflowDocument;

/// A template ready to be patched for one job.
#[derive(Debug)]
pub struct LoadedTemplate {
    pub path: PathBuf,
    pub document: WorkflowDocument,
    /// Set when the canonical template was missing and a fallback was used.
    pub warning: Option<String>,
}

pub struct TemplateStore {
    dir: PathBuf,
    canonical: String,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>, canonical: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            canonical: canonical.into(),
        }
    }

    /// Pick the template to use and parse it.
    pub async fn load(&self) -> Result<LoadedTemplate, CoreError> {
        let canonical = self.dir.join(&self.canonical);
        let (path, warning) = if tokio::fs::try_exists(&canonical).await? {
            (canonical, None)
        } else {
            let fallback = self.first_available().await?.ok_or_else(|| {
                CoreError::NotFound(format!(
                    "No workflow files found in {}",
                    self.dir.display()
                ))
            })?;
            let warning = format!("Using fallback workflow: {}", fallback.display());
            tracing::warn!(
                canonical = %canonical.display(),
                fallback = %fallback.display(),
                "Canonical workflow missing, using fallback",
            );
            (fallback, Some(warning))
        };

        let raw = tokio::fs::read(&path).await?;
        let value: serde_json::Value = serde_json::from_slice(&raw).map_err(|e| {
            CoreError::Internal(format!("Invalid workflow template {}: {e}", path.display()))
        })?;
        let document = WorkflowDocument::from_value(value)?;

        Ok(LoadedTemplate {
            path,
            document,
            warning,
        })
    }

    /// First `*.json` file in the directory by name, if any.
    async fn first_available(&self) -> Result<Option<PathBuf>, CoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut candidates = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if is_json(&path) && entry.file_type().await?.is_file() {
                candidates.push(path);
            }
        }
        candidates.sort();
        Ok(candidates.into_iter().next())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}
