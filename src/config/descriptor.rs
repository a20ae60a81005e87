//! Export descriptor loading
//!
//! A descriptor is a small JSON document naming the workbook, its project,
//! the views to export and the filters to apply:
//!
//! ```json
//! {
//!   "workbook_name": "Sales",
//!   "project_name": "Finance",
//!   "slide_views": ["Overview", "By Region"],
//!   "filters": [{ "description": "Region", "values": ["East", "West"] }]
//! }
//! ```

use crate::domain::errors::TabopsError;
use crate::domain::export::ExportConfig;
use crate::domain::result::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads and validates an export descriptor
///
/// `path` is used as given when it exists. Otherwise a relative path is
/// looked up under `descriptor_dir`.
///
/// # Errors
///
/// Returns [`TabopsError::Configuration`] when the file is missing or
/// unreadable, is not valid JSON, lacks a required key, or fails validation.
pub fn load_export_config(
    path: impl AsRef<Path>,
    descriptor_dir: impl AsRef<Path>,
) -> Result<ExportConfig> {
    let resolved = resolve_descriptor_path(path.as_ref(), descriptor_dir.as_ref())?;

    let contents = fs::read_to_string(&resolved).map_err(|e| {
        TabopsError::Configuration(format!(
            "Failed to read export descriptor {}: {}",
            resolved.display(),
            e
        ))
    })?;

    let mut config: ExportConfig = serde_json::from_str(&contents).map_err(|e| {
        TabopsError::Configuration(format!(
            "Invalid export descriptor {}: {}",
            resolved.display(),
            e
        ))
    })?;

    config.dedup_views();
    config.validate().map_err(|e| {
        TabopsError::Configuration(format!(
            "Invalid export descriptor {}: {}",
            resolved.display(),
            e
        ))
    })?;

    tracing::debug!(
        path = %resolved.display(),
        workbook = %config.workbook_name,
        project = %config.project_name,
        views = config.slide_views.len(),
        filters = config.filters.len(),
        "Loaded export descriptor"
    );

    Ok(config)
}

fn resolve_descriptor_path(path: &Path, descriptor_dir: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }

    if path.is_relative() {
        let candidate = descriptor_dir.join(path);
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(TabopsError::Configuration(format!(
        "Export descriptor not found: {}",
        path.display()
    )))
}
