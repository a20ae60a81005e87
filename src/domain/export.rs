//! Export descriptor and per-run export records
//!
//! An [`ExportConfig`] names the workbook to export, the project it lives in,
//! the views that become slides, and the filters applied to every view. It is
//! loaded once per run from a JSON descriptor (see
//! [`crate::config::load_export_config`]) and never mutated afterwards.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Workbook export descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Workbook name, matched exactly
    pub workbook_name: String,

    /// Project the workbook is published to, matched exactly
    pub project_name: String,

    /// Views to export; the order on the workbook wins over this order
    pub slide_views: Vec<String>,

    /// Filters applied identically to every exported view
    #[serde(default, deserialize_with = "null_as_empty")]
    pub filters: Vec<FilterSpec>,
}

impl ExportConfig {
    /// Whether `view_name` was requested
    pub fn wants_view(&self, view_name: &str) -> bool {
        self.slide_views.iter().any(|v| v == view_name)
    }

    /// Collapse duplicate view names, keeping the first occurrence
    pub(crate) fn dedup_views(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.slide_views.retain(|v| seen.insert(v.clone()));
    }

    /// Validates the descriptor
    pub fn validate(&self) -> Result<(), String> {
        if self.workbook_name.trim().is_empty() {
            return Err("workbook_name cannot be empty".to_string());
        }
        if self.project_name.trim().is_empty() {
            return Err("project_name cannot be empty".to_string());
        }
        if self.slide_views.is_empty() {
            return Err("slide_views must name at least one view".to_string());
        }
        for filter in &self.filters {
            if filter.description.trim().is_empty() {
                return Err("filter description cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<FilterSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<FilterSpec>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A view filter: field caption plus the values to keep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Field name as shown in the workbook
    pub description: String,

    /// Values to keep; sent comma-joined
    #[serde(default)]
    pub values: Vec<String>,
}

impl FilterSpec {
    pub fn new(description: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            description: description.into(),
            values,
        }
    }

    /// Values in the comma-joined form the server expects
    pub fn joined_values(&self) -> String {
        self.values.join(",")
    }
}

/// Filters in request form: field name to comma-joined values
///
/// Built once per run and applied unchanged to every view request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilters {
    fields: Vec<(String, String)>,
}

impl ViewFilters {
    pub fn from_specs(specs: &[FilterSpec]) -> Self {
        Self {
            fields: specs
                .iter()
                .map(|f| (f.description.clone(), f.joined_values()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `(field, values)` pairs in descriptor order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Query parameters in the `vf_<field>=<values>` form
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|(field, values)| (format!("vf_{field}"), values.clone()))
            .collect()
    }
}

/// Output document kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportType {
    /// Paginated PDF document
    Pdf,
    /// PowerPoint slide deck
    Ppt,
}

impl ExportType {
    /// File extension of the produced document
    pub fn extension(&self) -> &'static str {
        match self {
            ExportType::Pdf => "pdf",
            ExportType::Ppt => "pptx",
        }
    }

    /// Subdirectory of the output root the document lands in
    pub fn output_subdir(&self) -> &'static str {
        match self {
            ExportType::Pdf => "pdf",
            ExportType::Ppt => "ppt",
        }
    }
}

impl fmt::Display for ExportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.output_subdir())
    }
}

impl FromStr for ExportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(ExportType::Pdf),
            "ppt" | "pptx" => Ok(ExportType::Ppt),
            other => Err(format!("Unsupported export type '{other}'. Use 'pdf' or 'ppt'")),
        }
    }
}

/// Artifacts written for one exported view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewExport {
    /// View name as published
    pub view_name: String,

    /// Rendered PNG, inside the run's scratch directory
    pub image_file: PathBuf,

    /// CSV data extract, inside the run's scratch directory
    pub csv_file: PathBuf,
}

/// Ordered list of exported image file names
///
/// This list, not the contents of the scratch directory, decides which
/// images move on to tiling and in what order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageIndex {
    files: Vec<String>,
}

impl ImageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, file_name: impl Into<String>) {
        self.files.push(file_name.into());
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FromIterator<String> for ImageIndex {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}
