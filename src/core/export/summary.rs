//! Export summary and reporting

use crate::domain::export::ExportType;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Summary of a completed export run
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Run identifier (also the scratch directory name)
    pub export_id: Uuid,

    pub workbook: String,

    pub project: String,

    pub export_type: ExportType,

    /// Views that were rendered
    pub views_exported: usize,

    /// Tiles produced from those views
    pub tiles: usize,

    /// Pages or slides written, title included
    pub pages: usize,

    /// Written document
    pub output_path: PathBuf,

    pub duration: Duration,
}

impl ExportSummary {
    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            export_id = %self.export_id,
            workbook = %self.workbook,
            project = %self.project,
            export_type = %self.export_type,
            views = self.views_exported,
            tiles = self.tiles,
            pages = self.pages,
            output = %self.output_path.display(),
            duration_ms = self.duration.as_millis() as u64,
            "Export completed"
        );
    }
}
