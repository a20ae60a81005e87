//! Export command implementation
//!
//! This module implements the `export` command, which turns the views named
//! in an export descriptor into a PDF or PowerPoint deck.

use super::{exit_code_for, EXIT_SUCCESS};
use crate::adapters::tableau::TableauServer;
use crate::config::TabopsConfig;
use crate::core::export::{ExportPipeline, ExportRequest};
use crate::domain::ExportType;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export descriptor (JSON); relative paths also resolve against
    /// `export.descriptor_dir`
    pub config_file: String,

    /// Output document type
    #[arg(value_enum)]
    pub export_type: ExportType,

    /// PDF page type (A3, A4, A5, B5, Executive, Folio, Ledger, Legal,
    /// Letter, Note, Quarto, Tabloid)
    #[arg(long = "page_type", value_name = "PAGE_TYPE")]
    pub page_type: Option<String>,

    /// PDF orientation (portrait or landscape)
    #[arg(long)]
    pub orientation: Option<String>,
}

impl ExportArgs {
    fn request(&self) -> ExportRequest {
        ExportRequest {
            descriptor_path: PathBuf::from(&self.config_file),
            export_type: self.export_type,
            page_type: self.page_type.clone(),
            orientation: self.orientation.clone(),
        }
    }

    /// Execute the export command
    pub async fn execute(&self, config: TabopsConfig) -> anyhow::Result<i32> {
        tracing::info!(
            descriptor = %self.config_file,
            export_type = %self.export_type,
            "Starting export command"
        );

        if self.export_type == ExportType::Ppt
            && (self.page_type.is_some() || self.orientation.is_some())
        {
            tracing::warn!("--page_type and --orientation only apply to PDF exports");
        }

        let mut server = match TableauServer::new(config.server.clone()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create server client");
                eprintln!("Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let pipeline = ExportPipeline::new(config);
        let summary = match pipeline.run(&mut server, &self.request()).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        summary.log_summary();

        println!();
        println!("📊 Export Summary:");
        println!("  Workbook: {} ({})", summary.workbook, summary.project);
        println!("  Views Exported: {}", summary.views_exported);
        println!("  Tiles: {}", summary.tiles);
        println!("  Pages: {}", summary.pages);
        println!("  Output: {}", summary.output_path.display());
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();
        println!("✅ Export completed successfully!");

        Ok(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_args() {
        let args = ExportArgs {
            config_file: "sales.json".to_string(),
            export_type: ExportType::Pdf,
            page_type: Some("Letter".to_string()),
            orientation: None,
        };

        let request = args.request();
        assert_eq!(request.descriptor_path, PathBuf::from("sales.json"));
        assert_eq!(request.export_type, ExportType::Pdf);
        assert_eq!(request.page_type.as_deref(), Some("Letter"));
        assert!(request.orientation.is_none());
    }
}
