//! Export pipeline - orchestrates one workbook export end to end
//!
//! Stages run strictly in order and hand their results forward:
//!
//! 1. load the export descriptor
//! 2. sign in
//! 3. resolve the workbook
//! 4. create the run's scratch directory
//! 5. export the requested views ([`ImageIndex`](crate::domain::ImageIndex))
//! 6. split them into tiles ([`TileIndex`](crate::core::tiles::TileIndex))
//! 7. assemble the PDF or PPTX
//!
//! The scratch directory is removed and the session is closed on every exit
//! path once they exist. Failures while doing so are logged and never
//! replace the error that ended the run.

use super::context::RunContext;
use super::exporter::{sanitize_file_name, ViewExporter};
use super::resolver::resolve_workbook;
use super::summary::ExportSummary;
use crate::adapters::tableau::BiServer;
use crate::config::{load_export_config, TabopsConfig};
use crate::core::deck::{DeckMetadata, DeckWriter, PdfDeck, PdfOptions, PptxDeck};
use crate::core::tiles::{split_index, TileGrid};
use crate::domain::export::{ExportConfig, ExportType};
use crate::domain::items::WorkbookItem;
use crate::domain::result::Result;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// What to export and how
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// JSON export descriptor
    pub descriptor_path: PathBuf,
    pub export_type: ExportType,
    /// PDF page type override
    pub page_type: Option<String>,
    /// PDF orientation override
    pub orientation: Option<String>,
}

/// Export pipeline
pub struct ExportPipeline {
    config: TabopsConfig,
}

/// Counts produced by the stages that run inside the scratch directory
struct StageOutput {
    views: usize,
    tiles: usize,
    pages: usize,
}

impl ExportPipeline {
    pub fn new(config: TabopsConfig) -> Self {
        Self { config }
    }

    /// Where the document for `workbook_name` is written
    pub fn output_path(&self, workbook_name: &str, export_type: ExportType) -> PathBuf {
        Path::new(&self.config.export.output_root)
            .join(export_type.output_subdir())
            .join(format!(
                "{}.{}",
                sanitize_file_name(workbook_name),
                export_type.extension()
            ))
    }

    fn deck_writer(&self, request: &ExportRequest) -> Result<Box<dyn DeckWriter>> {
        Ok(match request.export_type {
            ExportType::Pdf => Box::new(PdfDeck::new(PdfOptions::from_settings(
                &self.config.export,
                request.page_type.as_deref(),
                request.orientation.as_deref(),
            )?)),
            ExportType::Ppt => Box::new(PptxDeck::new()),
        })
    }

    /// Runs the export
    ///
    /// The descriptor and PDF options are checked before the server is
    /// contacted, so configuration mistakes fail without opening a session.
    pub async fn run<S>(&self, server: &mut S, request: &ExportRequest) -> Result<ExportSummary>
    where
        S: BiServer + ?Sized,
    {
        let started = Instant::now();
        let descriptor =
            load_export_config(&request.descriptor_path, &self.config.export.descriptor_dir)?;
        let writer = self.deck_writer(request)?;

        tracing::info!(
            workbook = %descriptor.workbook_name,
            project = %descriptor.project_name,
            views = descriptor.slide_views.len(),
            export_type = %request.export_type,
            "Starting export"
        );

        server.sign_in(&self.config.server.site).await?;

        let result = self
            .run_signed_in(&*server, &descriptor, request, writer.as_ref(), started)
            .await;

        if let Err(e) = server.sign_out().await {
            tracing::warn!(error = %e, "Failed to sign out");
        }

        result
    }

    async fn run_signed_in<S>(
        &self,
        server: &S,
        descriptor: &ExportConfig,
        request: &ExportRequest,
        writer: &dyn DeckWriter,
        started: Instant,
    ) -> Result<ExportSummary>
    where
        S: BiServer + ?Sized,
    {
        let workbook = resolve_workbook(
            server,
            self.config.server.page_size,
            &descriptor.workbook_name,
            &descriptor.project_name,
        )
        .await?;

        let context = RunContext::create(&self.config.export.scratch_root)?;
        let output_path = self.output_path(&workbook.name, request.export_type);

        let result = self
            .run_in_context(server, &context, &workbook, descriptor, writer, &output_path)
            .await;
        context.cleanup();
        let stages = result?;

        Ok(ExportSummary {
            export_id: context.export_id(),
            workbook: workbook.name,
            project: workbook.project_name,
            export_type: request.export_type,
            views_exported: stages.views,
            tiles: stages.tiles,
            pages: stages.pages,
            output_path,
            duration: started.elapsed(),
        })
    }

    async fn run_in_context<S>(
        &self,
        server: &S,
        context: &RunContext,
        workbook: &WorkbookItem,
        descriptor: &ExportConfig,
        writer: &dyn DeckWriter,
        output_path: &Path,
    ) -> Result<StageOutput>
    where
        S: BiServer + ?Sized,
    {
        let exported = ViewExporter::new(server, self.config.export.image_max_age_minutes)
            .export(workbook, descriptor, context.scratch_dir())
            .await?;
        if exported.index.is_empty() {
            tracing::warn!(
                workbook = %workbook.name,
                "None of the requested views exist; the document will only have a title"
            );
        }

        let tiles = split_index(context.scratch_dir(), &exported.index, TileGrid::SLIDE)?;

        let meta = DeckMetadata::now(&workbook.name, &workbook.project_name);
        let pages = writer.write(&tiles, &meta, output_path)?;

        Ok(StageOutput {
            views: exported.views.len(),
            tiles: tiles.len(),
            pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    fn config(output_root: &str) -> TabopsConfig {
        TabopsConfig {
            application: Default::default(),
            server: ServerConfig::default(),
            export: crate::config::ExportSettings {
                output_root: output_root.to_string(),
                ..Default::default()
            },
            permissions: Default::default(),
            users: Default::default(),
            logging: Default::default(),
        }
    }

    #[test]
    fn test_output_paths() {
        let pipeline = ExportPipeline::new(config("out"));
        assert_eq!(
            pipeline.output_path("Sales", ExportType::Pdf),
            Path::new("out/pdf/Sales.pdf")
        );
        assert_eq!(
            pipeline.output_path("Q1/Q2 Review", ExportType::Ppt),
            Path::new("out/ppt/Q1_Q2 Review.pptx")
        );
    }

    #[test]
    fn test_bad_page_type_is_configuration_error() {
        let pipeline = ExportPipeline::new(config("out"));
        let request = ExportRequest {
            descriptor_path: PathBuf::from("unused.json"),
            export_type: ExportType::Pdf,
            page_type: Some("A0".to_string()),
            orientation: None,
        };
        let err = pipeline.deck_writer(&request).err().unwrap();
        assert!(err.is_configuration());
    }
}
