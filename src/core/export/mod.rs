//! Workbook export: from descriptor to PDF or PPTX
//!
//! This module provides the export stages and the pipeline that runs them:
//! - Workbook resolution ([`resolver`])
//! - View image and data export ([`exporter`])
//! - Per-run scratch space ([`context`])
//! - Orchestration ([`pipeline`]) and reporting ([`summary`])

pub mod context;
pub mod exporter;
pub mod pipeline;
pub mod resolver;
pub mod summary;

pub use context::RunContext;
pub use exporter::{sanitize_file_name, ExportedViews, ViewExporter};
pub use pipeline::{ExportPipeline, ExportRequest};
pub use resolver::{resolve_workbook, select_workbook};
pub use summary::ExportSummary;
