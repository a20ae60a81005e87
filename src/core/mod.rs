//! Core business logic for tabops.
//!
//! # Modules
//!
//! - [`export`] - Workbook export pipeline (resolve, render, tile, assemble)
//! - [`tiles`] - Splitting view images into slide-sized tiles
//! - [`deck`] - PDF and PPTX assembly from a tile index
//! - [`permissions`] - Prod-to-dev group permission replication
//! - [`users`] - Inactive viewer deactivation across sites
//!
//! # Export Workflow
//!
//! 1. **Load**: Read the JSON export descriptor
//! 2. **Resolve**: Find the one workbook matching name and project
//! 3. **Export**: Render each requested view as PNG (plus a CSV extract)
//! 4. **Tile**: Split every image into a full-width top tile and two halves
//! 5. **Assemble**: Write a PDF or PPTX with a title page and one page per tile
//! 6. **Clean up**: Remove the run's scratch directory and sign out
//!
//! # Example
//!
//! ```rust,no_run
//! use tabops::adapters::tableau::TableauServer;
//! use tabops::config::load_config;
//! use tabops::core::export::{ExportPipeline, ExportRequest};
//! use tabops::domain::ExportType;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("tabops.toml")?;
//! let mut server = TableauServer::new(config.server.clone())?;
//!
//! let request = ExportRequest {
//!     descriptor_path: "sales.json".into(),
//!     export_type: ExportType::Pdf,
//!     page_type: None,
//!     orientation: None,
//! };
//! let summary = ExportPipeline::new(config).run(&mut server, &request).await?;
//! println!("{} pages written to {}", summary.pages, summary.output_path.display());
//! # Ok(())
//! # }
//! ```

pub mod deck;
pub mod export;
pub mod permissions;
pub mod tiles;
pub mod users;
