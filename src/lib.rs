// tabops - Tableau workbook export and site maintenance
// Copyright (c) 2025 Tabops Contributors
// Licensed under the MIT License

//! # tabops - Tableau workbook export and site maintenance
//!
//! tabops drives a Tableau Server / Tableau Cloud site over its REST API.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Exporting** the views of a workbook as a PDF or PowerPoint deck, with
//!   each view split into slide-sized tiles
//! - **Replicating** production group permissions to development groups
//! - **Deactivating** viewers who have not signed in for a long time
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (export pipeline, tiling, decks, maintenance jobs)
//! - [`adapters`] - External integrations (the Tableau REST API)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tabops::adapters::tableau::TableauServer;
//! use tabops::config::load_config;
//! use tabops::core::export::{ExportPipeline, ExportRequest};
//! use tabops::domain::ExportType;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("tabops.toml")?;
//!     let mut server = TableauServer::new(config.server.clone())?;
//!
//!     let request = ExportRequest {
//!         descriptor_path: "sales.json".into(),
//!         export_type: ExportType::Ppt,
//!         page_type: None,
//!         orientation: None,
//!     };
//!     let summary = ExportPipeline::new(config).run(&mut server, &request).await?;
//!
//!     println!("Wrote {} slides", summary.pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! tabops uses the [`domain::TabopsError`] type for all library errors:
//!
//! ```rust,no_run
//! use tabops::domain::TabopsError;
//!
//! fn example() -> Result<(), TabopsError> {
//!     let config = tabops::config::load_config("tabops.toml")?;
//!     println!("{}", config.server.base_url);
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! tabops uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(workbook = "Sales", "Starting export");
//! warn!(view = "Overview", "Requested view not found in workbook");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
