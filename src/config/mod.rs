//! Configuration management for tabops.
//!
//! Two kinds of configuration exist:
//!
//! - the **connection configuration** (`tabops.toml`): server, export,
//!   permission, user-cleanup and logging settings, loaded by
//!   [`load_config`];
//! - the **export descriptor** (JSON): which workbook, views and filters a
//!   single export run covers, loaded by [`load_export_config`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tabops::config::{load_config, load_export_config};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("tabops.toml")?;
//! let descriptor = load_export_config("sales.json", &config.export.descriptor_dir)?;
//!
//! println!("Server: {}", config.server.base_url);
//! println!("Workbook: {}", descriptor.workbook_name);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [server]
//! base_url = "https://prod-useast-b.online.tableau.com"
//! site = "analytics"
//! token_name = "automation"
//! token_secret = "${TABLEAU_TOKEN_SECRET}"
//!
//! [export]
//! output_root = "out"
//! default_page_type = "A4"
//! default_orientation = "landscape"
//!
//! [users]
//! inactive_threshold_days = 500
//! ```
//!
//! # Environment Variables
//!
//! `${VAR_NAME}` placeholders are substituted before parsing, and
//! `TABOPS_<SECTION>_<KEY>` variables override parsed values:
//!
//! ```bash
//! export TABLEAU_TOKEN_SECRET="..."
//! export TABOPS_EXPORT_OUTPUT_ROOT="/srv/decks"
//! ```

pub mod descriptor;
pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use descriptor::load_export_config;
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, ExportSettings, LoggingConfig, PermissionsConfig, ServerConfig,
    TabopsConfig, UsersConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
