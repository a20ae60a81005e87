//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating the
//! tabops configuration file and, optionally, an export descriptor.

use super::{EXIT_CONFIGURATION, EXIT_SUCCESS};
use crate::config::{load_export_config, TabopsConfig};
use crate::core::deck::PdfOptions;
use crate::domain::Result;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Export descriptor to validate as well
    #[arg(long, value_name = "PATH")]
    pub descriptor: Option<String>,
}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// `loaded` is the outcome of loading `config_path`; loading already
    /// validates, so a failure here is reported rather than propagated.
    pub async fn execute(
        &self,
        config_path: &str,
        loaded: Result<TabopsConfig>,
    ) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match loaded {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIGURATION);
            }
        };

        let pdf = match PdfOptions::from_settings(&config.export, None, None) {
            Ok(p) => p,
            Err(e) => {
                println!("❌ Invalid PDF defaults");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIGURATION);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Server: {}", config.server.base_url);
        println!(
            "  Site: {}",
            if config.server.site.is_empty() {
                "(default)"
            } else {
                config.server.site.as_str()
            }
        );
        println!("  API Version: {}", config.server.api_version);
        println!("  Token Name: {}", config.server.token_name);
        println!("  Output Root: {}", config.export.output_root);
        println!("  PDF Page: {} {}", pdf.page_type, pdf.orientation);
        println!(
            "  Prod/Dev Prefixes: {} -> {}",
            config.permissions.prod_prefix, config.permissions.dev_prefix
        );
        println!(
            "  Inactive Threshold: {} days",
            config.users.inactive_threshold_days
        );
        println!();

        if let Some(path) = &self.descriptor {
            match load_export_config(path, &config.export.descriptor_dir) {
                Ok(descriptor) => {
                    println!("✅ Export descriptor is valid: {path}");
                    println!("  Workbook: {}", descriptor.workbook_name);
                    println!("  Project: {}", descriptor.project_name);
                    println!("  Views: {}", descriptor.slide_views.join(", "));
                    println!("  Filters: {}", descriptor.filters.len());
                    println!();
                }
                Err(e) => {
                    println!("❌ Export descriptor is invalid: {path}");
                    println!("   Error: {e}");
                    return Ok(EXIT_CONFIGURATION);
                }
            }
        }

        Ok(EXIT_SUCCESS)
    }
}
