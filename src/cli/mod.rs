//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for tabops using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// tabops - Tableau workbook export and site maintenance
#[derive(Parser, Debug)]
#[command(name = "tabops")]
#[command(version, about, long_about = None)]
#[command(author = "Tabops Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "tabops.toml", env = "TABOPS_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "TABOPS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a workbook's views as a PDF or PowerPoint deck
    Export(commands::export::ExportArgs),

    /// Copy prod group permissions to the matching dev groups
    ReplicatePermissions(commands::replicate::ReplicateArgs),

    /// Downgrade viewers who have not signed in for a long time
    DeactivateUsers(commands::deactivate::DeactivateArgs),

    /// Validate configuration file (and optionally an export descriptor)
    ValidateConfig(commands::validate::ValidateArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExportType;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from(["tabops", "export", "sales.json", "pdf"]);
        assert_eq!(cli.config, "tabops.toml");
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.config_file, "sales.json");
                assert_eq!(args.export_type, ExportType::Pdf);
                assert!(args.page_type.is_none());
                assert!(args.orientation.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_export_pdf_options() {
        let cli = Cli::parse_from([
            "tabops",
            "export",
            "sales.json",
            "pdf",
            "--page_type",
            "Letter",
            "--orientation",
            "portrait",
        ]);
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.page_type.as_deref(), Some("Letter"));
        assert_eq!(args.orientation.as_deref(), Some("portrait"));
    }

    #[test]
    fn test_cli_rejects_unknown_export_type() {
        assert!(Cli::try_parse_from(["tabops", "export", "sales.json", "docx"]).is_err());
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["tabops", "--config", "custom.toml", "validate-config"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["tabops", "--log-level", "debug", "replicate-permissions"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_replicate_dry_run() {
        let cli = Cli::parse_from(["tabops", "replicate-permissions", "--dry-run"]);
        assert!(matches!(
            cli.command,
            Commands::ReplicatePermissions(ref args) if args.dry_run
        ));
    }

    #[test]
    fn test_cli_parse_deactivate_overrides() {
        let cli = Cli::parse_from([
            "tabops",
            "deactivate-users",
            "--threshold-days",
            "90",
            "--report",
            "out/users.csv",
        ]);
        let Commands::DeactivateUsers(args) = cli.command else {
            panic!("expected deactivate-users");
        };
        assert!(!args.dry_run);
        assert_eq!(args.threshold_days, Some(90));
        assert_eq!(args.report.as_deref(), Some("out/users.csv"));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["tabops", "validate-config", "--descriptor", "sales.json"]);
        let Commands::ValidateConfig(args) = cli.command else {
            panic!("expected validate-config");
        };
        assert_eq!(args.descriptor.as_deref(), Some("sales.json"));
    }
}
