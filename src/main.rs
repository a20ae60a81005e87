// tabops - Tableau workbook export and site maintenance
// Copyright (c) 2025 Tabops Contributors
// Licensed under the MIT License

use clap::Parser;
use std::process;
use tabops::cli::commands::{exit_code_for, EXIT_FATAL};
use tabops::cli::{Cli, Commands};
use tabops::config::{load_config, LoggingConfig, TabopsConfig};
use tabops::domain::Result;
use tabops::logging::init_logging;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let loaded = load_config(&cli.config);

    // File logging only once the configuration is known to be good
    let (log_level, logging_config) = match &loaded {
        Ok(config) => (
            cli.log_level
                .clone()
                .unwrap_or_else(|| config.application.log_level.clone()),
            config.logging.clone(),
        ),
        Err(_) => (
            cli.log_level.clone().unwrap_or_else(|| "info".to_string()),
            LoggingConfig {
                local_enabled: false,
                ..LoggingConfig::default()
            },
        ),
    };
    let _guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(exit_code_for(&e));
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "tabops - Tableau workbook export and site maintenance"
    );

    let exit_code = match execute_command(&cli, loaded).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FATAL
        }
    };

    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, loaded: Result<TabopsConfig>) -> anyhow::Result<i32> {
    if let Commands::ValidateConfig(args) = &cli.command {
        return args.execute(&cli.config, loaded).await;
    }

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, config = %cli.config, "Failed to load configuration");
            eprintln!("Error: {e}");
            return Ok(exit_code_for(&e));
        }
    };

    match &cli.command {
        Commands::Export(args) => args.execute(config).await,
        Commands::ReplicatePermissions(args) => args.execute(config).await,
        Commands::DeactivateUsers(args) => args.execute(config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config, Ok(config)).await,
    }
}
