//! Replicate-permissions command implementation

use super::{exit_code_for, EXIT_SUCCESS};
use crate::adapters::tableau::TableauServer;
use crate::config::TabopsConfig;
use crate::core::permissions::PermissionReplicator;
use clap::Args;

/// Arguments for the replicate-permissions command
#[derive(Args, Debug)]
pub struct ReplicateArgs {
    /// Log what would be replicated without changing any permission
    #[arg(long)]
    pub dry_run: bool,
}

impl ReplicateArgs {
    /// Execute the replicate-permissions command
    pub async fn execute(&self, config: TabopsConfig) -> anyhow::Result<i32> {
        tracing::info!(dry_run = self.dry_run, "Starting permission replication");

        if self.dry_run {
            println!("🔍 DRY RUN MODE - No permissions will be changed");
            println!();
        }

        let mut server = match TableauServer::new(config.server.clone()) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let replicator =
            PermissionReplicator::new(config.permissions.clone(), config.server.page_size);
        let summary = match replicator
            .run(&mut server, &config.server.site, self.dry_run)
            .await
        {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Permission replication failed");
                eprintln!("Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        summary.log_summary(self.dry_run);

        println!("📊 Replication Summary:");
        println!("  Projects Scanned: {}", summary.projects_scanned);
        println!(
            "  Projects With Prod Rules: {}",
            summary.projects_with_prod_rules
        );
        println!("  Rules Replicated: {}", summary.rules_replicated);
        if !summary.missing_dev_groups.is_empty() {
            println!("  ⚠️  Missing Dev Groups:");
            for name in &summary.missing_dev_groups {
                println!("    - {name}");
            }
        }
        println!();

        Ok(EXIT_SUCCESS)
    }
}
