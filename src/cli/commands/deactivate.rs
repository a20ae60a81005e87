//! Deactivate-users command implementation

use super::{exit_code_for, EXIT_PARTIAL_FAILURE, EXIT_SUCCESS};
use crate::adapters::tableau::TableauServer;
use crate::config::{TabopsConfig, UsersConfig};
use crate::core::users::UserCleanup;
use chrono::Utc;
use clap::Args;

/// Arguments for the deactivate-users command
#[derive(Args, Debug)]
pub struct DeactivateArgs {
    /// Write the report but leave every site role unchanged
    #[arg(long)]
    pub dry_run: bool,

    /// Override users.inactive_threshold_days
    #[arg(long, value_name = "DAYS")]
    pub threshold_days: Option<i64>,

    /// Override users.report_path
    #[arg(long, value_name = "PATH")]
    pub report: Option<String>,
}

impl DeactivateArgs {
    /// Users settings with the command-line overrides applied
    fn users_config(&self, base: &UsersConfig) -> UsersConfig {
        let mut users = base.clone();
        if let Some(days) = self.threshold_days {
            tracing::info!(days, "Overriding inactivity threshold from CLI");
            users.inactive_threshold_days = days;
        }
        if let Some(report) = &self.report {
            users.report_path = report.clone();
        }
        users
    }

    /// Execute the deactivate-users command
    pub async fn execute(&self, config: TabopsConfig) -> anyhow::Result<i32> {
        let users = self.users_config(&config.users);
        if users.inactive_threshold_days < 0 {
            eprintln!("Error: --threshold-days must be >= 0");
            return Ok(super::EXIT_CONFIGURATION);
        }

        tracing::info!(
            dry_run = self.dry_run,
            threshold_days = users.inactive_threshold_days,
            report = %users.report_path,
            "Starting inactive user cleanup"
        );
        if self.dry_run {
            println!("🔍 DRY RUN MODE - No site roles will be changed");
            println!();
        }

        let mut server = match TableauServer::new(config.server.clone()) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let report_path = users.report_path.clone();
        let cleanup = UserCleanup::new(users, config.server.page_size);
        let summaries = match cleanup
            .run(&mut server, &config.server.site, self.dry_run, Utc::now())
            .await
        {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "User cleanup failed");
                eprintln!("Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("📊 User Cleanup Summary:");
        for summary in &summaries {
            match &summary.error {
                None => println!(
                    "  {}: {} users, {} inactive, {} deactivated",
                    summary.site,
                    summary.users_scanned,
                    summary.inactive_selected,
                    summary.deactivated
                ),
                Some(error) => println!("  {}: ❌ {}", summary.site, error),
            }
        }
        println!("  Report: {report_path}");
        println!();

        let failed = summaries.iter().filter(|s| !s.is_success()).count();
        if failed > 0 {
            println!("⚠️  {failed} site(s) failed");
            Ok(EXIT_PARTIAL_FAILURE)
        } else {
            println!("✅ User cleanup completed successfully!");
            Ok(EXIT_SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let args = DeactivateArgs {
            dry_run: true,
            threshold_days: Some(30),
            report: Some("out.csv".to_string()),
        };
        let users = args.users_config(&UsersConfig::default());
        assert_eq!(users.inactive_threshold_days, 30);
        assert_eq!(users.report_path, "out.csv");
        assert_eq!(users.target_site_role, "Viewer");
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let args = DeactivateArgs {
            dry_run: false,
            threshold_days: None,
            report: None,
        };
        let users = args.users_config(&UsersConfig::default());
        assert_eq!(users.inactive_threshold_days, 500);
        assert_eq!(users.report_path, "users_info.csv");
    }
}
