//! Inactive viewer deactivation
//!
//! Walks every site on the server, selects viewers who have not signed in
//! for longer than the configured threshold, records them in a CSV report
//! and downgrades their site role. The "All Users" group's minimum site role
//! is lifted while this happens, otherwise the server would grant the
//! license straight back, and restored afterwards.

use crate::adapters::tableau::{collect_pages, BiServer};
use crate::config::UsersConfig;
use crate::domain::context::ResultExt;
use crate::domain::items::{GroupItem, SiteItem, UserItem};
use crate::domain::result::Result;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::path::{Path, PathBuf};

const REPORT_HEADERS: [&str; 7] = [
    "ID",
    "Name",
    "Role",
    "Last Login",
    "Email",
    "Full Name",
    "Site",
];

/// Users with `target_role` whose last login is more than `threshold_days`
/// whole days before `now`
///
/// Users who never signed in have no last login and are never selected.
pub fn select_inactive_viewers<'u>(
    users: &'u [UserItem],
    target_role: &str,
    threshold_days: i64,
    now: DateTime<Utc>,
) -> Vec<&'u UserItem> {
    users
        .iter()
        .filter(|u| u.site_role == target_role)
        .filter(|u| match u.last_login {
            Some(last) => (now - last).num_days() > threshold_days,
            None => false,
        })
        .collect()
}

/// CSV report shared by every site of a run
pub struct UserReport {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: usize,
}

impl UserReport {
    /// Creates (or truncates) the report and writes the header row
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(REPORT_HEADERS)?;
        writer.flush()?;
        Ok(Self {
            path,
            writer,
            rows: 0,
        })
    }

    /// Appends one row per user, tagged with the site name
    pub fn append(&mut self, site: &str, users: &[&UserItem]) -> Result<()> {
        for user in users {
            let last_login = user
                .last_login
                .map(|t| t.to_rfc3339())
                .unwrap_or_default();
            self.writer.write_record([
                user.id.as_str(),
                user.name.as_str(),
                user.site_role.as_str(),
                last_login.as_str(),
                user.email.as_deref().unwrap_or(""),
                user.full_name.as_deref().unwrap_or(""),
                site,
            ])?;
            self.rows += 1;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
}

/// What happened on one site
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeactivationSummary {
    pub site: String,
    pub users_scanned: usize,
    pub inactive_selected: usize,
    pub deactivated: usize,
    /// Set when the site could not be fully processed
    pub error: Option<String>,
}

impl DeactivationSummary {
    fn new(site: &SiteItem) -> Self {
        Self {
            site: site.name.clone(),
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Inactive viewer cleanup across all sites
pub struct UserCleanup {
    config: UsersConfig,
    page_size: u32,
}

impl UserCleanup {
    pub fn new(config: UsersConfig, page_size: u32) -> Self {
        Self { config, page_size }
    }

    /// Runs the cleanup on every site
    ///
    /// `home_site` is the site used to list the others. A failing site is
    /// logged and recorded in its summary; the remaining sites still run.
    ///
    /// # Errors
    ///
    /// Fails when the sites cannot be listed or the report cannot be
    /// created.
    pub async fn run<S>(
        &self,
        server: &mut S,
        home_site: &str,
        dry_run: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<DeactivationSummary>>
    where
        S: BiServer + ?Sized,
    {
        server.sign_in(home_site).await?;
        let page_size = self.page_size;
        let listed = {
            let signed_in = &*server;
            collect_pages(page_size, move |p| signed_in.sites_page(p)).await
        };
        if let Err(e) = server.sign_out().await {
            tracing::warn!(error = %e, "Failed to sign out");
        }
        let sites = listed?;
        tracing::info!(sites = sites.len(), dry_run, "Starting inactive user cleanup");

        let mut report = UserReport::create(&self.config.report_path)?;
        let mut summaries = Vec::with_capacity(sites.len());

        for site in &sites {
            let mut summary = DeactivationSummary::new(site);
            if let Err(e) = self
                .process_site(server, site, &mut report, dry_run, now, &mut summary)
                .await
            {
                tracing::error!(site = %site.name, error = %e, "Site cleanup failed");
                summary.error = Some(e.to_string());
            }
            summaries.push(summary);
        }

        tracing::info!(
            report = %report.path().display(),
            rows = report.rows(),
            "User report written"
        );
        Ok(summaries)
    }

    async fn process_site<S>(
        &self,
        server: &mut S,
        site: &SiteItem,
        report: &mut UserReport,
        dry_run: bool,
        now: DateTime<Utc>,
        summary: &mut DeactivationSummary,
    ) -> Result<()>
    where
        S: BiServer + ?Sized,
    {
        server.sign_in(&site.content_url).await?;
        let result = self
            .process_signed_in(&*server, site, report, dry_run, now, summary)
            .await;
        if let Err(e) = server.sign_out().await {
            tracing::warn!(site = %site.name, error = %e, "Failed to sign out");
        }
        result
    }

    async fn process_signed_in<S>(
        &self,
        server: &S,
        site: &SiteItem,
        report: &mut UserReport,
        dry_run: bool,
        now: DateTime<Utc>,
        summary: &mut DeactivationSummary,
    ) -> Result<()>
    where
        S: BiServer + ?Sized,
    {
        let groups = collect_pages(self.page_size, move |p| server.groups_page(p)).await?;
        let role_group = groups
            .into_iter()
            .find(|g| g.name == self.config.minimum_role_group);

        match &role_group {
            Some(group) => self.set_group_role(server, group, None, dry_run).await?,
            None => tracing::warn!(
                site = %site.name,
                group = %self.config.minimum_role_group,
                "Minimum role group not found; leaving group roles unchanged"
            ),
        }

        let outcome = self
            .deactivate_inactive(server, site, report, dry_run, now, summary)
            .await;

        if let Some(group) = &role_group {
            let restore = self
                .set_group_role(
                    server,
                    group,
                    Some(self.config.restored_minimum_site_role.as_str()),
                    dry_run,
                )
                .await;
            if let Err(e) = restore {
                tracing::error!(
                    site = %site.name,
                    group = %group.name,
                    error = %e,
                    "Failed to restore minimum site role"
                );
                outcome?;
                return Err(e);
            }
        }

        outcome
    }

    async fn deactivate_inactive<S>(
        &self,
        server: &S,
        site: &SiteItem,
        report: &mut UserReport,
        dry_run: bool,
        now: DateTime<Utc>,
        summary: &mut DeactivationSummary,
    ) -> Result<()>
    where
        S: BiServer + ?Sized,
    {
        let users = collect_pages(self.page_size, move |p| server.users_page(p)).await?;
        summary.users_scanned = users.len();

        let inactive = select_inactive_viewers(
            &users,
            &self.config.target_site_role,
            self.config.inactive_threshold_days,
            now,
        );
        summary.inactive_selected = inactive.len();
        tracing::info!(
            site = %site.name,
            users = users.len(),
            inactive = inactive.len(),
            threshold_days = self.config.inactive_threshold_days,
            "Selected inactive users"
        );

        report.append(&site.name, &inactive)?;

        if dry_run {
            for user in &inactive {
                tracing::info!(site = %site.name, user = %user.name, "Would deactivate user");
            }
            return Ok(());
        }

        for user in inactive {
            server
                .update_user_site_role(&user.id, &self.config.deactivated_site_role)
                .await?;
            summary.deactivated += 1;
            tracing::info!(
                site = %site.name,
                user = %user.name,
                role = %self.config.deactivated_site_role,
                "Deactivated user"
            );
        }
        Ok(())
    }

    async fn set_group_role<S>(
        &self,
        server: &S,
        group: &GroupItem,
        role: Option<&str>,
        dry_run: bool,
    ) -> Result<()>
    where
        S: BiServer + ?Sized,
    {
        if dry_run {
            tracing::info!(group = %group.name, role = ?role, "Would set minimum site role");
            return Ok(());
        }
        server.update_group_minimum_site_role(group, role).await?;
        tracing::debug!(group = %group.name, role = ?role, "Set minimum site role");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::UserId;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn user(id: &str, role: &str, days_ago: Option<i64>) -> UserItem {
        UserItem {
            id: UserId::new(id).unwrap(),
            name: format!("user{id}"),
            site_role: role.to_string(),
            last_login: days_ago.map(|d| now() - Duration::days(d)),
            email: Some(format!("user{id}@example.com")),
            full_name: None,
        }
    }

    #[test]
    fn test_selects_only_stale_viewers() {
        let users = vec![
            user("1", "Viewer", Some(501)),
            user("2", "Viewer", Some(500)),
            user("3", "Viewer", None),
            user("4", "Explorer", Some(900)),
            user("5", "Viewer", Some(10)),
        ];
        let selected = select_inactive_viewers(&users, "Viewer", 500, now());
        let ids: Vec<&str> = selected.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn test_partial_days_do_not_count() {
        let mut u = user("1", "Viewer", None);
        u.last_login = Some(now() - Duration::days(3) - Duration::hours(23));
        assert!(select_inactive_viewers(&[u.clone()], "Viewer", 3, now()).is_empty());
        u.last_login = Some(now() - Duration::days(4));
        assert_eq!(select_inactive_viewers(&[u], "Viewer", 3, now()).len(), 1);
    }

    #[test]
    fn test_report_appends_rows_across_sites() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("reports").join("users.csv");
        let a = user("1", "Viewer", Some(600));
        let b = user("2", "Viewer", None);

        let mut report = UserReport::create(&path).unwrap();
        report.append("Default", &[&a]).unwrap();
        report.append("Marketing", &[&b]).unwrap();
        assert_eq!(report.rows(), 2);
        drop(report);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, REPORT_HEADERS);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "1");
        assert_eq!(&rows[0][6], "Default");
        assert!(!rows[0][3].is_empty());
        assert_eq!(&rows[1][3], "");
        assert_eq!(&rows[1][6], "Marketing");
    }
}
