//! Prod-to-dev permission replication
//!
//! Every project rule granted to a production group (`prod...`) is copied to
//! the matching development group (`dev...`), together with the prod group's
//! default workbook and default data source capabilities in that project.
//! Dev groups are never created; a missing one is reported and skipped.

use crate::adapters::tableau::{collect_pages, BiServer};
use crate::config::PermissionsConfig;
use crate::domain::ids::GroupId;
use crate::domain::items::{Grantee, GroupItem, PermissionRule, PermissionScope, ProjectItem};
use crate::domain::result::Result;

/// Outcome of a replication run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplicationSummary {
    pub projects_scanned: usize,
    /// Projects holding at least one project rule for a prod group
    pub projects_with_prod_rules: usize,
    /// Rules added (or, in a dry run, that would have been added)
    pub rules_replicated: usize,
    /// Dev group names that were looked up and not found, one per rule
    pub missing_dev_groups: Vec<String>,
}

impl ReplicationSummary {
    pub fn log_summary(&self, dry_run: bool) {
        tracing::info!(
            projects = self.projects_scanned,
            projects_with_prod_rules = self.projects_with_prod_rules,
            rules = self.rules_replicated,
            missing_dev_groups = self.missing_dev_groups.len(),
            dry_run,
            "Permission replication completed"
        );
    }
}

/// Whether `group_name` is a production group
pub fn is_prod_group(group_name: &str, prod_prefix: &str) -> bool {
    group_name
        .to_lowercase()
        .starts_with(&prod_prefix.to_lowercase())
}

/// Name of the dev counterpart of a prod group
///
/// The name is lowercased and every occurrence of the prod prefix is
/// replaced, so `Prod_Sales` becomes `dev_sales`.
pub fn dev_group_name(prod_name: &str, prod_prefix: &str, dev_prefix: &str) -> String {
    prod_name
        .to_lowercase()
        .replace(&prod_prefix.to_lowercase(), dev_prefix)
}

fn find_group_by_name<'g>(groups: &'g [GroupItem], name: &str) -> Option<&'g GroupItem> {
    groups.iter().find(|g| g.name.to_lowercase() == name)
}

fn find_group_by_id<'g>(groups: &'g [GroupItem], id: &GroupId) -> Option<&'g GroupItem> {
    groups.iter().find(|g| &g.id == id)
}

/// Default-permission scopes copied along with each project rule
const DEFAULT_SCOPES: [PermissionScope; 2] = [
    PermissionScope::DefaultWorkbooks,
    PermissionScope::DefaultDatasources,
];

/// Copies prod group permissions to dev groups across all projects
pub struct PermissionReplicator {
    config: PermissionsConfig,
    page_size: u32,
}

impl PermissionReplicator {
    pub fn new(config: PermissionsConfig, page_size: u32) -> Self {
        Self { config, page_size }
    }

    /// Signs in to `site`, replicates, and always signs out
    pub async fn run<S>(
        &self,
        server: &mut S,
        site: &str,
        dry_run: bool,
    ) -> Result<ReplicationSummary>
    where
        S: BiServer + ?Sized,
    {
        server.sign_in(site).await?;
        let result = self.replicate(&*server, dry_run).await;
        if let Err(e) = server.sign_out().await {
            tracing::warn!(error = %e, "Failed to sign out");
        }
        result
    }

    /// Replicates over an already signed-in session
    ///
    /// # Errors
    ///
    /// Listing or applying a rule fails the whole run.
    pub async fn replicate<S>(&self, server: &S, dry_run: bool) -> Result<ReplicationSummary>
    where
        S: BiServer + ?Sized,
    {
        let projects = collect_pages(self.page_size, move |p| server.projects_page(p)).await?;
        let groups = collect_pages(self.page_size, move |p| server.groups_page(p)).await?;
        tracing::info!(
            projects = projects.len(),
            groups = groups.len(),
            dry_run,
            "Replicating prod permissions to dev groups"
        );

        let mut summary = ReplicationSummary::default();
        for project in &projects {
            summary.projects_scanned += 1;
            let had_prod_rules = self
                .replicate_project(server, project, &groups, dry_run, &mut summary)
                .await?;
            if had_prod_rules {
                summary.projects_with_prod_rules += 1;
            }
        }

        Ok(summary)
    }

    async fn replicate_project<S>(
        &self,
        server: &S,
        project: &ProjectItem,
        groups: &[GroupItem],
        dry_run: bool,
        summary: &mut ReplicationSummary,
    ) -> Result<bool>
    where
        S: BiServer + ?Sized,
    {
        let rules = server
            .project_permissions(&project.id, PermissionScope::Project)
            .await?;

        let prod_rules: Vec<(&PermissionRule, &GroupItem)> = rules
            .iter()
            .filter_map(|rule| {
                let group = find_group_by_id(groups, rule.grantee.group_id()?)?;
                is_prod_group(&group.name, &self.config.prod_prefix).then_some((rule, group))
            })
            .collect();

        if prod_rules.is_empty() {
            tracing::debug!(project = %project.name, "No prod group rules");
            return Ok(false);
        }

        // Fetched once per project, only when there is something to copy
        let mut defaults = Vec::with_capacity(DEFAULT_SCOPES.len());
        for scope in DEFAULT_SCOPES {
            defaults.push((scope, server.project_permissions(&project.id, scope).await?));
        }

        for (rule, prod_group) in prod_rules {
            let dev_name = dev_group_name(
                &prod_group.name,
                &self.config.prod_prefix,
                &self.config.dev_prefix,
            );
            let Some(dev_group) = find_group_by_name(groups, &dev_name) else {
                tracing::error!(
                    project = %project.name,
                    prod_group = %prod_group.name,
                    dev_group = %dev_name,
                    "Dev group not found"
                );
                summary.missing_dev_groups.push(dev_name);
                continue;
            };

            let dev_grantee = Grantee::Group(dev_group.id.clone());
            let mut planned = vec![(
                PermissionScope::Project,
                rule.for_grantee(dev_grantee.clone()),
            )];
            for (scope, scope_rules) in &defaults {
                if let Some(existing) = scope_rules
                    .iter()
                    .find(|r| r.grantee.group_id() == Some(&prod_group.id))
                {
                    planned.push((*scope, existing.for_grantee(dev_grantee.clone())));
                }
            }

            for (scope, dev_rule) in planned {
                if dry_run {
                    tracing::info!(
                        project = %project.name,
                        level = scope.label(),
                        prod_group = %prod_group.name,
                        dev_group = %dev_group.name,
                        capabilities = dev_rule.capabilities.len(),
                        "Would replicate permissions"
                    );
                } else {
                    server
                        .add_project_permissions(
                            &project.id,
                            scope,
                            std::slice::from_ref(&dev_rule),
                        )
                        .await?;
                    tracing::info!(
                        project = %project.name,
                        level = scope.label(),
                        prod_group = %prod_group.name,
                        dev_group = %dev_group.name,
                        capabilities = dev_rule.capabilities.len(),
                        "Replicated permissions"
                    );
                }
                summary.rules_replicated += 1;
            }
        }

        Ok(true)
    }
}
