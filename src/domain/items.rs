//! Server resources as seen by the rest of the crate
//!
//! These are the domain shapes of workbooks, views, projects, groups, users,
//! sites and permission rules. The wire formats live in
//! `adapters::tableau::models` and convert into these.

use super::ids::{GroupId, ProjectId, SiteId, UserId, ViewId, WorkbookId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbookItem {
    pub id: WorkbookId,
    pub name: String,
    pub project_id: Option<ProjectId>,
    pub project_name: String,
}

/// A view (sheet or dashboard) of a workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewItem {
    pub id: ViewId,
    pub name: String,
}

/// A project (folder) on a site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectItem {
    pub id: ProjectId,
    pub name: String,
}

/// A local or imported group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupItem {
    pub id: GroupId,
    pub name: String,
    pub minimum_site_role: Option<String>,
}

/// A user account on a site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserItem {
    pub id: UserId,
    pub name: String,
    pub site_role: String,
    pub last_login: Option<DateTime<Utc>>,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

/// A site on the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteItem {
    pub id: SiteId,
    pub name: String,
    pub content_url: String,
}

/// Who a permission rule applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grantee {
    Group(GroupId),
    User(UserId),
}

impl Grantee {
    /// The group id, when the grantee is a group
    pub fn group_id(&self) -> Option<&GroupId> {
        match self {
            Grantee::Group(id) => Some(id),
            Grantee::User(_) => None,
        }
    }
}

/// Allow/Deny for one capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapabilityMode {
    Allow,
    Deny,
}

/// A named capability (Read, Write, ExportImage, ...) with its mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,
    pub mode: CapabilityMode,
}

impl Capability {
    pub fn new(name: impl Into<String>, mode: CapabilityMode) -> Self {
        Self {
            name: name.into(),
            mode,
        }
    }
}

/// A grantee together with its capabilities on one permission scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRule {
    pub grantee: Grantee,
    pub capabilities: Vec<Capability>,
}

impl PermissionRule {
    pub fn new(grantee: Grantee, capabilities: Vec<Capability>) -> Self {
        Self {
            grantee,
            capabilities,
        }
    }

    /// Same capabilities, different grantee
    pub fn for_grantee(&self, grantee: Grantee) -> Self {
        Self {
            grantee,
            capabilities: self.capabilities.clone(),
        }
    }
}

/// Which permission set of a project a rule belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionScope {
    /// Permissions on the project itself
    Project,
    /// Default permissions applied to new workbooks in the project
    DefaultWorkbooks,
    /// Default permissions applied to new data sources in the project
    DefaultDatasources,
}

impl PermissionScope {
    /// Human-readable level name used in logs
    pub fn label(&self) -> &'static str {
        match self {
            PermissionScope::Project => "project",
            PermissionScope::DefaultWorkbooks => "workbook",
            PermissionScope::DefaultDatasources => "datasource",
        }
    }
}
