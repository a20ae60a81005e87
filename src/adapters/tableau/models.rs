//! Tableau REST API models
//!
//! Request and response bodies in the JSON form of the REST API. These are
//! separate from the domain types in [`crate::domain::items`] and convert
//! into them with `to_domain`, which is where malformed ids are rejected.

use crate::domain::errors::{ServerError, TabopsError};
use crate::domain::ids::{GroupId, ProjectId, SiteId, UserId, ViewId, WorkbookId};
use crate::domain::items::{
    Capability, CapabilityMode, Grantee, GroupItem, PermissionRule, ProjectItem, SiteItem,
    UserItem, ViewItem, WorkbookItem,
};
use crate::domain::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

fn invalid(e: String) -> TabopsError {
    TabopsError::Server(ServerError::InvalidResponse(e))
}

// Sign-in

#[derive(Debug, Serialize)]
pub struct SignInRequest<'a> {
    pub credentials: SignInCredentials<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInCredentials<'a> {
    pub personal_access_token_name: &'a str,
    pub personal_access_token_secret: &'a str,
    pub site: SiteRef<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRef<'a> {
    pub content_url: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SignInResponse {
    pub credentials: SessionCredentials,
}

#[derive(Debug, Deserialize)]
pub struct SessionCredentials {
    pub token: String,
    pub site: IdOnly,
    pub user: Option<IdOnly>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdOnly {
    pub id: String,
}

// Pagination

/// Paging block; the server sends the numbers as strings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(deserialize_with = "string_or_number")]
    pub page_number: u32,
    #[serde(deserialize_with = "string_or_number")]
    pub page_size: u32,
    #[serde(deserialize_with = "string_or_number")]
    pub total_available: u32,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Listing wrapper: `{"pagination": {...}, "<plural>": {"<singular>": [...]}}`
macro_rules! listing {
    ($response:ident, $plural:literal, $list:ident, $singular:literal, $item:ty) => {
        #[derive(Debug, Deserialize)]
        pub struct $response {
            pub pagination: Option<Pagination>,
            #[serde(rename = $plural, default)]
            pub list: $list,
        }

        #[derive(Debug, Default, Deserialize)]
        pub struct $list {
            #[serde(rename = $singular, default)]
            pub items: Vec<$item>,
        }

        impl $response {
            /// Total items across pages, falling back to this page's count
            pub fn total_available(&self) -> u32 {
                self.pagination
                    .as_ref()
                    .map(|p| p.total_available)
                    .unwrap_or(self.list.items.len() as u32)
            }
        }
    };
}

listing!(WorkbooksResponse, "workbooks", WorkbookList, "workbook", WorkbookModel);
listing!(ViewsResponse, "views", ViewList, "view", ViewModel);
listing!(ProjectsResponse, "projects", ProjectList, "project", ProjectModel);
listing!(GroupsResponse, "groups", GroupList, "group", GroupModel);
listing!(UsersResponse, "users", UserList, "user", UserModel);
listing!(SitesResponse, "sites", SiteList, "site", SiteModel);

// Resources

#[derive(Debug, Clone, Deserialize)]
pub struct WorkbookModel {
    pub id: String,
    pub name: String,
    pub project: Option<NamedRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl WorkbookModel {
    pub fn to_domain(&self) -> Result<WorkbookItem> {
        let project = self.project.as_ref();
        Ok(WorkbookItem {
            id: WorkbookId::new(&self.id).map_err(invalid)?,
            name: self.name.clone(),
            project_id: project
                .and_then(|p| p.id.as_deref())
                .map(ProjectId::new)
                .transpose()
                .map_err(invalid)?,
            project_name: project.and_then(|p| p.name.clone()).unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewModel {
    pub id: String,
    pub name: String,
}

impl ViewModel {
    pub fn to_domain(&self) -> Result<ViewItem> {
        Ok(ViewItem {
            id: ViewId::new(&self.id).map_err(invalid)?,
            name: self.name.clone(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectModel {
    pub id: String,
    pub name: String,
}

impl ProjectModel {
    pub fn to_domain(&self) -> Result<ProjectItem> {
        Ok(ProjectItem {
            id: ProjectId::new(&self.id).map_err(invalid)?,
            name: self.name.clone(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupModel {
    pub id: String,
    pub name: String,
    pub minimum_site_role: Option<String>,
}

impl GroupModel {
    pub fn to_domain(&self) -> Result<GroupItem> {
        Ok(GroupItem {
            id: GroupId::new(&self.id).map_err(invalid)?,
            name: self.name.clone(),
            minimum_site_role: self.minimum_site_role.clone(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserModel {
    pub id: String,
    pub name: String,
    pub site_role: String,
    pub last_login: Option<DateTime<Utc>>,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

impl UserModel {
    pub fn to_domain(&self) -> Result<UserItem> {
        Ok(UserItem {
            id: UserId::new(&self.id).map_err(invalid)?,
            name: self.name.clone(),
            site_role: self.site_role.clone(),
            last_login: self.last_login,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteModel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub content_url: String,
}

impl SiteModel {
    pub fn to_domain(&self) -> Result<SiteItem> {
        Ok(SiteItem {
            id: SiteId::new(&self.id).map_err(invalid)?,
            name: self.name.clone(),
            content_url: self.content_url.clone(),
        })
    }
}

// Permissions

/// `{"permissions": {"granteeCapabilities": [...]}}`, used both ways
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionsEnvelope {
    pub permissions: PermissionsBody,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsBody {
    #[serde(default)]
    pub grantee_capabilities: Vec<GranteeCapabilitiesModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GranteeCapabilitiesModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<IdOnly>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<IdOnly>,
    pub capabilities: CapabilityList,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilityList {
    #[serde(default)]
    pub capability: Vec<CapabilityModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityModel {
    pub name: String,
    pub mode: String,
}

impl GranteeCapabilitiesModel {
    pub fn to_domain(&self) -> Result<PermissionRule> {
        let grantee = match (&self.group, &self.user) {
            (Some(group), _) => Grantee::Group(GroupId::new(&group.id).map_err(invalid)?),
            (None, Some(user)) => Grantee::User(UserId::new(&user.id).map_err(invalid)?),
            (None, None) => {
                return Err(invalid("permission rule without grantee".to_string()));
            }
        };

        let capabilities = self
            .capabilities
            .capability
            .iter()
            .map(|c| {
                let mode = match c.mode.as_str() {
                    "Allow" => CapabilityMode::Allow,
                    "Deny" => CapabilityMode::Deny,
                    other => {
                        return Err(invalid(format!(
                            "unknown capability mode '{other}' for {}",
                            c.name
                        )))
                    }
                };
                Ok(Capability::new(&c.name, mode))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PermissionRule::new(grantee, capabilities))
    }

    pub fn from_domain(rule: &PermissionRule) -> Self {
        let (group, user) = match &rule.grantee {
            Grantee::Group(id) => (Some(IdOnly { id: id.to_string() }), None),
            Grantee::User(id) => (None, Some(IdOnly { id: id.to_string() })),
        };
        Self {
            group,
            user,
            capabilities: CapabilityList {
                capability: rule
                    .capabilities
                    .iter()
                    .map(|c| CapabilityModel {
                        name: c.name.clone(),
                        mode: match c.mode {
                            CapabilityMode::Allow => "Allow".to_string(),
                            CapabilityMode::Deny => "Deny".to_string(),
                        },
                    })
                    .collect(),
            },
        }
    }
}

// Updates

#[derive(Debug, Serialize)]
pub struct UserUpdateRequest<'a> {
    pub user: UserUpdate<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate<'a> {
    pub site_role: &'a str,
}

#[derive(Debug, Serialize)]
pub struct GroupUpdateRequest<'a> {
    pub group: GroupUpdate<'a>,
}

/// `minimumSiteRole` is always sent; `null` clears it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupUpdate<'a> {
    pub name: &'a str,
    pub minimum_site_role: Option<&'a str>,
}

/// Body of an error response
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub detail: String,
}

impl ErrorDetail {
    pub fn message(&self) -> String {
        format!("{} {}: {}", self.code, self.summary, self.detail)
            .trim()
            .to_string()
    }
}
