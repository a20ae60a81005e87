//! Tableau REST API client
//!
//! Implements [`BiServer`] against Tableau Server / Tableau Cloud using
//! personal access token sign-in and JSON payloads.

use super::models::{
    ErrorResponse, GranteeCapabilitiesModel, GroupUpdate, GroupUpdateRequest, GroupsResponse,
    PermissionsBody, PermissionsEnvelope, ProjectsResponse, SignInCredentials, SignInRequest,
    SignInResponse, SiteRef, SitesResponse, UserUpdate, UserUpdateRequest, UsersResponse,
    ViewsResponse, WorkbooksResponse,
};
use super::server::{BiServer, Page, PageRequest, ViewRequest};
use crate::config::{secret_string, SecretString, ServerConfig};
use crate::domain::errors::{ServerError, TabopsError};
use crate::domain::ids::{ProjectId, SiteId, UserId, ViewId, WorkbookId};
use crate::domain::items::{
    GroupItem, PermissionRule, PermissionScope, ProjectItem, SiteItem, UserItem, ViewItem,
    WorkbookItem,
};
use crate::domain::Result;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const AUTH_HEADER: &str = "X-Tableau-Auth";

/// Signed-in session state
struct Session {
    token: SecretString,
    site_id: SiteId,
}

/// Tableau REST API client
///
/// # Example
///
/// ```no_run
/// use tabops::adapters::tableau::{BiServer, TableauServer};
/// use tabops::config::load_config;
///
/// # async fn example() -> tabops::domain::Result<()> {
/// let config = load_config("tabops.toml")?;
/// let mut server = TableauServer::new(config.server.clone())?;
/// let site_id = server.sign_in(&config.server.site).await?;
/// println!("Signed in to site {site_id}");
/// server.sign_out().await?;
/// # Ok(())
/// # }
/// ```
pub struct TableauServer {
    client: Client,
    config: ServerConfig,
    session: Option<Session>,
}

impl TableauServer {
    /// Builds the HTTP client; no request is made until sign-in
    pub fn new(config: ServerConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                TabopsError::Server(ServerError::ConnectionFailed(format!(
                    "Failed to build HTTP client: {e}"
                )))
            })?;

        Ok(Self {
            client,
            config,
            session: None,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/api/{}/{}",
            self.config.trimmed_base_url(),
            self.config.api_version,
            path
        )
    }

    fn session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .ok_or(TabopsError::Server(ServerError::NotSignedIn))
    }

    fn site_url(&self, path: &str) -> Result<String> {
        let session = self.session()?;
        Ok(self.api_url(&format!("sites/{}/{}", session.site_id, path)))
    }

    /// Sends a request with auth and accept headers and checks the status
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let mut request = request.header(reqwest::header::ACCEPT, "application/json");
        if let Some(session) = &self.session {
            request = request.header(AUTH_HEADER, session.token.expose_secret().as_ref());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TabopsError::Server(ServerError::Timeout(format!("{what}: {e}")))
            } else {
                TabopsError::Server(ServerError::ConnectionFailed(format!("{what}: {e}")))
            }
        })?;

        check_status(response, what).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(String, String)],
        what: &str,
    ) -> Result<T> {
        tracing::debug!(url = %url, "GET {what}");
        let response = self.send(self.client.get(&url).query(query), what).await?;
        response.json::<T>().await.map_err(|e| {
            TabopsError::Server(ServerError::InvalidResponse(format!(
                "{what}: failed to parse response: {e}"
            )))
        })
    }

    async fn get_bytes(&self, url: String, query: &[(String, String)], what: &str) -> Result<Vec<u8>> {
        tracing::debug!(url = %url, "GET {what}");
        let response = self.send(self.client.get(&url).query(query), what).await?;
        let bytes = response.bytes().await.map_err(|e| {
            TabopsError::Server(ServerError::InvalidResponse(format!(
                "{what}: failed to read body: {e}"
            )))
        })?;
        Ok(bytes.to_vec())
    }

    async fn put_json<B: Serialize + Sync>(&self, url: String, body: &B, what: &str) -> Result<()> {
        tracing::debug!(url = %url, "PUT {what}");
        self.send(self.client.put(&url).json(body), what).await?;
        Ok(())
    }

    fn page_query(page: PageRequest) -> Vec<(String, String)> {
        vec![
            ("pageSize".to_string(), page.size.to_string()),
            ("pageNumber".to_string(), page.number.to_string()),
        ]
    }

    fn permissions_path(project: &ProjectId, scope: PermissionScope) -> String {
        match scope {
            PermissionScope::Project => format!("projects/{project}/permissions"),
            PermissionScope::DefaultWorkbooks => {
                format!("projects/{project}/default-permissions/workbooks")
            }
            PermissionScope::DefaultDatasources => {
                format!("projects/{project}/default-permissions/datasources")
            }
        }
    }

    fn view_query(request: &ViewRequest, high_resolution: bool) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if high_resolution {
            query.push(("resolution".to_string(), "high".to_string()));
        }
        query.push(("maxAge".to_string(), request.max_age_minutes.to_string()));
        query.extend(request.filters.query_pairs());
        query
    }
}

/// Maps non-success statuses to [`ServerError`] variants
async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error.message())
        .unwrap_or(body);
    let message = format!("{what}: {message}");

    let error = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ServerError::AuthenticationFailed(message)
        }
        StatusCode::NOT_FOUND => ServerError::ResourceNotFound(message),
        s if s.is_client_error() => ServerError::ClientFailure {
            status: s.as_u16(),
            message,
        },
        s => ServerError::ServerFailure {
            status: s.as_u16(),
            message,
        },
    };
    Err(TabopsError::Server(error))
}

macro_rules! page_of {
    ($response:expr) => {{
        let response = $response;
        let total_available = response.total_available();
        let items = response
            .list
            .items
            .iter()
            .map(|m| m.to_domain())
            .collect::<Result<Vec<_>>>()?;
        Ok(Page {
            items,
            total_available,
        })
    }};
}

#[async_trait]
impl BiServer for TableauServer {
    async fn sign_in(&mut self, site_content_url: &str) -> Result<SiteId> {
        let body = SignInRequest {
            credentials: SignInCredentials {
                personal_access_token_name: &self.config.token_name,
                personal_access_token_secret: self.config.token_secret.expose_secret().as_ref(),
                site: SiteRef {
                    content_url: site_content_url,
                },
            },
        };

        tracing::info!(
            server = %self.config.base_url,
            site = %site_content_url,
            token_name = %self.config.token_name,
            "Signing in"
        );

        let url = self.api_url("auth/signin");
        let response = self.send(self.client.post(&url).json(&body), "sign in").await?;
        let signed_in: SignInResponse = response.json().await.map_err(|e| {
            TabopsError::Server(ServerError::InvalidResponse(format!(
                "sign in: failed to parse response: {e}"
            )))
        })?;

        let site_id = SiteId::new(signed_in.credentials.site.id)
            .map_err(|e| TabopsError::Server(ServerError::InvalidResponse(e)))?;
        if let Some(user) = &signed_in.credentials.user {
            tracing::debug!(user_id = %user.id, site_id = %site_id, "Signed in");
        }

        self.session = Some(Session {
            token: secret_string(signed_in.credentials.token),
            site_id: site_id.clone(),
        });
        Ok(site_id)
    }

    async fn sign_out(&mut self) -> Result<()> {
        if self.session.is_none() {
            return Ok(());
        }

        let url = self.api_url("auth/signout");
        let result = self.send(self.client.post(&url), "sign out").await;
        self.session = None;
        result?;

        tracing::info!(server = %self.config.base_url, "Signed out");
        Ok(())
    }

    fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn workbooks_page(&self, page: PageRequest) -> Result<Page<WorkbookItem>> {
        let url = self.site_url("workbooks")?;
        let response: WorkbooksResponse =
            self.get_json(url, &Self::page_query(page), "list workbooks").await?;
        page_of!(response)
    }

    async fn projects_page(&self, page: PageRequest) -> Result<Page<ProjectItem>> {
        let url = self.site_url("projects")?;
        let response: ProjectsResponse =
            self.get_json(url, &Self::page_query(page), "list projects").await?;
        page_of!(response)
    }

    async fn groups_page(&self, page: PageRequest) -> Result<Page<GroupItem>> {
        let url = self.site_url("groups")?;
        let response: GroupsResponse =
            self.get_json(url, &Self::page_query(page), "list groups").await?;
        page_of!(response)
    }

    async fn users_page(&self, page: PageRequest) -> Result<Page<UserItem>> {
        let url = self.site_url("users")?;
        let mut query = Self::page_query(page);
        query.push(("fields".to_string(), "_all_".to_string()));
        let response: UsersResponse = self.get_json(url, &query, "list users").await?;
        page_of!(response)
    }

    async fn sites_page(&self, page: PageRequest) -> Result<Page<SiteItem>> {
        let url = self.api_url("sites");
        let response: SitesResponse =
            self.get_json(url, &Self::page_query(page), "list sites").await?;
        page_of!(response)
    }

    async fn workbook_views(&self, workbook: &WorkbookId) -> Result<Vec<ViewItem>> {
        let url = self.site_url(&format!("workbooks/{workbook}/views"))?;
        let response: ViewsResponse = self.get_json(url, &[], "list workbook views").await?;
        response.list.items.iter().map(|v| v.to_domain()).collect()
    }

    async fn view_image(&self, view: &ViewId, request: &ViewRequest) -> Result<Vec<u8>> {
        let url = self.site_url(&format!("views/{view}/image"))?;
        self.get_bytes(url, &Self::view_query(request, true), "view image")
            .await
    }

    async fn view_data(&self, view: &ViewId, request: &ViewRequest) -> Result<Vec<u8>> {
        let url = self.site_url(&format!("views/{view}/data"))?;
        self.get_bytes(url, &Self::view_query(request, false), "view data")
            .await
    }

    async fn project_permissions(
        &self,
        project: &ProjectId,
        scope: PermissionScope,
    ) -> Result<Vec<PermissionRule>> {
        let url = self.site_url(&Self::permissions_path(project, scope))?;
        let envelope: PermissionsEnvelope = self
            .get_json(url, &[], &format!("{} permissions", scope.label()))
            .await?;
        envelope
            .permissions
            .grantee_capabilities
            .iter()
            .map(|g| g.to_domain())
            .collect()
    }

    async fn add_project_permissions(
        &self,
        project: &ProjectId,
        scope: PermissionScope,
        rules: &[PermissionRule],
    ) -> Result<()> {
        let url = self.site_url(&Self::permissions_path(project, scope))?;
        let body = PermissionsEnvelope {
            permissions: PermissionsBody {
                grantee_capabilities: rules
                    .iter()
                    .map(GranteeCapabilitiesModel::from_domain)
                    .collect(),
            },
        };
        self.put_json(url, &body, &format!("update {} permissions", scope.label()))
            .await
    }

    async fn update_user_site_role(&self, user: &UserId, site_role: &str) -> Result<()> {
        let url = self.site_url(&format!("users/{user}"))?;
        let body = UserUpdateRequest {
            user: UserUpdate { site_role },
        };
        self.put_json(url, &body, "update user").await
    }

    async fn update_group_minimum_site_role(
        &self,
        group: &GroupItem,
        site_role: Option<&str>,
    ) -> Result<()> {
        let url = self.site_url(&format!("groups/{}", group.id))?;
        let body = GroupUpdateRequest {
            group: GroupUpdate {
                name: &group.name,
                minimum_site_role: site_role,
            },
        };
        self.put_json(url, &body, "update group").await
    }
}
