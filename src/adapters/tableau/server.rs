//! BI server trait definition
//!
//! `BiServer` is everything tabops needs from the server: a signed-in
//! session, paged listings, view renders and the permission and account
//! updates used by the maintenance commands. The pipeline and the
//! maintenance jobs only ever see this trait, so tests can substitute an
//! in-memory server.

use crate::domain::items::{
    GroupItem, PermissionRule, PermissionScope, ProjectItem, SiteItem, UserItem, ViewItem,
    WorkbookItem,
};
use crate::domain::ids::{ProjectId, SiteId, UserId, ViewId, WorkbookId};
use crate::domain::export::ViewFilters;
use crate::domain::Result;
use async_trait::async_trait;
use std::future::Future;

/// Which page of a listing to fetch (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn first(size: u32) -> Self {
        Self { number: 1, size }
    }

    pub fn next(self) -> Self {
        Self {
            number: self.number + 1,
            size: self.size,
        }
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total_available: u32,
}

/// Options for image and data renders of a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRequest {
    pub filters: ViewFilters,
    /// Accept a cached render up to this many minutes old
    pub max_age_minutes: u32,
}

/// Trait for BI server implementations
///
/// # Example
///
/// ```no_run
/// use tabops::adapters::tableau::{collect_pages, BiServer, TableauServer};
/// use tabops::config::load_config;
///
/// # async fn example() -> tabops::domain::Result<()> {
/// let config = load_config("tabops.toml")?;
/// let mut server = TableauServer::new(config.server.clone())?;
///
/// server.sign_in(&config.server.site).await?;
/// let server_ref = &server;
/// let workbooks = collect_pages(config.server.page_size, move |page| {
///     server_ref.workbooks_page(page)
/// })
/// .await?;
/// println!("{} workbooks", workbooks.len());
/// server.sign_out().await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait BiServer: Send + Sync {
    /// Sign in to the site with the given content URL (empty for default)
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ServerError::AuthenticationFailed`] when the
    /// server rejects the credentials.
    async fn sign_in(&mut self, site_content_url: &str) -> Result<SiteId>;

    /// End the session; the session is dropped even if the call fails
    async fn sign_out(&mut self) -> Result<()>;

    /// Whether a session is currently held
    fn is_authenticated(&self) -> bool;

    /// Server base URL, for logging
    fn base_url(&self) -> &str;

    async fn workbooks_page(&self, page: PageRequest) -> Result<Page<WorkbookItem>>;

    async fn projects_page(&self, page: PageRequest) -> Result<Page<ProjectItem>>;

    async fn groups_page(&self, page: PageRequest) -> Result<Page<GroupItem>>;

    async fn users_page(&self, page: PageRequest) -> Result<Page<UserItem>>;

    async fn sites_page(&self, page: PageRequest) -> Result<Page<SiteItem>>;

    /// Views of a workbook, in workbook order
    async fn workbook_views(&self, workbook: &WorkbookId) -> Result<Vec<ViewItem>>;

    /// High-resolution PNG render of a view
    async fn view_image(&self, view: &ViewId, request: &ViewRequest) -> Result<Vec<u8>>;

    /// CSV data extract of a view
    async fn view_data(&self, view: &ViewId, request: &ViewRequest) -> Result<Vec<u8>>;

    /// Permission rules of a project for one scope
    async fn project_permissions(
        &self,
        project: &ProjectId,
        scope: PermissionScope,
    ) -> Result<Vec<PermissionRule>>;

    /// Adds rules to a project's permissions for one scope
    async fn add_project_permissions(
        &self,
        project: &ProjectId,
        scope: PermissionScope,
        rules: &[PermissionRule],
    ) -> Result<()>;

    async fn update_user_site_role(&self, user: &UserId, site_role: &str) -> Result<()>;

    /// Sets (or clears, with `None`) the minimum site role of a group
    async fn update_group_minimum_site_role(
        &self,
        group: &GroupItem,
        site_role: Option<&str>,
    ) -> Result<()>;
}

/// Fetches every page of a listing
///
/// Stops once `total_available` items have been gathered, or when a page
/// comes back short or empty.
pub async fn collect_pages<T, F, Fut>(page_size: u32, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut request = PageRequest::first(page_size);

    loop {
        let page = fetch(request).await?;
        let received = page.items.len();
        items.extend(page.items);

        if received == 0
            || received < page_size as usize
            || items.len() >= page.total_available as usize
        {
            break;
        }
        request = request.next();
    }

    tracing::trace!(items = items.len(), pages = request.number, "Collected listing");
    Ok(items)
}
