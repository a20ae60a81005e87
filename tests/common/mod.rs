//! In-memory BI server shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::Mutex;
use tabops::adapters::tableau::{BiServer, Page, PageRequest, ViewRequest};
use tabops::domain::{
    GroupId, GroupItem, PermissionRule, PermissionScope, ProjectId, ProjectItem, Result,
    ServerError, SiteId, SiteItem, TabopsError, UserId, UserItem, ViewId, ViewItem, WorkbookId,
    WorkbookItem,
};

/// A recorded write against the fake server
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    AddPermissions {
        project: String,
        scope: PermissionScope,
        grantee: String,
    },
    UpdateUserRole {
        site: String,
        user: String,
        role: String,
    },
    UpdateGroupRole {
        site: String,
        group: String,
        role: Option<String>,
    },
}

#[derive(Default)]
pub struct FakeServer {
    pub workbooks: Vec<WorkbookItem>,
    pub views: HashMap<String, Vec<ViewItem>>,
    /// Rendered image size per view name
    pub image_sizes: HashMap<String, (u32, u32)>,
    pub projects: Vec<ProjectItem>,
    pub groups: Vec<GroupItem>,
    pub permissions: HashMap<(String, PermissionScope), Vec<PermissionRule>>,
    pub sites: Vec<SiteItem>,
    /// Users per site content URL
    pub users: HashMap<String, Vec<UserItem>>,
    /// Site content URLs whose sign-in is rejected
    pub reject_sign_in: HashSet<String>,

    pub session: Option<String>,
    pub sign_ins: usize,
    pub sign_outs: usize,
    pub calls: Mutex<Vec<Call>>,
    pub view_requests: Mutex<Vec<(String, ViewRequest)>>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workbook(mut self, id: &str, name: &str, project: &str) -> Self {
        self.workbooks.push(WorkbookItem {
            id: WorkbookId::new(id).unwrap(),
            name: name.to_string(),
            project_id: None,
            project_name: project.to_string(),
        });
        self
    }

    /// Adds a view to a workbook, rendered at `width` x `height`
    pub fn with_view(mut self, workbook_id: &str, name: &str, width: u32, height: u32) -> Self {
        let views = self.views.entry(workbook_id.to_string()).or_default();
        views.push(ViewItem {
            id: ViewId::new(format!("{workbook_id}-v{}", views.len() + 1)).unwrap(),
            name: name.to_string(),
        });
        self.image_sizes.insert(name.to_string(), (width, height));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn site(&self) -> Result<String> {
        self.session
            .clone()
            .ok_or(TabopsError::Server(ServerError::NotSignedIn))
    }

    fn view_name(&self, view: &ViewId) -> Option<String> {
        self.views
            .values()
            .flatten()
            .find(|v| &v.id == view)
            .map(|v| v.name.clone())
    }
}

pub fn page<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let start = ((request.number - 1) * request.size) as usize;
    let end = (start + request.size as usize).min(items.len());
    Page {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        total_available: items.len() as u32,
    }
}

/// Encodes a solid-colour PNG
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .unwrap();
    bytes
}

pub fn group(id: &str, name: &str) -> GroupItem {
    GroupItem {
        id: GroupId::new(id).unwrap(),
        name: name.to_string(),
        minimum_site_role: None,
    }
}

pub fn project(id: &str, name: &str) -> ProjectItem {
    ProjectItem {
        id: ProjectId::new(id).unwrap(),
        name: name.to_string(),
    }
}

pub fn site(id: &str, name: &str, content_url: &str) -> SiteItem {
    SiteItem {
        id: SiteId::new(id).unwrap(),
        name: name.to_string(),
        content_url: content_url.to_string(),
    }
}

#[async_trait]
impl BiServer for FakeServer {
    async fn sign_in(&mut self, site_content_url: &str) -> Result<SiteId> {
        self.sign_ins += 1;
        if self.reject_sign_in.contains(site_content_url) {
            return Err(TabopsError::Server(ServerError::AuthenticationFailed(
                format!("rejected sign-in to '{site_content_url}'"),
            )));
        }
        self.session = Some(site_content_url.to_string());
        Ok(SiteId::new(format!("site-{site_content_url}")).unwrap())
    }

    async fn sign_out(&mut self) -> Result<()> {
        self.sign_outs += 1;
        self.session = None;
        Ok(())
    }

    fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    fn base_url(&self) -> &str {
        "memory://fake"
    }

    async fn workbooks_page(&self, request: PageRequest) -> Result<Page<WorkbookItem>> {
        self.site()?;
        Ok(page(&self.workbooks, request))
    }

    async fn projects_page(&self, request: PageRequest) -> Result<Page<ProjectItem>> {
        self.site()?;
        Ok(page(&self.projects, request))
    }

    async fn groups_page(&self, request: PageRequest) -> Result<Page<GroupItem>> {
        self.site()?;
        Ok(page(&self.groups, request))
    }

    async fn users_page(&self, request: PageRequest) -> Result<Page<UserItem>> {
        let site = self.site()?;
        let users = self.users.get(&site).cloned().unwrap_or_default();
        Ok(page(&users, request))
    }

    async fn sites_page(&self, request: PageRequest) -> Result<Page<SiteItem>> {
        self.site()?;
        Ok(page(&self.sites, request))
    }

    async fn workbook_views(&self, workbook: &WorkbookId) -> Result<Vec<ViewItem>> {
        self.site()?;
        Ok(self.views.get(workbook.as_str()).cloned().unwrap_or_default())
    }

    async fn view_image(&self, view: &ViewId, request: &ViewRequest) -> Result<Vec<u8>> {
        self.site()?;
        let name = self
            .view_name(view)
            .ok_or_else(|| TabopsError::Server(ServerError::ResourceNotFound(view.to_string())))?;
        self.view_requests
            .lock()
            .unwrap()
            .push((name.clone(), request.clone()));
        let (w, h) = self.image_sizes[&name];
        Ok(png(w, h))
    }

    async fn view_data(&self, view: &ViewId, _request: &ViewRequest) -> Result<Vec<u8>> {
        self.site()?;
        let name = self
            .view_name(view)
            .ok_or_else(|| TabopsError::Server(ServerError::ResourceNotFound(view.to_string())))?;
        Ok(format!("Measure,Value\n{name},1\n").into_bytes())
    }

    async fn project_permissions(
        &self,
        project: &ProjectId,
        scope: PermissionScope,
    ) -> Result<Vec<PermissionRule>> {
        self.site()?;
        Ok(self
            .permissions
            .get(&(project.to_string(), scope))
            .cloned()
            .unwrap_or_default())
    }

    async fn add_project_permissions(
        &self,
        project: &ProjectId,
        scope: PermissionScope,
        rules: &[PermissionRule],
    ) -> Result<()> {
        self.site()?;
        let mut calls = self.calls.lock().unwrap();
        for rule in rules {
            let grantee = match &rule.grantee {
                tabops::domain::Grantee::Group(id) => id.to_string(),
                tabops::domain::Grantee::User(id) => id.to_string(),
            };
            calls.push(Call::AddPermissions {
                project: project.to_string(),
                scope,
                grantee,
            });
        }
        Ok(())
    }

    async fn update_user_site_role(&self, user: &UserId, site_role: &str) -> Result<()> {
        let site = self.site()?;
        self.calls.lock().unwrap().push(Call::UpdateUserRole {
            site,
            user: user.to_string(),
            role: site_role.to_string(),
        });
        Ok(())
    }

    async fn update_group_minimum_site_role(
        &self,
        group: &GroupItem,
        site_role: Option<&str>,
    ) -> Result<()> {
        let site = self.site()?;
        self.calls.lock().unwrap().push(Call::UpdateGroupRole {
            site,
            group: group.name.clone(),
            role: site_role.map(str::to_string),
        });
        Ok(())
    }
}
