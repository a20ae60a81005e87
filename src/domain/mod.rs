//! Domain models and types for tabops.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`WorkbookId`], [`ViewId`], [`GroupId`], ...)
//! - **Server resources** ([`WorkbookItem`], [`ViewItem`], [`PermissionRule`], ...)
//! - **Export descriptor** ([`ExportConfig`], [`FilterSpec`]) and run records
//! - **Error types** ([`TabopsError`], [`ServerError`]) and the [`Result`] alias
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, TabopsError>`]:
//!
//! ```rust,no_run
//! use tabops::domain::Result;
//!
//! fn example() -> Result<()> {
//!     let descriptor = tabops::config::load_export_config("config/sales.json", "config")?;
//!     println!("{}", descriptor.workbook_name);
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod errors;
pub mod export;
pub mod ids;
pub mod items;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{ServerError, TabopsError};
pub use export::{ExportConfig, ExportType, FilterSpec, ImageIndex, ViewExport, ViewFilters};
pub use ids::{GroupId, ProjectId, SiteId, UserId, ViewId, WorkbookId};
pub use items::{
    Capability, CapabilityMode, Grantee, GroupItem, PermissionRule, PermissionScope, ProjectItem,
    SiteItem, UserItem, ViewItem, WorkbookItem,
};
pub use result::Result;
