//! Domain identifier types with validation
//!
//! Tableau identifies every resource by a LUID (locally unique identifier).
//! Each resource kind gets its own newtype so a view id can never be passed
//! where a workbook id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! luid_newtype {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new ", $label, " from a string")]
            ///
            /// Returns `Err` when the identifier is empty or blank.
            pub fn new(id: impl Into<String>) -> Result<Self, String> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(concat!($label, " cannot be empty").to_string());
                }
                Ok(Self(id))
            }

            /// Returns the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes self and returns the inner String
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

luid_newtype!(
    /// Site LUID (not the content URL used at sign-in)
    SiteId,
    "Site ID"
);
luid_newtype!(
    /// Workbook LUID
    WorkbookId,
    "Workbook ID"
);
luid_newtype!(
    /// View (sheet or dashboard) LUID
    ViewId,
    "View ID"
);
luid_newtype!(
    /// Project LUID
    ProjectId,
    "Project ID"
);
luid_newtype!(
    /// Group LUID
    GroupId,
    "Group ID"
);
luid_newtype!(
    /// User LUID
    UserId,
    "User ID"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workbook_id_valid() {
        let id = WorkbookId::new("1f1e1d1c-0000-4000-8000-000000000001").unwrap();
        assert_eq!(id.as_str(), "1f1e1d1c-0000-4000-8000-000000000001");
        assert_eq!(id.to_string(), "1f1e1d1c-0000-4000-8000-000000000001");
    }

    #[test]
    fn test_empty_ids_rejected() {
        assert!(ViewId::new("").is_err());
        assert!(GroupId::new("   ").is_err());
        assert_eq!(UserId::new("").unwrap_err(), "User ID cannot be empty");
    }

    #[test]
    fn test_from_str() {
        let id = ProjectId::from_str("p-1").unwrap();
        assert_eq!(id.into_inner(), "p-1");
    }

    #[test]
    fn test_transparent_serde() {
        let id = SiteId::new("site-9").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"site-9\"");
        let back: SiteId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
