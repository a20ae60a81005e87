//! Per-run scratch space
//!
//! Each export gets a fresh UUID and a scratch directory
//! `<scratch_root>/<uuid>` that holds the rendered views and their tiles.
//! The directory belongs to exactly one run and is removed when it ends.

use crate::domain::context::ResultExt;
use crate::domain::result::Result;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Identity and scratch directory of one export run
#[derive(Debug, Clone)]
pub struct RunContext {
    export_id: Uuid,
    scratch_dir: PathBuf,
}

impl RunContext {
    /// Creates the run's scratch directory under `scratch_root`
    pub fn create(scratch_root: impl AsRef<Path>) -> Result<Self> {
        let export_id = Uuid::new_v4();
        let scratch_dir = scratch_root.as_ref().join(export_id.to_string());

        std::fs::create_dir_all(&scratch_dir).with_context(|| {
            format!("Failed to create scratch directory {}", scratch_dir.display())
        })?;

        tracing::debug!(
            export_id = %export_id,
            scratch_dir = %scratch_dir.display(),
            "Created run context"
        );

        Ok(Self {
            export_id,
            scratch_dir,
        })
    }

    pub fn export_id(&self) -> Uuid {
        self.export_id
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Removes the scratch directory and everything in it
    ///
    /// Failures are logged and otherwise ignored.
    pub fn cleanup(&self) {
        match std::fs::remove_dir_all(&self.scratch_dir) {
            Ok(()) => tracing::debug!(
                export_id = %self.export_id,
                scratch_dir = %self.scratch_dir.display(),
                "Removed scratch directory"
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                export_id = %self.export_id,
                scratch_dir = %self.scratch_dir.display(),
                error = %e,
                "Failed to remove scratch directory"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_and_cleanup() {
        let root = TempDir::new().unwrap();
        let context = RunContext::create(root.path()).unwrap();

        assert!(context.scratch_dir().is_dir());
        assert!(context.scratch_dir().ends_with(context.export_id().to_string()));

        std::fs::create_dir_all(context.scratch_dir().join("slide_imgs")).unwrap();
        std::fs::write(context.scratch_dir().join("slide_imgs/a.png"), b"x").unwrap();

        context.cleanup();
        assert!(!context.scratch_dir().exists());
    }

    #[test]
    fn test_runs_never_share_a_directory() {
        let root = TempDir::new().unwrap();
        let a = RunContext::create(root.path()).unwrap();
        let b = RunContext::create(root.path()).unwrap();
        assert_ne!(a.scratch_dir(), b.scratch_dir());
    }

    #[test]
    fn test_cleanup_twice_is_harmless() {
        let root = TempDir::new().unwrap();
        let context = RunContext::create(root.path()).unwrap();
        context.cleanup();
        context.cleanup();
    }
}
