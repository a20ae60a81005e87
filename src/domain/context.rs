//! Error context extension trait
//!
//! This module provides a context extension trait similar to `anyhow::Context`
//! that works with `Result<T, TabopsError>`. Unlike `anyhow`, the error
//! category survives: a render error with context is still a render error,
//! so callers can keep matching on the variant.
//!
//! # Examples
//!
//! ```rust
//! use tabops::domain::Result;
//! use tabops::domain::context::ResultExt;
//!
//! fn read_descriptor(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_context(|| format!("Failed to read descriptor {path}"))
//! }
//! ```

use crate::domain::errors::TabopsError;
use crate::domain::result::Result;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Add context to an error
    ///
    /// The context is evaluated eagerly, so use `.with_context()` if the
    /// context string is expensive to compute.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static;

    /// Add context to an error using a closure (lazy evaluation)
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<TabopsError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| prefix(e.into(), context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| prefix(e.into(), f()))
    }
}

fn prefix(error: TabopsError, context: impl std::fmt::Display) -> TabopsError {
    match error {
        TabopsError::Configuration(msg) => TabopsError::Configuration(format!("{context}: {msg}")),
        TabopsError::NotFound(msg) => TabopsError::NotFound(format!("{context}: {msg}")),
        TabopsError::Ambiguous(msg) => TabopsError::Ambiguous(format!("{context}: {msg}")),
        TabopsError::Render(msg) => TabopsError::Render(format!("{context}: {msg}")),
        TabopsError::Validation(msg) => TabopsError::Validation(format!("{context}: {msg}")),
        TabopsError::Serialization(msg) => TabopsError::Serialization(format!("{context}: {msg}")),
        TabopsError::Io(msg) => TabopsError::Io(format!("{context}: {msg}")),
        other => TabopsError::Other(format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ServerError;

    #[test]
    fn test_context_keeps_variant() {
        let result: Result<()> = Err(TabopsError::Render("bad tile".to_string()));
        let err = result.context("Failed to assemble deck").unwrap_err();

        assert!(matches!(err, TabopsError::Render(_)));
        let msg = err.to_string();
        assert!(msg.contains("Failed to assemble deck"));
        assert!(msg.contains("bad tile"));
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let called = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let called_clone = called.clone();

        let result: Result<i32> = Ok(42);
        let with_context = result.with_context(|| {
            called_clone.store(true, std::sync::atomic::Ordering::SeqCst);
            "Expensive context"
        });

        assert!(with_context.is_ok());
        assert!(!called.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn test_context_with_server_error() {
        let result: Result<()> =
            Err(ServerError::ConnectionFailed("Network timeout".to_string()).into());
        let err = result.context("Failed to list workbooks").unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("Failed to list workbooks"));
        assert!(msg.contains("Network timeout"));
    }

    #[test]
    fn test_io_error_with_context() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let result: std::result::Result<(), std::io::Error> = Err(io_error);
        let err = result
            .context("Failed to read configuration file 'tabops.toml'")
            .unwrap_err();

        assert!(matches!(err, TabopsError::Io(_)));
        assert!(err.to_string().contains("File not found"));
    }
}
