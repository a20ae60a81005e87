//! Domain error types
//!
//! This module defines the error hierarchy for tabops.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main tabops error type
///
/// This is the primary error type used throughout the library. Every stage of
/// the export pipeline, the permission replicator and the user cleanup report
/// failures through it.
#[derive(Debug, Error)]
pub enum TabopsError {
    /// Bad or missing configuration (connection file or export descriptor)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Lookup matched nothing (workbook resolution)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Lookup matched more than one candidate (workbook resolution)
    #[error("Ambiguous match: {0}")]
    Ambiguous(String),

    /// Any failure reported by the BI server, authentication included
    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    /// Image decoding, tiling or document layout failure
    #[error("Render error: {0}")]
    Render(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Local filesystem errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl TabopsError {
    /// Whether the error stems from configuration rather than runtime state
    pub fn is_configuration(&self) -> bool {
        matches!(self, TabopsError::Configuration(_))
    }
}

/// BI server errors
///
/// Errors that occur when talking to the Tableau REST API.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to reach the server
    #[error("Failed to connect to server: {0}")]
    ConnectionFailed(String),

    /// Sign-in rejected or session no longer valid
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// An operation needing a session was attempted before sign-in
    #[error("Not signed in")]
    NotSignedIn,

    /// Requested resource does not exist on the server
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Invalid response from server
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerFailure { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientFailure { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for TabopsError {
    fn from(err: std::io::Error) -> Self {
        TabopsError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for TabopsError {
    fn from(err: serde_json::Error) -> Self {
        TabopsError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for TabopsError {
    fn from(err: toml::de::Error) -> Self {
        TabopsError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<image::ImageError> for TabopsError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(io) => TabopsError::Io(io.to_string()),
            other => TabopsError::Render(other.to_string()),
        }
    }
}

impl From<printpdf::Error> for TabopsError {
    fn from(err: printpdf::Error) -> Self {
        TabopsError::Render(format!("PDF generation failed: {err}"))
    }
}

impl From<zip::result::ZipError> for TabopsError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io) => TabopsError::Io(io.to_string()),
            other => TabopsError::Render(format!("Slide deck packaging failed: {other}")),
        }
    }
}

impl From<csv::Error> for TabopsError {
    fn from(err: csv::Error) -> Self {
        TabopsError::Io(format!("CSV write failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabops_error_display() {
        let err = TabopsError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_server_error_conversion() {
        let server_err = ServerError::ConnectionFailed("Network error".to_string());
        let err: TabopsError = server_err.into();
        assert!(matches!(err, TabopsError::Server(_)));
        assert!(err.to_string().contains("Network error"));
    }

    #[test]
    fn test_server_failure_display() {
        let err = ServerError::ServerFailure {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "Server error: 503 - maintenance");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: TabopsError = io_err.into();
        assert!(matches!(err, TabopsError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: TabopsError = json_err.into();
        assert!(matches!(err, TabopsError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: TabopsError = toml_err.into();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_image_error_conversion() {
        let image_err = image::load_from_memory(b"definitely not a png").unwrap_err();
        let err: TabopsError = image_err.into();
        assert!(matches!(err, TabopsError::Render(_)));
    }

    #[test]
    fn test_tabops_error_implements_std_error() {
        let err = TabopsError::Render("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
