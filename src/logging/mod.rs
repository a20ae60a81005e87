//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - human-readable console output, always on
//! - JSON log files with daily/hourly rotation, when `logging.local_enabled`
//! - `RUST_LOG` overrides the configured level
//!
//! # Example
//!
//! ```no_run
//! use tabops::logging::init_logging;
//! use tabops::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(workbook = "Sales", "Starting export");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use tabops::log_error_with_context;
/// use tabops::domain::TabopsError;
///
/// let error = TabopsError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
