//! Integration tests for logging functionality
//!
//! The global subscriber can only be installed once per process, so this
//! binary initializes it exactly once.

use tabops::config::LoggingConfig;
use tabops::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_path, "logs");
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_invalid_level_is_rejected_before_install() {
    let err = init_logging("verbose", &LoggingConfig::default()).err().unwrap();
    assert!(err.is_configuration());
}

#[test]
fn test_file_logging_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    let guard = init_logging("debug", &config).unwrap();
    tracing::info!(workbook = "Sales", "Logging smoke test");
    drop(guard);

    assert!(log_path.is_dir());
    let files: Vec<_> = std::fs::read_dir(&log_path).unwrap().collect();
    assert!(!files.is_empty());
}
