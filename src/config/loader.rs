//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::TabopsConfig;
use crate::domain::errors::TabopsError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into TabopsConfig
/// 4. Applies environment variable overrides (TABOPS_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`TabopsError::Configuration`] if the file cannot be read, does
/// not parse, references unset variables, or fails validation.
///
/// # Examples
///
/// ```no_run
/// use tabops::config::loader::load_config;
///
/// let config = load_config("tabops.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<TabopsConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(TabopsError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        TabopsError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: TabopsConfig = toml::from_str(&contents)
        .map_err(|e| TabopsError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        TabopsError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is a valid regex")
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(TabopsError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using TABOPS_* prefix
///
/// Environment variables follow the pattern: TABOPS_<SECTION>_<KEY>
/// For example: TABOPS_SERVER_TOKEN_SECRET, TABOPS_EXPORT_OUTPUT_ROOT
fn apply_env_overrides(config: &mut TabopsConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("TABOPS_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Server overrides
    if let Ok(val) = std::env::var("TABOPS_SERVER_BASE_URL") {
        config.server.base_url = val;
    }
    if let Ok(val) = std::env::var("TABOPS_SERVER_SITE") {
        config.server.site = val;
    }
    if let Ok(val) = std::env::var("TABOPS_SERVER_API_VERSION") {
        config.server.api_version = val;
    }
    if let Ok(val) = std::env::var("TABOPS_SERVER_TOKEN_NAME") {
        config.server.token_name = val;
    }
    if let Ok(val) = std::env::var("TABOPS_SERVER_TOKEN_SECRET") {
        config.server.token_secret = super::secret_string(val);
    }
    if let Ok(val) = std::env::var("TABOPS_SERVER_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.server.timeout_seconds = timeout;
        }
    }
    if let Ok(val) = std::env::var("TABOPS_SERVER_PAGE_SIZE") {
        if let Ok(size) = val.parse() {
            config.server.page_size = size;
        }
    }

    // Export overrides
    if let Ok(val) = std::env::var("TABOPS_EXPORT_OUTPUT_ROOT") {
        config.export.output_root = val;
    }
    if let Ok(val) = std::env::var("TABOPS_EXPORT_SCRATCH_ROOT") {
        config.export.scratch_root = val;
    }
    if let Ok(val) = std::env::var("TABOPS_EXPORT_DESCRIPTOR_DIR") {
        config.export.descriptor_dir = val;
    }
    if let Ok(val) = std::env::var("TABOPS_EXPORT_IMAGE_MAX_AGE_MINUTES") {
        if let Ok(age) = val.parse() {
            config.export.image_max_age_minutes = age;
        }
    }

    // Users overrides
    if let Ok(val) = std::env::var("TABOPS_USERS_INACTIVE_THRESHOLD_DAYS") {
        if let Ok(days) = val.parse() {
            config.users.inactive_threshold_days = days;
        }
    }
    if let Ok(val) = std::env::var("TABOPS_USERS_REPORT_PATH") {
        config.users.report_path = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("TABOPS_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("TABOPS_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
