//! Configuration schema types
//!
//! This module defines the connection/runtime configuration that maps to the
//! `tabops.toml` file. The per-workbook export descriptor is a separate JSON
//! file, see [`crate::domain::ExportConfig`].

use crate::config::SecretString;
use crate::core::deck::{Orientation, PageType};
use serde::{Deserialize, Serialize};

/// Main tabops configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabopsConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// BI server connection
    pub server: ServerConfig,

    /// Deck export settings
    #[serde(default)]
    pub export: ExportSettings,

    /// Permission replication settings
    #[serde(default)]
    pub permissions: PermissionsConfig,

    /// Inactive viewer cleanup settings
    #[serde(default)]
    pub users: UsersConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TabopsConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.server.validate()?;
        self.export.validate()?;
        self.permissions.validate()?;
        self.users.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Tableau server connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server URL, e.g. `https://prod-useast-b.online.tableau.com`
    pub base_url: String,

    /// Site content URL used at sign-in (empty for the default site)
    #[serde(default)]
    pub site: String,

    /// REST API version
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Personal access token name
    pub token_name: String,

    /// Personal access token secret
    /// Stored securely in memory and automatically zeroized on drop
    pub token_secret: SecretString,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Page size for paginated listings
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl ServerConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.base_url.is_empty() {
            return Err("server.base_url cannot be empty".to_string());
        }

        let url = url::Url::parse(&self.base_url)
            .map_err(|e| format!("server.base_url is not a valid URL: {e}"))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err("server.base_url must start with http:// or https://".to_string());
        }

        if self.api_version.trim().is_empty() {
            return Err("server.api_version cannot be empty".to_string());
        }

        if self.token_name.trim().is_empty() {
            return Err("server.token_name cannot be empty".to_string());
        }

        if self.token_secret.expose_secret().is_blank() {
            return Err("server.token_secret cannot be empty".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("server.timeout_seconds must be > 0".to_string());
        }

        if !(1..=1000).contains(&self.page_size) {
            return Err(format!(
                "server.page_size must be between 1 and 1000, got {}",
                self.page_size
            ));
        }

        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            site: String::new(),
            api_version: default_api_version(),
            token_name: String::new(),
            token_secret: crate::config::secret_string(String::new()),
            timeout_seconds: default_timeout_seconds(),
            page_size: default_page_size(),
        }
    }
}

/// Deck export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Root under which `pdf/` and `ppt/` output folders are created
    #[serde(default = "default_output_root")]
    pub output_root: String,

    /// Root of the per-run scratch directories
    #[serde(default = "default_scratch_root")]
    pub scratch_root: String,

    /// Folder searched for export descriptors given as relative paths
    #[serde(default = "default_descriptor_dir")]
    pub descriptor_dir: String,

    /// Accept cached renders up to this many minutes old
    #[serde(default = "default_image_max_age_minutes")]
    pub image_max_age_minutes: u32,

    /// PDF page type when `--page_type` is not given
    #[serde(default = "default_page_type")]
    pub default_page_type: String,

    /// PDF orientation when `--orientation` is not given
    #[serde(default = "default_orientation")]
    pub default_orientation: String,

    /// PDF margin on every side, in millimetres
    #[serde(default = "default_pdf_margin_mm")]
    pub pdf_margin_mm: f64,

    /// Continue title text on a new page when it crosses the bottom margin
    #[serde(default = "default_true")]
    pub auto_page_break: bool,

    /// Resolution used to convert image pixels to physical size
    #[serde(default = "default_image_dpi")]
    pub image_dpi: f64,
}

impl ExportSettings {
    fn validate(&self) -> Result<(), String> {
        if self.output_root.trim().is_empty() {
            return Err("export.output_root cannot be empty".to_string());
        }
        if self.scratch_root.trim().is_empty() {
            return Err("export.scratch_root cannot be empty".to_string());
        }
        self.default_page_type.parse::<PageType>()?;
        self.default_orientation.parse::<Orientation>()?;
        if !(0.0..=100.0).contains(&self.pdf_margin_mm) {
            return Err(format!(
                "export.pdf_margin_mm must be between 0 and 100, got {}",
                self.pdf_margin_mm
            ));
        }
        if self.image_dpi <= 0.0 {
            return Err(format!(
                "export.image_dpi must be > 0, got {}",
                self.image_dpi
            ));
        }
        Ok(())
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            scratch_root: default_scratch_root(),
            descriptor_dir: default_descriptor_dir(),
            image_max_age_minutes: default_image_max_age_minutes(),
            default_page_type: default_page_type(),
            default_orientation: default_orientation(),
            pdf_margin_mm: default_pdf_margin_mm(),
            auto_page_break: true,
            image_dpi: default_image_dpi(),
        }
    }
}

/// Prod-to-dev permission replication settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionsConfig {
    /// Lowercase prefix marking production groups
    #[serde(default = "default_prod_prefix")]
    pub prod_prefix: String,

    /// Replacement for the prod prefix in the matching dev group name
    #[serde(default = "default_dev_prefix")]
    pub dev_prefix: String,
}

impl PermissionsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.prod_prefix.is_empty() {
            return Err("permissions.prod_prefix cannot be empty".to_string());
        }
        if self.prod_prefix.to_lowercase() == self.dev_prefix.to_lowercase() {
            return Err("permissions.prod_prefix and dev_prefix must differ".to_string());
        }
        Ok(())
    }
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            prod_prefix: default_prod_prefix(),
            dev_prefix: default_dev_prefix(),
        }
    }
}

/// Inactive viewer cleanup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersConfig {
    /// Users whose last login is more than this many days ago are inactive
    #[serde(default = "default_inactive_threshold_days")]
    pub inactive_threshold_days: i64,

    /// Only users with this site role are considered
    #[serde(default = "default_target_site_role")]
    pub target_site_role: String,

    /// Site role assigned on deactivation
    #[serde(default = "default_deactivated_site_role")]
    pub deactivated_site_role: String,

    /// Group whose minimum site role is lifted during the cleanup
    #[serde(default = "default_minimum_role_group")]
    pub minimum_role_group: String,

    /// Minimum site role restored on that group afterwards
    #[serde(default = "default_target_site_role")]
    pub restored_minimum_site_role: String,

    /// CSV report of the selected users
    #[serde(default = "default_report_path")]
    pub report_path: String,
}

impl UsersConfig {
    fn validate(&self) -> Result<(), String> {
        if self.inactive_threshold_days < 0 {
            return Err(format!(
                "users.inactive_threshold_days must be >= 0, got {}",
                self.inactive_threshold_days
            ));
        }
        if self.target_site_role.trim().is_empty() {
            return Err("users.target_site_role cannot be empty".to_string());
        }
        if self.deactivated_site_role.trim().is_empty() {
            return Err("users.deactivated_site_role cannot be empty".to_string());
        }
        if self.report_path.trim().is_empty() {
            return Err("users.report_path cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            inactive_threshold_days: default_inactive_threshold_days(),
            target_site_role: default_target_site_role(),
            deactivated_site_role: default_deactivated_site_role(),
            minimum_role_group: default_minimum_role_group(),
            restored_minimum_site_role: default_target_site_role(),
            report_path: default_report_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_api_version() -> String {
    "3.22".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_page_size() -> u32 {
    100
}

fn default_output_root() -> String {
    ".".to_string()
}

fn default_scratch_root() -> String {
    "img".to_string()
}

fn default_descriptor_dir() -> String {
    "config".to_string()
}

fn default_image_max_age_minutes() -> u32 {
    1
}

fn default_page_type() -> String {
    "A4".to_string()
}

fn default_orientation() -> String {
    "landscape".to_string()
}

fn default_pdf_margin_mm() -> f64 {
    15.0
}

fn default_image_dpi() -> f64 {
    96.0
}

fn default_prod_prefix() -> String {
    "prod".to_string()
}

fn default_dev_prefix() -> String {
    "dev".to_string()
}

fn default_inactive_threshold_days() -> i64 {
    500
}

fn default_target_site_role() -> String {
    "Viewer".to_string()
}

fn default_deactivated_site_role() -> String {
    "Unlicensed".to_string()
}

fn default_minimum_role_group() -> String {
    "All Users".to_string()
}

fn default_report_path() -> String {
    "users_info.csv".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
