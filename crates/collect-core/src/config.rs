//! Configuration module for form-entry auditing.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audit: AuditConfig,
    pub logging: LoggingConfig,
}

/// Audit log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Whether audit events are recorded at all.
    pub enabled: bool,
    /// Path of the audit log file.
    pub log_file: PathBuf,
    pub location: LocationConfig,
}

/// Location tracking settings for audit events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Attach location coordinates to every recorded event.
    pub enabled: bool,
    /// A new fix replaces the current one only after this many seconds,
    /// unless it is more accurate.
    pub min_interval_secs: u64,
    /// Fixes older than this many seconds are not attached to events.
    pub max_age_secs: u64,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/collect/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("collect")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for AuditConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("collect");
        Self {
            enabled: true,
            log_file: data_dir.join("audit.csv"),
            location: LocationConfig::default(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_interval_secs: 60,
            max_age_secs: 120,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LocationConfig {
    /// Minimum spacing between accepted fixes in milliseconds.
    pub fn min_interval_ms(&self) -> i64 {
        i64::try_from(self.min_interval_secs.saturating_mul(1000)).unwrap_or(i64::MAX)
    }

    /// Maximum fix age in milliseconds.
    pub fn max_age_ms(&self) -> i64 {
        i64::try_from(self.max_age_secs.saturating_mul(1000)).unwrap_or(i64::MAX)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"audit.location.max_age_secs"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- audit ---
        if self.audit.log_file.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "audit.log_file".into(),
                message: "must not be empty".into(),
            });
        }

        let location = &self.audit.location;
        if location.min_interval_secs == 0 {
            errors.push(ValidationError {
                field: "audit.location.min_interval_secs".into(),
                message: "must be greater than 0".into(),
            });
        }
        if location.max_age_secs < location.min_interval_secs {
            errors.push(ValidationError {
                field: "audit.location.max_age_secs".into(),
                message: format!(
                    "max_age_secs ({}) must not be less than min_interval_secs ({})",
                    location.max_age_secs, location.min_interval_secs
                ),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use collect_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .audit_log_file(PathBuf::from("/tmp/audit.csv"))
///     .location_enabled(true)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- audit ---

    pub fn audit_enabled(mut self, enabled: bool) -> Self {
        self.config.audit.enabled = enabled;
        self
    }

    pub fn audit_log_file(mut self, file: PathBuf) -> Self {
        self.config.audit.log_file = file;
        self
    }

    pub fn location_enabled(mut self, enabled: bool) -> Self {
        self.config.audit.location.enabled = enabled;
        self
    }

    pub fn location_min_interval_secs(mut self, seconds: u64) -> Self {
        self.config.audit.location.min_interval_secs = seconds;
        self
    }

    pub fn location_max_age_secs(mut self, seconds: u64) -> Self {
        self.config.audit.location.max_age_secs = seconds;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
