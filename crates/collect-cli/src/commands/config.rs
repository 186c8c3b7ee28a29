//! Config command - View and manage audit configuration
//!
//! Provides the `auditlog config` CLI command which:
//! 1. Shows the current configuration (YAML or JSON)
//! 2. Sets individual configuration values via dot-notation keys
//! 3. Validates the configuration file and reports errors

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use collect_core::config::Config;
use tracing::info;

use crate::output::{get_formatter, OutputFormat};

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "audit.location.enabled")
        key: String,
        /// New value
        value: String,
    },
    /// Validate configuration file
    Validate,
}

impl ConfigCommand {
    /// Execute the config command against the file at `config_path`
    pub async fn execute(&self, config_path: &Path, format: OutputFormat) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(config_path, format).await,
            ConfigCommand::Set { key, value } => {
                self.execute_set(config_path, key, value, format).await
            }
            ConfigCommand::Validate => self.execute_validate(config_path, format).await,
        }
    }

    async fn execute_show(&self, config_path: &Path, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let config = Config::load_or_default(config_path);

        info!(config_path = %config_path.display(), "Showing configuration");

        if format.is_json() {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            formatter.json(&json);
        } else {
            formatter.heading(&format!("Configuration ({})", config_path.display()));
            formatter.line("");

            let yaml = serde_yaml::to_string(&config)
                .context("Failed to serialize configuration to YAML")?;

            for line in yaml.lines() {
                formatter.line(line);
            }
        }

        Ok(())
    }

    async fn execute_set(
        &self,
        config_path: &Path,
        key: &str,
        value: &str,
        format: OutputFormat,
    ) -> Result<()> {
        let formatter = get_formatter(format);
        let mut config = Config::load_or_default(config_path);

        info!(key = %key, value = %value, "Setting configuration value");

        if let Err(e) = apply_config_value(&mut config, key, value) {
            if format.is_json() {
                let json = serde_json::json!({
                    "success": false,
                    "key": key,
                    "value": value,
                    "error": e.to_string(),
                });
                formatter.json(&json);
            } else {
                formatter.error(&format!("Failed to set '{}': {}", key, e));
                formatter.line("");
                formatter.line("Supported keys:");
                formatter.line("  audit.enabled                     - true|false");
                formatter.line("  audit.log_file                    - Audit file path");
                formatter.line("  audit.location.enabled            - true|false");
                formatter.line("  audit.location.min_interval_secs  - Seconds between fixes");
                formatter.line("  audit.location.max_age_secs       - Maximum fix age (seconds)");
                formatter.line("  logging.level                     - trace|debug|info|warn|error");
            }
            return Ok(());
        }

        let errors = config.validate();
        if !errors.is_empty() {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            if format.is_json() {
                let json = serde_json::json!({
                    "success": false,
                    "key": key,
                    "value": value,
                    "errors": error_msgs,
                });
                formatter.json(&json);
            } else {
                formatter.error(&format!(
                    "Invalid value for '{}': {}",
                    key,
                    error_msgs.join("; ")
                ));
            }
            return Ok(());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create configuration directory")?;
        }
        let yaml = serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
        std::fs::write(config_path, &yaml).context("Failed to write configuration file")?;

        if format.is_json() {
            let json = serde_json::json!({
                "success": true,
                "key": key,
                "value": value,
                "config_path": config_path.display().to_string(),
            });
            formatter.json(&json);
        } else {
            formatter.heading(&format!("Set {} = {}", key, value));
            formatter.line(&format!("Saved to {}", config_path.display()));
        }

        Ok(())
    }

    async fn execute_validate(&self, config_path: &Path, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);

        // Load explicitly so parse errors are reported instead of defaulted
        let config = match Config::load(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                let message = if config_path.exists() {
                    format!("Failed to parse configuration: {}", e)
                } else {
                    "Configuration file not found. Using defaults.".to_string()
                };
                if format.is_json() {
                    let json = serde_json::json!({
                        "valid": false,
                        "config_path": config_path.display().to_string(),
                        "errors": [message],
                    });
                    formatter.json(&json);
                } else {
                    formatter.error(&message);
                    formatter.line(&format!("File: {}", config_path.display()));
                }
                return Ok(());
            }
        };

        info!(config_path = %config_path.display(), "Validating configuration");

        let errors = config.validate();

        if format.is_json() {
            let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            let json = serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": config_path.display().to_string(),
                "errors": error_strings,
            });
            formatter.json(&json);
        } else if errors.is_empty() {
            formatter.heading("Configuration is valid");
            formatter.line(&format!("File: {}", config_path.display()));
        } else {
            formatter.error(&format!(
                "Configuration has {} error{}:",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ));
            formatter.line(&format!("File: {}", config_path.display()));
            formatter.line("");
            for error in &errors {
                formatter.line(&format!("  {} - {}", error.field, error.message));
            }
        }

        Ok(())
    }
}

/// Apply a dot-notation key/value pair to a Config struct
fn apply_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "audit.enabled" => {
            config.audit.enabled = value
                .parse::<bool>()
                .context("Expected true or false for audit.enabled")?;
        }
        "audit.log_file" => {
            config.audit.log_file = PathBuf::from(value);
        }
        "audit.location.enabled" => {
            config.audit.location.enabled = value
                .parse::<bool>()
                .context("Expected true or false for audit.location.enabled")?;
        }
        "audit.location.min_interval_secs" => {
            config.audit.location.min_interval_secs = value
                .parse::<u64>()
                .context("Expected a positive integer for audit.location.min_interval_secs")?;
        }
        "audit.location.max_age_secs" => {
            config.audit.location.max_age_secs = value
                .parse::<u64>()
                .context("Expected a positive integer for audit.location.max_age_secs")?;
        }
        "logging.level" => {
            config.logging.level = value.to_string();
        }
        _ => anyhow::bail!("Unknown configuration key: {}", key),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();
        apply_config_value(&mut config, "audit.location.enabled", "true").unwrap();
        apply_config_value(&mut config, "audit.location.min_interval_secs", "30").unwrap();
        apply_config_value(&mut config, "audit.location.max_age_secs", "300").unwrap();
        apply_config_value(&mut config, "audit.log_file", "/tmp/audit.csv").unwrap();
        apply_config_value(&mut config, "logging.level", "debug").unwrap();

        assert!(config.audit.location.enabled);
        assert_eq!(config.audit.location.min_interval_secs, 30);
        assert_eq!(config.audit.location.max_age_secs, 300);
        assert_eq!(config.audit.log_file, PathBuf::from("/tmp/audit.csv"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        let mut config = Config::default();
        assert!(apply_config_value(&mut config, "audit.enabled", "maybe").is_err());
        assert!(apply_config_value(&mut config, "audit.location.min_interval_secs", "-1").is_err());
        assert!(apply_config_value(&mut config, "sync.root", "/tmp").is_err());
        assert!(apply_config_value(&mut config, "audit.location.priority", "balanced").is_err());
    }

    #[tokio::test]
    async fn test_set_writes_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("collect").join("config.yaml");

        ConfigCommand::Set {
            key: "audit.location.enabled".into(),
            value: "true".into(),
        }
        .execute(&path, OutputFormat::Json)
        .await
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.audit.location.enabled);
    }

    #[tokio::test]
    async fn test_set_invalid_value_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        ConfigCommand::Set {
            key: "logging.level".into(),
            value: "loud".into(),
        }
        .execute(&path, OutputFormat::Json)
        .await
        .unwrap();

        assert!(!path.exists());
    }
}
