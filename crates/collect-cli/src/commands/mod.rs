pub mod config;
pub mod show;
pub mod summary;

use std::path::Path;

use collect_core::config::Config;

/// Picks the audit file named on the command line, or the configured
/// `audit.log_file`, and fails if it does not exist.
pub(crate) fn resolve_audit_file<'a>(
    file: Option<&'a Path>,
    config: &'a Config,
) -> anyhow::Result<&'a Path> {
    let path = file.unwrap_or(config.audit.log_file.as_path());
    if !path.exists() {
        anyhow::bail!("No audit file found at {}", path.display());
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("explicit.csv");
        std::fs::write(&explicit, "").unwrap();

        let config = Config::default();
        assert_eq!(
            resolve_audit_file(Some(&explicit), &config).unwrap(),
            explicit.as_path()
        );
    }

    #[test]
    fn test_resolve_falls_back_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let configured = dir.path().join("audit.csv");
        std::fs::write(&configured, "").unwrap();

        let mut config = Config::default();
        config.audit.log_file = configured.clone();
        assert_eq!(
            resolve_audit_file(None, &config).unwrap(),
            configured.as_path()
        );

        config.audit.log_file = dir.path().join("gone.csv");
        let err = resolve_audit_file(None, &config).unwrap_err();
        assert!(err.to_string().contains("gone.csv"));
    }
}
