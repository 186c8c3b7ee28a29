//! Append-only audit file adapter
//!
//! Implements `IAuditWriter` over a CSV file. The header row is written when
//! the file is first created (or found empty); every event is then appended
//! as its canonical line.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use collect_core::{config::AuditConfig, domain::AuditEvent, ports::IAuditWriter};
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};

/// Header row for audit files without location columns.
pub const HEADER: &str = "event,node,start,end";

/// Header row for audit files that carry location columns.
pub const HEADER_WITH_LOCATION: &str = "event,node,start,end,latitude,longitude,accuracy";

/// Writes audit events to a CSV file on disk.
pub struct CsvAuditWriter {
    path: PathBuf,
    include_location: bool,
    // Serializes appends so concurrent flushes don't interleave lines.
    lock: Mutex<()>,
}

impl CsvAuditWriter {
    /// Creates a writer for `path`; `include_location` selects the header.
    pub fn new(path: impl Into<PathBuf>, include_location: bool) -> Self {
        Self {
            path: path.into(),
            include_location,
            lock: Mutex::new(()),
        }
    }

    /// Creates a writer for the configured audit file, with location columns
    /// when location tracking is enabled.
    pub fn from_config(config: &AuditConfig) -> Self {
        Self::new(config.log_file.clone(), config.location.enabled)
    }

    /// Returns the audit file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn header(&self) -> &'static str {
        if self.include_location {
            HEADER_WITH_LOCATION
        } else {
            HEADER
        }
    }
}

#[async_trait]
impl IAuditWriter for CsvAuditWriter {
    async fn write_events(&self, events: &[AuditEvent]) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open audit file {}", self.path.display()))?;

        let is_empty = file.metadata().await?.len() == 0;

        let mut buf = String::new();
        if is_empty {
            buf.push_str(self.header());
            buf.push('\n');
        }
        for event in events {
            buf.push_str(&event.to_canonical_string());
            buf.push('\n');
        }

        file.write_all(buf.as_bytes())
            .await
            .context("Failed to append audit events")?;
        file.flush().await?;

        tracing::debug!(
            path = %self.path.display(),
            count = events.len(),
            "Appended audit events"
        );
        Ok(())
    }
}
