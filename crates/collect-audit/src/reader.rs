//! Audit file reader
//!
//! Loads an audit CSV file back into `AuditEvent`s for inspection.

use std::path::Path;

use anyhow::{Context, Result};
use collect_core::domain::AuditEvent;

/// Reads and parses the audit file at `path`.
pub async fn read_audit_log(path: &Path) -> Result<Vec<AuditEvent>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read audit file {}", path.display()))?;
    parse_audit_log(&content)
}

/// Parses audit file content.
///
/// The header row and blank lines are skipped. The first malformed line
/// aborts parsing with its 1-based line number.
pub fn parse_audit_log(content: &str) -> Result<Vec<AuditEvent>> {
    let mut events = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() || is_header(line) {
            continue;
        }
        let event = AuditEvent::parse_line(line)
            .with_context(|| format!("Invalid audit entry on line {}", index + 1))?;
        events.push(event);
    }
    Ok(events)
}

fn is_header(line: &str) -> bool {
    line.split(',').next() == Some("event")
}
