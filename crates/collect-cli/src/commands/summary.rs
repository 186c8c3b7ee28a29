//! Summary command - Aggregate statistics for an audit file
//!
//! Provides the `auditlog summary` CLI command which reports event counts,
//! time spent in interval events, and interval events never closed.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use collect_audit::{read_audit_log, AuditSummary};
use collect_core::config::Config;
use tracing::info;

use super::resolve_audit_file;
use crate::output::{get_formatter, OutputFormat};

/// Summary command arguments
#[derive(Debug, Args)]
pub struct SummaryCommand {
    /// Audit file to summarise (defaults to `audit.log_file` from the config)
    pub file: Option<PathBuf>,
}

impl SummaryCommand {
    /// Execute the summary command
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let file = resolve_audit_file(self.file.as_deref(), config)?;

        let events = read_audit_log(file).await?;
        let summary = AuditSummary::from_events(&events);
        info!(total = summary.total_events, "Summarised audit file");

        if format.is_json() {
            let mut json = serde_json::to_value(&summary)?;
            json["file"] = serde_json::Value::String(file.display().to_string());
            formatter.json(&json);
            return Ok(());
        }

        formatter.heading(&format!(
            "{} ({} events)",
            file.display(),
            summary.total_events
        ));
        if let (Some(first), Some(last)) = (summary.first_start, summary.last_timestamp) {
            formatter.line(&format!("Span: {} → {}", format_ms(first), format_ms(last)));
        }
        formatter.line(&format!(
            "Time in questions and jumps: {:.1}s",
            summary.interval_time_ms as f64 / 1000.0
        ));
        if summary.open_intervals > 0 {
            formatter.warn(&format!(
                "{} interval event{} never closed",
                summary.open_intervals,
                if summary.open_intervals == 1 { "" } else { "s" }
            ));
        }

        formatter.line("");
        for (label, count) in &summary.counts {
            formatter.line(&format!("  {:<36} {:>6}", label, count));
        }

        Ok(())
    }
}

fn format_ms(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| millis.to_string())
}
