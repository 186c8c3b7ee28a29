//! Show command - List events in an audit file
//!
//! Provides the `auditlog show` CLI command which:
//! 1. Reads and parses an audit CSV file
//! 2. Filters events by label, node prefix and start time
//! 3. Prints a table with start time, event, node, duration and location

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::Args;
use collect_audit::read_audit_log;
use collect_core::{
    config::Config,
    domain::{AuditEvent, AuditEventType},
};
use tracing::info;

use super::resolve_audit_file;
use crate::output::{get_formatter, OutputFormat};

/// Show command with filter arguments
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Audit file to read (defaults to `audit.log_file` from the config)
    pub file: Option<PathBuf>,

    /// Only show events with this label (e.g., "question", "jump", "form save")
    #[arg(long)]
    pub event: Option<String>,

    /// Only show events whose node starts with this prefix
    #[arg(long)]
    pub node: Option<String>,

    /// Only show events started since this time (e.g., "1h", "2d", "2024-01-01")
    #[arg(long)]
    pub since: Option<String>,

    /// Maximum number of events to show
    #[arg(long, default_value = "200")]
    pub limit: usize,
}

impl ShowCommand {
    /// Execute the show command
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let file = resolve_audit_file(self.file.as_deref(), config)?;

        let since = match &self.since {
            Some(since_str) => {
                let parsed = parse_since(since_str).context(format!(
                    "Invalid --since value: '{}'. Expected formats: '1h', '30m', '2d', '1w', '2024-01-01', '2024-01-01T12:00:00'",
                    since_str
                ))?;
                info!(since = %parsed, "Filtering audit events since");
                Some(parsed.timestamp_millis())
            }
            None => None,
        };

        if let Some(label) = &self.event {
            if AuditEventType::from_label(label) == AuditEventType::Unknown
                && label != AuditEventType::Unknown.label()
            {
                formatter.warn(&format!("'{}' is not a known event label", label));
            }
        }

        let events = read_audit_log(file).await?;
        info!(count = events.len(), file = %file.display(), "Loaded audit events");

        let display_events: Vec<&AuditEvent> = events
            .iter()
            .filter(|event| self.matches(event, since))
            .take(self.limit)
            .collect();

        if format.is_json() {
            let events_json: Vec<serde_json::Value> = display_events
                .iter()
                .map(|event| {
                    serde_json::json!({
                        "event": event.event_type().label(),
                        "node": event.node(),
                        "start": event.start(),
                        "end": event.end(),
                        "duration_ms": event.duration_ms(),
                        "location": event.location(),
                    })
                })
                .collect();

            let json = serde_json::json!({
                "file": file.display().to_string(),
                "limit": self.limit,
                "count": display_events.len(),
                "events": events_json,
            });
            formatter.json(&json);
            return Ok(());
        }

        if display_events.is_empty() {
            formatter.line("No audit events found for the specified criteria.");
            return Ok(());
        }

        formatter.heading(&format!("Audit Log ({} events)", display_events.len()));
        formatter.line("");
        formatter.line("  Start                   Event                    Duration  Node");
        formatter.line("  ----------------------- ------------------------ --------- ----");

        for event in &display_events {
            let duration = event
                .duration_ms()
                .map(format_duration)
                .unwrap_or_default();
            let mut line = format!(
                "  {:<23} {:<24} {:>9} {}",
                format_timestamp(event.start()),
                truncate_string(event.event_type().label(), 24),
                duration,
                event.node().unwrap_or("-"),
            );
            if let Some(location) = event.location() {
                line.push_str(&format!(
                    " @ {},{} ±{}",
                    location.latitude.as_deref().unwrap_or("?"),
                    location.longitude.as_deref().unwrap_or("?"),
                    location.accuracy.as_deref().unwrap_or("?"),
                ));
            }
            formatter.line(&line);
        }

        if display_events.len() >= self.limit {
            formatter.line("");
            formatter.line(&format!(
                "Showing {} events (limit). Use --limit to show more.",
                self.limit
            ));
        }

        Ok(())
    }

    fn matches(&self, event: &AuditEvent, since_ms: Option<i64>) -> bool {
        if let Some(label) = &self.event {
            if event.event_type().label() != label {
                return false;
            }
        }
        if let Some(prefix) = &self.node {
            if !event.node().is_some_and(|n| n.starts_with(prefix.as_str())) {
                return false;
            }
        }
        if let Some(since) = since_ms {
            if event.start() < since {
                return false;
            }
        }
        true
    }
}

/// Parse the --since argument into a DateTime<Utc>
///
/// Supports:
/// - Relative: "1h" (1 hour ago), "30m" (30 minutes), "2d" (2 days), "1w" (1 week)
/// - Absolute date: "2024-01-01"
/// - Absolute datetime: "2024-01-01T12:00:00"
fn parse_since(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Some(duration) = parse_relative_duration(input) {
        return Ok(Utc::now() - duration);
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let datetime = date
            .and_hms_opt(0, 0, 0)
            .context("Failed to create datetime from date")?;
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(datetime, Utc));
    }

    if let Ok(datetime) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S") {
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(datetime, Utc));
    }

    anyhow::bail!(
        "Could not parse '{}' as a time. Use relative (1h, 30m, 2d, 1w) or absolute (2024-01-01) format.",
        input
    )
}

/// Parse relative duration strings like "1h", "30m", "2d", "1w"
fn parse_relative_duration(input: &str) -> Option<chrono::Duration> {
    if input.len() < 2 {
        return None;
    }

    let (num_str, unit) = input.split_at(input.len() - 1);
    let num: i64 = num_str.parse().ok()?;

    match unit {
        "m" => Some(chrono::Duration::minutes(num)),
        "h" => Some(chrono::Duration::hours(num)),
        "d" => Some(chrono::Duration::days(num)),
        "w" => Some(chrono::Duration::weeks(num)),
        _ => None,
    }
}

/// Render epoch milliseconds as a UTC timestamp, or the raw value if out of range
fn format_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// Render a duration in milliseconds as seconds with one decimal
fn format_duration(millis: i64) -> String {
    format!("{:.1}s", millis as f64 / 1000.0)
}

/// Truncate a string to a maximum length
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> ShowCommand {
        ShowCommand {
            file: Some(PathBuf::from("audit.csv")),
            event: None,
            node: None,
            since: None,
            limit: 200,
        }
    }

    #[tokio::test]
    async fn test_execute_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = ShowCommand {
            file: Some(dir.path().join("missing.csv")),
            ..command()
        };

        let err = cmd
            .execute(&Config::default(), OutputFormat::Json)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No audit file found"));
    }

    #[tokio::test]
    async fn test_execute_reads_configured_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.csv");
        std::fs::write(&path, "event,node,start,end\nform start,,1000,\n").unwrap();

        let mut config = Config::default();
        config.audit.log_file = path;
        let cmd = ShowCommand {
            file: None,
            ..command()
        };

        cmd.execute(&config, OutputFormat::Json).await.unwrap();
    }

    #[test]
    fn test_parse_relative_duration() {
        assert_eq!(
            parse_relative_duration("30m").unwrap(),
            chrono::Duration::minutes(30)
        );
        assert_eq!(
            parse_relative_duration("2d").unwrap(),
            chrono::Duration::days(2)
        );
        assert!(parse_relative_duration("abc").is_none());
        assert!(parse_relative_duration("1x").is_none());
        assert!(parse_relative_duration("h").is_none());
    }

    #[test]
    fn test_parse_since_date() {
        let parsed = parse_since("2018-12-21").unwrap();
        assert_eq!(parsed.format("%Y-%m-%d").to_string(), "2018-12-21");
    }

    #[test]
    fn test_parse_since_invalid() {
        assert!(parse_since("not-a-time").is_err());
        assert!(parse_since("").is_err());
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(1545392727685), "2018-12-21 11:45:27.685");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(842), "0.8s");
        assert_eq!(format_duration(12_000), "12.0s");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("jump", 10), "jump");
        assert_eq!(
            truncate_string("google play services not available", 24),
            "google play services ..."
        );
    }

    #[test]
    fn test_matches_filters() {
        let event = AuditEvent::new(1000, AuditEventType::Question, Some("/data/group/q1"));

        assert!(command().matches(&event, None));

        let cmd = ShowCommand {
            event: Some("question".into()),
            node: Some("/data/group".into()),
            ..command()
        };
        assert!(cmd.matches(&event, Some(1000)));
        assert!(!cmd.matches(&event, Some(1001)));

        let cmd = ShowCommand {
            event: Some("jump".into()),
            ..command()
        };
        assert!(!cmd.matches(&event, None));

        let cmd = ShowCommand {
            node: Some("/data/other".into()),
            ..command()
        };
        assert!(!cmd.matches(&event, None));
    }
}
