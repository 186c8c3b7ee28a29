//! Summary statistics over an audit log

use serde::Serialize;

use collect_core::domain::AuditEvent;

/// Aggregate view of a set of audit events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    /// Number of events
    pub total_events: usize,
    /// Event count per label, in order of first appearance
    pub counts: Vec<(String, usize)>,
    /// Sum of closed interval event durations, in milliseconds
    pub interval_time_ms: i64,
    /// Interval events that were never closed
    pub open_intervals: usize,
    /// Earliest start timestamp
    pub first_start: Option<i64>,
    /// Latest end (or start, for events without an end) timestamp
    pub last_timestamp: Option<i64>,
}

impl AuditSummary {
    /// Builds a summary of `events`.
    pub fn from_events(events: &[AuditEvent]) -> Self {
        let mut summary = AuditSummary {
            total_events: events.len(),
            ..Default::default()
        };

        for event in events {
            let label = event.event_type().label();
            match summary.counts.iter_mut().find(|(l, _)| l == label) {
                Some((_, count)) => *count += 1,
                None => summary.counts.push((label.to_string(), 1)),
            }

            if event.is_interval_event_type() {
                match event.duration_ms() {
                    Some(duration) => {
                        summary.interval_time_ms =
                            summary.interval_time_ms.saturating_add(duration);
                    }
                    None => summary.open_intervals += 1,
                }
            }

            summary.first_start = Some(
                summary
                    .first_start
                    .map_or(event.start(), |s| s.min(event.start())),
            );
            let latest = event.end().unwrap_or(event.start());
            summary.last_timestamp =
                Some(summary.last_timestamp.map_or(latest, |t| t.max(latest)));
        }

        summary
    }

    /// Number of events with the given label
    pub fn count_of(&self, label: &str) -> usize {
        self.counts
            .iter()
            .find(|(l, _)| l == label)
            .map_or(0, |(_, count)| *count)
    }
}
