//! AuditEventLogger - per-session audit event collector
//!
//! Queues `AuditEvent`s as form entry proceeds, closes interval events when
//! the user leaves the current view, and hands finished events to an
//! `IAuditWriter`. Writer failures are logged via `tracing::warn!` but never
//! propagated: a broken audit file must not interrupt form entry.

use std::sync::Arc;

use chrono::Utc;
use collect_core::{
    config::AuditConfig,
    domain::{AuditEvent, AuditEventType, LocationFix},
    ports::IAuditWriter,
};

/// Collects audit events for one form-entry session.
pub struct AuditEventLogger {
    config: AuditConfig,
    writer: Arc<dyn IAuditWriter>,
    events: Vec<AuditEvent>,
    last_fix: Option<LocationFix>,
}

impl AuditEventLogger {
    /// Creates a logger that writes through `writer`.
    pub fn new(config: AuditConfig, writer: Arc<dyn IAuditWriter>) -> Self {
        Self {
            config,
            writer,
            events: Vec::new(),
            last_fix: None,
        }
    }

    /// Returns true if events are being recorded
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Number of events queued but not yet written
    pub fn pending_len(&self) -> usize {
        self.events.len()
    }

    /// Records a location reported by the device.
    ///
    /// The fix replaces the current one if at least `min_interval_secs` have
    /// passed since the current fix was taken, or if it is more accurate.
    pub fn set_location_fix(&mut self, fix: LocationFix) {
        let accept = match self.last_fix {
            None => true,
            Some(current) => {
                fix.time_ms.saturating_sub(current.time_ms)
                    >= self.config.location.min_interval_ms()
                    || fix.accuracy < current.accuracy
            }
        };
        if accept {
            self.last_fix = Some(fix);
        } else {
            tracing::trace!(time_ms = fix.time_ms, "Location fix arrived too soon, ignored");
        }
    }

    /// Records an event that starts now.
    pub async fn log_event_now(
        &mut self,
        event_type: AuditEventType,
        node: Option<&str>,
        write_immediately: bool,
    ) {
        let now = Utc::now().timestamp_millis();
        self.log_event(event_type, node, now, write_immediately).await;
    }

    /// Records an event that started at `now_ms`.
    ///
    /// Location events are dropped unless location tracking is enabled. An
    /// interval event is ignored while an open event of the same type exists
    /// for the same node.
    pub async fn log_event(
        &mut self,
        event_type: AuditEventType,
        node: Option<&str>,
        now_ms: i64,
        write_immediately: bool,
    ) {
        if !self.config.enabled {
            return;
        }
        if event_type.is_location_event() && !self.config.location.enabled {
            tracing::debug!(event = %event_type, "Location tracking disabled, dropping event");
            return;
        }
        if event_type.is_interval() && self.has_open_event(event_type, node) {
            tracing::trace!(event = %event_type, node = ?node, "Duplicate open event ignored");
            return;
        }

        let mut event = AuditEvent::new(now_ms, event_type, node);
        if self.config.location.enabled {
            self.attach_location(&mut event, now_ms);
        }
        self.events.push(event);

        if write_immediately {
            self.flush().await;
        }
    }

    /// Closes every open interval event at `now_ms` and writes the queue.
    pub async fn exit_view(&mut self, now_ms: i64) {
        for event in self
            .events
            .iter_mut()
            .filter(|e| e.is_interval_event_type() && e.end().is_none())
        {
            event.set_end(now_ms);
        }
        self.flush().await;
    }

    /// Writes all finished events, keeping open interval events queued.
    pub async fn flush(&mut self) {
        let (ready, open): (Vec<_>, Vec<_>) = self
            .events
            .drain(..)
            .partition(|e| !e.is_interval_event_type() || e.end().is_some());
        self.events = open;

        if ready.is_empty() {
            return;
        }

        match self.writer.write_events(&ready).await {
            Ok(()) => tracing::debug!(count = ready.len(), "Wrote audit events"),
            Err(e) => {
                tracing::warn!(error = %e, count = ready.len(), "Failed to write audit events")
            }
        }
    }

    fn has_open_event(&self, event_type: AuditEventType, node: Option<&str>) -> bool {
        self.events
            .iter()
            .any(|e| e.event_type() == event_type && e.node() == node && e.end().is_none())
    }

    fn attach_location(&self, event: &mut AuditEvent, now_ms: i64) {
        let max_age_ms = self.config.location.max_age_ms();
        match self.last_fix.filter(|fix| fix.is_fresh(now_ms, max_age_ms)) {
            Some(fix) => {
                let (latitude, longitude, accuracy) = fix.to_coordinates();
                event.set_location_coordinates(
                    Some(&latitude),
                    Some(&longitude),
                    Some(&accuracy),
                );
            }
            None => event.set_location_coordinates(None, None, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use collect_core::config::ConfigBuilder;

    /// In-memory mock writer that records written lines
    struct MockWriter {
        lines: Mutex<Vec<String>>,
    }

    impl MockWriter {
        fn new() -> Self {
            Self {
                lines: Mutex::new(Vec::new()),
            }
        }

        fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IAuditWriter for MockWriter {
        async fn write_events(&self, events: &[AuditEvent]) -> anyhow::Result<()> {
            let mut lines = self.lines.lock().unwrap();
            lines.extend(events.iter().map(AuditEvent::to_canonical_string));
            Ok(())
        }
    }

    fn config(location: bool) -> AuditConfig {
        ConfigBuilder::new()
            .location_enabled(location)
            .build()
            .audit
    }

    #[tokio::test]
    async fn test_point_event_written_immediately() {
        let writer = Arc::new(MockWriter::new());
        let mut logger = AuditEventLogger::new(config(false), writer.clone());

        logger
            .log_event(AuditEventType::FormStart, None, 1000, true)
            .await;

        assert_eq!(writer.lines(), vec!["form start,null,1000,"]);
        assert_eq!(logger.pending_len(), 0);
    }

    #[tokio::test]
    async fn test_interval_event_closed_on_exit_view() {
        let writer = Arc::new(MockWriter::new());
        let mut logger = AuditEventLogger::new(config(false), writer.clone());

        logger
            .log_event(AuditEventType::Question, Some("/data/q1"), 1000, false)
            .await;
        logger.flush().await;
        assert!(writer.lines().is_empty());
        assert_eq!(logger.pending_len(), 1);

        logger.exit_view(2500).await;
        assert_eq!(writer.lines(), vec!["question,/data/q1,1000,2500"]);
        assert_eq!(logger.pending_len(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_open_interval_event_ignored() {
        let writer = Arc::new(MockWriter::new());
        let mut logger = AuditEventLogger::new(config(false), writer.clone());

        logger
            .log_event(AuditEventType::Question, Some("/data/q1"), 1000, false)
            .await;
        logger
            .log_event(AuditEventType::Question, Some("/data/q1"), 1200, false)
            .await;
        logger
            .log_event(AuditEventType::Question, Some("/data/q2"), 1200, false)
            .await;

        assert_eq!(logger.pending_len(), 2);
        logger.exit_view(1500).await;
        assert_eq!(
            writer.lines(),
            vec!["question,/data/q1,1000,1500", "question,/data/q2,1200,1500"]
        );
    }

    #[tokio::test]
    async fn test_disabled_logger_records_nothing() {
        let writer = Arc::new(MockWriter::new());
        let cfg = ConfigBuilder::new().audit_enabled(false).build().audit;
        let mut logger = AuditEventLogger::new(cfg, writer.clone());
        assert!(!logger.is_enabled());

        logger
            .log_event(AuditEventType::FormSave, None, 1000, true)
            .await;

        assert!(writer.lines().is_empty());
        assert_eq!(logger.pending_len(), 0);
    }

    #[tokio::test]
    async fn test_location_events_require_tracking() {
        let writer = Arc::new(MockWriter::new());
        let mut logger = AuditEventLogger::new(config(false), writer.clone());

        logger
            .log_event(AuditEventType::LocationProvidersDisabled, None, 1000, true)
            .await;
        assert!(writer.lines().is_empty());

        let mut logger = AuditEventLogger::new(config(true), writer.clone());
        logger
            .log_event(AuditEventType::LocationProvidersDisabled, None, 1000, true)
            .await;
        assert_eq!(
            writer.lines(),
            vec!["location providers disabled,null,1000,,null,null,null"]
        );
    }

    #[tokio::test]
    async fn test_fresh_fix_attached() {
        let writer = Arc::new(MockWriter::new());
        let mut logger = AuditEventLogger::new(config(true), writer.clone());
        logger.set_location_fix(LocationFix::new(54.5, 18.25, 10.0, 1000).unwrap());

        logger
            .log_event(AuditEventType::FormStart, Some(""), 2000, true)
            .await;

        assert_eq!(writer.lines(), vec!["form start,,2000,,54.5,18.25,10"]);
    }

    #[tokio::test]
    async fn test_fixes_within_min_interval_are_throttled() {
        let writer = Arc::new(MockWriter::new());
        // default min interval is 60s
        let mut logger = AuditEventLogger::new(config(true), writer.clone());

        logger.set_location_fix(LocationFix::new(54.5, 18.25, 10.0, 1_000).unwrap());
        // too soon and less accurate
        logger.set_location_fix(LocationFix::new(1.0, 1.0, 20.0, 2_000).unwrap());
        logger
            .log_event(AuditEventType::FormSave, Some(""), 3_000, true)
            .await;

        // too soon but more accurate
        logger.set_location_fix(LocationFix::new(2.0, 2.0, 5.0, 3_500).unwrap());
        logger
            .log_event(AuditEventType::FormSave, Some(""), 4_000, true)
            .await;

        // interval elapsed, accepted despite lower accuracy
        logger.set_location_fix(LocationFix::new(3.0, 3.0, 50.0, 63_500).unwrap());
        logger
            .log_event(AuditEventType::FormSave, Some(""), 64_000, true)
            .await;

        assert_eq!(
            writer.lines(),
            vec![
                "form save,,3000,,54.5,18.25,10",
                "form save,,4000,,2,2,5",
                "form save,,64000,,3,3,50",
            ]
        );
    }

    #[tokio::test]
    async fn test_stale_fix_not_attached() {
        let writer = Arc::new(MockWriter::new());
        let mut logger = AuditEventLogger::new(config(true), writer.clone());
        logger.set_location_fix(LocationFix::new(54.5, 18.25, 10.0, 0).unwrap());

        // default max age is 120s
        logger
            .log_event(AuditEventType::FormSave, Some(""), 120_001, true)
            .await;

        assert_eq!(writer.lines(), vec!["form save,,120001,,null,null,null"]);
    }

    #[tokio::test]
    async fn test_flush_keeps_creation_order() {
        let writer = Arc::new(MockWriter::new());
        let mut logger = AuditEventLogger::new(config(false), writer.clone());

        logger
            .log_event(AuditEventType::FormResume, None, 100, false)
            .await;
        logger
            .log_event(AuditEventType::Hierarchy, None, 200, false)
            .await;
        logger
            .log_event(AuditEventType::DeleteRepeat, Some("/data/r[2]"), 300, false)
            .await;
        logger.exit_view(400).await;

        assert_eq!(
            writer.lines(),
            vec![
                "form resume,null,100,",
                "jump,null,200,400",
                "delete repeat,/data/r[2],300,",
            ]
        );
    }

    #[tokio::test]
    async fn test_write_failure_is_non_fatal() {
        struct FailingWriter;

        #[async_trait]
        impl IAuditWriter for FailingWriter {
            async fn write_events(&self, _: &[AuditEvent]) -> anyhow::Result<()> {
                anyhow::bail!("disk full")
            }
        }

        let mut logger = AuditEventLogger::new(config(false), Arc::new(FailingWriter));

        // This should NOT panic or return an error
        logger
            .log_event(AuditEventType::FormStart, None, 1000, true)
            .await;
        logger
            .log_event(AuditEventType::Question, Some("/data/q1"), 1000, false)
            .await;
        logger.exit_view(2000).await;
        assert_eq!(logger.pending_len(), 0);
    }
}
