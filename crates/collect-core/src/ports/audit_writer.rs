//! Audit writer port (driven/secondary port)
//!
//! Defines where serialized audit events go. The file-backed adapter lives
//! in `collect-audit`; tests use in-memory implementations.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage failures are adapter-specific.
//! - Events arrive in the order they were created and must be stored in
//!   that order.

use crate::domain::audit::AuditEvent;

/// Port trait for appending audit events to an audit log
#[async_trait::async_trait]
pub trait IAuditWriter: Send + Sync {
    /// Appends `events` to the log, in order
    async fn write_events(&self, events: &[AuditEvent]) -> anyhow::Result<()>;
}
