//! Collect Audit - Audit trail recording and inspection
//!
//! Provides:
//! - `AuditEventLogger`: Per-session service that queues and closes audit events
//! - `CsvAuditWriter`: Append-only audit file adapter for `IAuditWriter`
//! - `read_audit_log` / `parse_audit_log`: Load audit files back into events
//! - `AuditSummary`: Aggregate statistics over a set of events

pub mod logger;
pub mod reader;
pub mod summary;
pub mod writer;

pub use logger::AuditEventLogger;
pub use reader::{parse_audit_log, read_audit_log};
pub use summary::AuditSummary;
pub use writer::CsvAuditWriter;
