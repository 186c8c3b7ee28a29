//! Port definitions (hexagonal architecture interfaces)
//!
//! - [`IAuditWriter`] - Persistent storage for serialized audit events

pub mod audit_writer;

pub use audit_writer::IAuditWriter;
