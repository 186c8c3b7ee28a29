//! Domain entities
//!
//! This module contains the core domain types for form-entry auditing:
//! - Audit events and their canonical line encoding
//! - Location fixes used to annotate events
//! - Domain-specific error types

pub mod audit;
pub mod errors;
pub mod location;

// Re-export commonly used types
pub use audit::{AuditEvent, AuditEventType, LocationCoordinates};
pub use errors::DomainError;
pub use location::LocationFix;
