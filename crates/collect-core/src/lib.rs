//! Collect Core - Domain types for form-entry audit logs
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `AuditEvent`, `AuditEventType`, `LocationFix`
//! - **Port definitions** - `IAuditWriter`, implemented by storage adapters
//! - **Configuration** - YAML-backed settings for auditing and logging
//!
//! # Architecture
//!
//! The domain module is pure: it formats and parses audit log lines but
//! performs no I/O. Ports define trait interfaces that adapter crates implement.

pub mod config;
pub mod domain;
pub mod ports;
