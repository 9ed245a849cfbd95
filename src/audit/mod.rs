//! Audit logging for pocketledger
//!
//! Every create, update and delete of a transaction or category is appended to
//! a line-delimited JSON log (`audit.log`) with before/after snapshots. Import
//! commits are recorded as one batch entry in addition to the per-row creates.

mod entry;
mod logger;

pub use entry::{field_changes, AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
