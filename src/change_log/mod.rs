//! The audit trail of bin changes.

mod audit_logger;
mod models;

pub use audit_logger::{add_notes, delete_notes, move_notes, AuditLogger};
pub use models::*;

use anyhow::Result;

/// Append-only destination for change log entries.
pub trait ChangeLogSink {
    /// Persists `entry` and returns its assigned id.
    fn append_change(&self, entry: &ChangeLogEntry) -> Result<i64>;
}
