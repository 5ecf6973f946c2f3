mod models;
mod schema;
mod sqlite_inventory_store;

pub use models::*;
pub use schema::INVENTORY_VERSIONED_SCHEMAS;
pub use sqlite_inventory_store::SqliteInventoryStore;

use std::num::NonZeroUsize;

use anyhow::Result;

use crate::change_log::{ChangeLogEntry, ChangeLogFilter, ChangeType, RebinRun};

/// Parameters of one rebin pass.
#[derive(Clone, Debug)]
pub struct RebinRequest {
    pub trigger: String,
    pub capacity: NonZeroUsize,
    /// Compute and report everything, then roll the transaction back.
    pub dry_run: bool,
    pub notes: String,
}

impl RebinRequest {
    pub fn new(trigger: impl Into<String>, capacity: NonZeroUsize) -> Self {
        Self {
            trigger: trigger.into(),
            capacity,
            dry_run: false,
            notes: String::new(),
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// What a rebin pass changed.
#[derive(Clone, Debug)]
pub struct RebinOutcome {
    /// `None` for dry runs.
    pub run: Option<RebinRun>,
    pub records_total: usize,
    /// Logged entries; for dry runs the entries that would have been logged
    /// (with id 0).
    pub entries: Vec<ChangeLogEntry>,
    pub dry_run: bool,
}

impl RebinOutcome {
    pub fn added(&self) -> usize {
        self.count(ChangeType::Add)
    }

    pub fn moved(&self) -> usize {
        self.count(ChangeType::Move)
    }

    fn count(&self, change_type: ChangeType) -> usize {
        self.entries
            .iter()
            .filter(|e| e.change_type == change_type)
            .count()
    }
}

/// Records created by an insert, as placed by the rebin that followed.
#[derive(Clone, Debug)]
pub struct InsertOutcome {
    pub records: Vec<Record>,
    pub rebin: RebinOutcome,
}

/// Record store and change log store.
///
/// Every mutating operation runs in a single exclusive transaction: either
/// all of its record updates and log entries are committed or none are.
pub trait InventoryStore: Send + Sync {
    /// The key the next insert would receive. Informational only; inserts
    /// allocate keys inside their own transaction.
    fn peek_next_master_key(&self) -> Result<String>;

    fn get_record(&self, id: &str) -> Result<Option<Record>>;
    fn list_records(&self) -> Result<Vec<Record>>;
    fn count_records(&self) -> Result<usize>;

    /// Inserts the records under fresh master keys, then runs one rebin pass
    /// over the whole store with `request`.
    fn insert_and_rebin(
        &self,
        new_records: Vec<NewRecord>,
        request: &RebinRequest,
    ) -> Result<InsertOutcome>;

    /// Rewrites the descriptive fields of a record, leaving its placement
    /// for the next rebin.
    fn update_details(&self, id: &str, details: &NewRecord) -> Result<Record>;

    /// Recomputes every placement and logs each change.
    fn rebin_and_log(&self, request: &RebinRequest) -> Result<RebinOutcome>;

    /// Deletes a record and logs the deletion.
    fn delete_record(&self, id: &str, trigger: &str) -> Result<ChangeLogEntry>;

    // Change log
    fn list_change_log(&self, filter: &ChangeLogFilter) -> Result<Vec<ChangeLogEntry>>;
    fn mark_reviewed(&self, ids: &[i64]) -> Result<usize>;
    fn mark_all_reviewed(&self) -> Result<usize>;
    fn list_rebin_runs(&self, limit: usize) -> Result<Vec<RebinRun>>;
}
