//! Entry point used by the command line and the integration tests.
//!
//! The manager owns no state beyond the store and the bin capacity; each
//! operation is one store call (one transaction), except editing, which
//! commits the new details before running its rebin.

use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::binning::report::{BinOccupancy, GroupHeadroom, OverrideCount};
use crate::binning::{bin_occupancy, group_headroom, override_counts};
use crate::change_log::{ChangeLogEntry, ChangeLogFilter, RebinRun};
use crate::error::InventoryError;
use crate::import::{prepare_rows, read_rows_from_path, ImportRow, ImportStats};
use crate::inventory_store::{
    InsertOutcome, InventoryStore, NewRecord, RebinOutcome, RebinRequest, Record, RecordEdit,
};

#[derive(Clone, Debug, Default)]
pub struct ImportOptions {
    pub trigger: String,
    /// Only the first N data rows are considered.
    pub limit: Option<usize>,
    pub dry_run: bool,
}

impl ImportOptions {
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug)]
pub struct ImportOutcome {
    pub stats: ImportStats,
    /// Created records, as placed by the rebin that followed the insert.
    pub records: Vec<Record>,
    /// `None` when no row survived preparation and nothing was written.
    pub rebin: Option<RebinOutcome>,
}

#[derive(Clone, Debug, Serialize)]
pub struct InventoryReport {
    pub records_total: usize,
    pub occupancy: Vec<BinOccupancy>,
    pub headroom: Vec<GroupHeadroom>,
    pub overrides: Vec<OverrideCount>,
}

pub struct InventoryManager {
    store: Arc<dyn InventoryStore>,
    capacity: NonZeroUsize,
}

impl InventoryManager {
    pub fn new(store: Arc<dyn InventoryStore>, capacity: NonZeroUsize) -> Self {
        Self { store, capacity }
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    fn request(&self, trigger: &str, dry_run: bool) -> RebinRequest {
        RebinRequest::new(trigger, self.capacity).dry_run(dry_run)
    }

    pub fn next_master_key(&self) -> Result<String> {
        self.store.peek_next_master_key()
    }

    pub fn get_record(&self, id: &str) -> Result<Option<Record>> {
        self.store.get_record(id)
    }

    pub fn list_records(&self) -> Result<Vec<Record>> {
        self.store.list_records()
    }

    pub fn import_file(&self, path: &Path, options: &ImportOptions) -> Result<ImportOutcome> {
        info!("Importing records from {:?}", path);
        let rows = read_rows_from_path(path, options.limit)?;
        self.import_rows(&rows, options)
    }

    /// Inserts every valid row, then places the whole batch with one rebin.
    pub fn import_rows(&self, rows: &[ImportRow], options: &ImportOptions) -> Result<ImportOutcome> {
        let rows = match options.limit {
            Some(limit) if limit < rows.len() => &rows[..limit],
            _ => rows,
        };
        let (new_records, stats) = prepare_rows(rows);
        if stats.skipped > 0 {
            warn!("Skipped {} of {} rows with blank artist or title", stats.skipped, stats.rows_seen);
        }

        if new_records.is_empty() {
            info!("Nothing to import ({} rows seen)", stats.rows_seen);
            return Ok(ImportOutcome {
                stats,
                records: Vec::new(),
                rebin: None,
            });
        }

        let InsertOutcome { records, rebin } = self
            .store
            .insert_and_rebin(new_records, &self.request(&options.trigger, options.dry_run))?;

        info!(
            "Import {}: {} rows seen, {} imported, {} skipped",
            if options.dry_run { "simulated" } else { "complete" },
            stats.rows_seen,
            stats.imported,
            stats.skipped
        );
        Ok(ImportOutcome {
            stats,
            records,
            rebin: Some(rebin),
        })
    }

    pub fn add_record(&self, record: NewRecord, trigger: &str, dry_run: bool) -> Result<InsertOutcome> {
        let record = NewRecord {
            artist: record.artist.trim().to_string(),
            title: record.title.trim().to_string(),
            ..record
        };
        if record.artist.is_empty() || record.title.is_empty() {
            bail!("A record needs both an artist and a title");
        }
        self.store
            .insert_and_rebin(vec![record], &self.request(trigger, dry_run))
    }

    /// Replaces the descriptive fields of a record and rebins.
    pub fn edit_record(&self, id: &str, details: NewRecord, trigger: &str) -> Result<RebinOutcome> {
        if details.artist.trim().is_empty() || details.title.trim().is_empty() {
            bail!("A record needs both an artist and a title");
        }
        self.store.update_details(id, &details)?;
        self.rebin(trigger, false)
    }

    /// Applies a partial edit; fields left out keep their stored values.
    pub fn edit_record_fields(&self, id: &str, edit: &RecordEdit, trigger: &str) -> Result<RebinOutcome> {
        let current = self
            .store
            .get_record(id)?
            .ok_or_else(|| InventoryError::RecordNotFound(id.to_string()))?;
        self.edit_record(id, edit.apply(&current), trigger)
    }

    pub fn rebin(&self, trigger: &str, dry_run: bool) -> Result<RebinOutcome> {
        self.store.rebin_and_log(&self.request(trigger, dry_run))
    }

    pub fn delete_record(&self, id: &str, trigger: &str) -> Result<ChangeLogEntry> {
        self.store.delete_record(id, trigger)
    }

    pub fn change_log(&self, filter: &ChangeLogFilter) -> Result<Vec<ChangeLogEntry>> {
        self.store.list_change_log(filter)
    }

    pub fn mark_reviewed(&self, ids: &[i64]) -> Result<usize> {
        let updated = self.store.mark_reviewed(ids)?;
        info!("Marked {} change log entries as reviewed", updated);
        Ok(updated)
    }

    pub fn mark_all_reviewed(&self) -> Result<usize> {
        let updated = self.store.mark_all_reviewed()?;
        info!("Marked {} change log entries as reviewed", updated);
        Ok(updated)
    }

    pub fn rebin_runs(&self, limit: usize) -> Result<Vec<RebinRun>> {
        self.store.list_rebin_runs(limit)
    }

    pub fn report(&self) -> Result<InventoryReport> {
        let records = self.store.list_records()?;
        Ok(InventoryReport {
            records_total: records.len(),
            occupancy: bin_occupancy(&records, self.capacity),
            headroom: group_headroom(&records, self.capacity),
            overrides: override_counts(&records),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::DEFAULT_BIN_CAPACITY;
    use crate::change_log::ChangeType;
    use crate::inventory_store::SqliteInventoryStore;

    fn manager() -> InventoryManager {
        InventoryManager::new(
            Arc::new(SqliteInventoryStore::in_memory().unwrap()),
            DEFAULT_BIN_CAPACITY,
        )
    }

    fn row(artist: &str, title: &str, genre: &str) -> ImportRow {
        ImportRow {
            artist: Some(artist.to_string()),
            title: Some(title.to_string()),
            genre: Some(genre.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn import_rows_skips_blank_rows() {
        let manager = manager();
        let rows = vec![row("Queen", "Jazz", "5"), row("", "Nameless", "5")];

        let outcome = manager.import_rows(&rows, &ImportOptions::new("importer")).unwrap();

        assert_eq!(outcome.stats.imported, 1);
        assert_eq!(outcome.stats.skipped, 1);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.rebin.unwrap().added(), 1);
    }

    #[test]
    fn import_rows_honours_limit() {
        let manager = manager();
        let rows = vec![row("Queen", "Jazz", "5"), row("The Who", "Tommy", "5")];
        let options = ImportOptions {
            limit: Some(1),
            ..ImportOptions::new("importer")
        };

        let outcome = manager.import_rows(&rows, &options).unwrap();

        assert_eq!(outcome.stats.rows_seen, 1);
        assert_eq!(manager.list_records().unwrap().len(), 1);
    }

    #[test]
    fn import_of_only_blank_rows_writes_nothing() {
        let manager = manager();
        let outcome = manager
            .import_rows(&[row(" ", "x", "1")], &ImportOptions::new("importer"))
            .unwrap();

        assert!(outcome.rebin.is_none());
        assert!(manager.rebin_runs(10).unwrap().is_empty());
    }

    #[test]
    fn add_requires_artist_and_title() {
        let manager = manager();
        assert!(manager
            .add_record(NewRecord::new("  ", "Jazz"), "desk", false)
            .is_err());
        assert_eq!(manager.next_master_key().unwrap(), "A1111");
    }

    #[test]
    fn add_trims_and_places() {
        let manager = manager();
        let outcome = manager
            .add_record(NewRecord::new(" Queen ", "Jazz ").with_genre(5), "desk", false)
            .unwrap();

        assert_eq!(outcome.records[0].artist, "Queen");
        assert_eq!(outcome.records[0].bin_code, "05-01-Q");
        assert_eq!(outcome.rebin.entries[0].trigger, "desk");
    }

    #[test]
    fn edit_rebins_with_trigger() {
        let manager = manager();
        manager
            .add_record(NewRecord::new("Queen", "Jazz").with_genre(5), "desk", false)
            .unwrap();

        let outcome = manager
            .edit_record("A1111", NewRecord::new("Queen", "Jazz").with_genre(7), "editor")
            .unwrap();

        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.entries[0].change_type, ChangeType::Move);
        assert_eq!(outcome.entries[0].new_bin_code, "07-01-Q");
        assert_eq!(outcome.entries[0].trigger, "editor");
    }

    #[test]
    fn partial_edit_keeps_unspecified_fields() {
        let manager = manager();
        manager
            .add_record(
                NewRecord::new("Queen", "Jazz")
                    .with_genre(5)
                    .with_year(1978)
                    .with_media_type(12)
                    .with_special(true),
                "desk",
                false,
            )
            .unwrap();

        let edit = RecordEdit {
            title: Some("Jazz (Remastered)".to_string()),
            ..RecordEdit::default()
        };
        let outcome = manager.edit_record_fields("A1111", &edit, "editor").unwrap();

        assert!(outcome.entries.is_empty());
        let record = manager.get_record("A1111").unwrap().unwrap();
        assert_eq!(record.title, "Jazz (Remastered)");
        assert_eq!(record.artist, "Queen");
        assert_eq!(record.genre_code, Some(5));
        assert_eq!(record.year, Some(1978));
        assert_eq!(record.media_type_code, Some(12));
        assert!(record.special);
        assert_eq!(record.bin_code, "05-01-Q");
    }

    #[test]
    fn partial_edit_of_unknown_record_fails() {
        let manager = manager();
        let err = manager
            .edit_record_fields("Z0001", &RecordEdit::default(), "editor")
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<InventoryError>(),
            Some(&InventoryError::RecordNotFound("Z0001".to_string()))
        );
    }

    #[test]
    fn report_covers_both_routes() {
        let manager = manager();
        manager
            .add_record(NewRecord::new("Queen", "Jazz").with_genre(5), "desk", false)
            .unwrap();
        manager
            .add_record(NewRecord::new("Queen", "Greatest Hits").with_media_type(21), "desk", false)
            .unwrap();

        let report = manager.report().unwrap();

        assert_eq!(report.records_total, 2);
        assert_eq!(report.occupancy.len(), 1);
        assert_eq!(report.occupancy[0].free_slots, DEFAULT_BIN_CAPACITY.get() - 1);
        assert_eq!(report.overrides.len(), 1);
        assert_eq!(report.overrides[0].bin_code, "SC");
    }
}
