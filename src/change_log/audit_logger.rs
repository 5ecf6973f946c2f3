//! Turns bin changes and deletions into change log entries.

use anyhow::Result;

use super::models::{ChangeLogEntry, ChangeType};
use super::ChangeLogSink;
use crate::binning::BinChange;
use crate::inventory_store::Record;

pub fn add_notes(new_bin: i64, new_bin_code: &str) -> String {
    format!("Add to Bin {} ({}).", new_bin, new_bin_code)
}

pub fn move_notes(old_bin: i64, old_bin_code: &str, new_bin: i64, new_bin_code: &str) -> String {
    format!(
        "Move from Bin {} ({}) to Bin {} ({}).",
        old_bin, old_bin_code, new_bin, new_bin_code
    )
}

pub fn delete_notes(old_bin: i64, old_bin_code: &str) -> String {
    format!("Remove from Bin {} ({}).", old_bin, old_bin_code)
}

/// Writes entries for one trigger into a [`ChangeLogSink`].
///
/// Every entry is created with `reviewed = false`.
pub struct AuditLogger<'a, S: ChangeLogSink + ?Sized> {
    sink: &'a S,
    trigger: &'a str,
}

impl<'a, S: ChangeLogSink + ?Sized> AuditLogger<'a, S> {
    pub fn new(sink: &'a S, trigger: &'a str) -> Self {
        Self { sink, trigger }
    }

    /// Builds the ADD or MOVE entry for a diffed change without writing it.
    pub fn entry_for_change(&self, change: &BinChange, run_id: Option<&str>) -> ChangeLogEntry {
        let notes = match change.change_type {
            ChangeType::Add => add_notes(change.new.bin, &change.new.bin_code),
            _ => move_notes(
                change.old.bin,
                &change.old.bin_code,
                change.new.bin,
                &change.new.bin_code,
            ),
        };
        let entry = ChangeLogEntry::new(change.change_type, &change.record_id, self.trigger)
            .with_record_details(&change.artist, &change.title, change.year)
            .with_old_bin(change.old.bin, &change.old.bin_code)
            .with_new_bin(change.new.bin, &change.new.bin_code)
            .with_notes(notes);
        match run_id {
            Some(run_id) => entry.with_run(run_id),
            None => entry,
        }
    }

    /// Logs one entry per change, in order.
    pub fn log_changes(
        &self,
        changes: &[BinChange],
        run_id: Option<&str>,
    ) -> Result<Vec<ChangeLogEntry>> {
        changes
            .iter()
            .map(|change| self.write(self.entry_for_change(change, run_id)))
            .collect()
    }

    /// Logs a deletion. The record is gone, so only what the caller
    /// remembers about its placement is recorded.
    pub fn log_delete(
        &self,
        record_id: &str,
        old_bin: i64,
        old_bin_code: &str,
    ) -> Result<ChangeLogEntry> {
        self.write(Self::delete_entry(record_id, self.trigger, old_bin, old_bin_code))
    }

    /// Logs the deletion of `record`, keeping its artist, title and year.
    pub fn log_record_deleted(&self, record: &Record) -> Result<ChangeLogEntry> {
        let entry = Self::delete_entry(&record.id, self.trigger, record.bin_or_zero(), &record.bin_code)
            .with_record_details(&record.artist, &record.title, record.year);
        self.write(entry)
    }

    fn delete_entry(record_id: &str, trigger: &str, old_bin: i64, old_bin_code: &str) -> ChangeLogEntry {
        ChangeLogEntry::new(ChangeType::Delete, record_id, trigger)
            .with_old_bin(old_bin, old_bin_code)
            .with_notes(delete_notes(old_bin, old_bin_code))
    }

    fn write(&self, mut entry: ChangeLogEntry) -> Result<ChangeLogEntry> {
        entry.id = self.sink.append_change(&entry)?;
        Ok(entry)
    }
}
