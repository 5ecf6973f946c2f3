//! Before/after comparison of bin placements.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use super::rebin::rebin;
use crate::change_log::ChangeType;
use crate::inventory_store::Record;

/// Where a record sits: bin number (0 when absent) and bin code.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Placement {
    pub bin: i64,
    pub bin_code: String,
}

impl Placement {
    pub fn of(record: &Record) -> Self {
        Self {
            bin: record.bin_or_zero(),
            bin_code: record.bin_code.clone(),
        }
    }

    /// True when the record has never been placed anywhere.
    pub fn is_unplaced(&self) -> bool {
        self.bin == 0 && self.bin_code.is_empty()
    }
}

/// A record whose placement changed during a rebin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinChange {
    /// Either [`ChangeType::Add`] or [`ChangeType::Move`].
    pub change_type: ChangeType,
    pub record_id: String,
    pub artist: String,
    pub title: String,
    pub year: Option<i32>,
    pub old: Placement,
    pub new: Placement,
}

/// Placements captured before a rebin, keyed by record id.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    placements: HashMap<String, Placement>,
}

impl Snapshot {
    pub fn capture(records: &[Record]) -> Self {
        Self {
            placements: records
                .iter()
                .map(|record| (record.id.clone(), Placement::of(record)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Changes between the snapshot and `records`, in `records` order.
    ///
    /// A record missing from the snapshot counts as previously unplaced.
    pub fn diff(&self, records: &[Record]) -> Vec<BinChange> {
        records
            .iter()
            .filter_map(|record| {
                let old = self.placements.get(&record.id).cloned().unwrap_or_default();
                let new = Placement::of(record);
                if old == new {
                    return None;
                }
                let change_type = if old.is_unplaced() {
                    ChangeType::Add
                } else {
                    ChangeType::Move
                };
                Some(BinChange {
                    change_type,
                    record_id: record.id.clone(),
                    artist: record.artist.clone(),
                    title: record.title.clone(),
                    year: record.year,
                    old,
                    new,
                })
            })
            .collect()
    }
}

/// Snapshot, rebin in place, and return what moved.
pub fn rebin_and_diff(records: &mut [Record], capacity: NonZeroUsize) -> Vec<BinChange> {
    let snapshot = Snapshot::capture(records);
    rebin(records, capacity);
    snapshot.diff(records)
}
