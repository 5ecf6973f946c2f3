//! Read-only views over current placements, for shelving and capacity
//! planning. Run a rebin first; these use the stored bin numbers as-is.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use serde::Serialize;

use super::packer::{group_key, PackingKey};
use crate::inventory_store::Record;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BinOccupancy {
    pub bin_number: i64,
    pub group_key: i64,
    pub count: usize,
    pub free_slots: usize,
    /// `"{artist} - {title}"` of the first record in packing order.
    pub first_item: String,
    pub last_item: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupHeadroom {
    pub group_key: i64,
    pub bins_used: usize,
    pub last_bin: i64,
    pub items_in_last_bin: usize,
    /// Records the last bin can still take before the group spills over.
    pub remaining: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OverrideCount {
    pub bin_code: String,
    pub count: usize,
}

fn item_label(record: &Record) -> String {
    format!("{} - {}", record.artist, record.title)
}

/// One row per numbered bin, in bin order.
pub fn bin_occupancy(records: &[Record], capacity: NonZeroUsize) -> Vec<BinOccupancy> {
    let mut bins: BTreeMap<i64, Vec<&Record>> = BTreeMap::new();
    for record in records {
        if let Some(bin_number) = record.bin_number {
            bins.entry(bin_number).or_default().push(record);
        }
    }

    bins.into_iter()
        .filter_map(|(bin_number, mut occupants)| {
            occupants.sort_by_cached_key(|r| PackingKey::of(r));
            let first = occupants.first()?;
            let last = occupants.last()?;
            Some(BinOccupancy {
                bin_number,
                group_key: group_key(first),
                count: occupants.len(),
                free_slots: capacity.get().saturating_sub(occupants.len()),
                first_item: item_label(first),
                last_item: item_label(last),
            })
        })
        .collect()
}

/// Per group, how full its last bin is.
pub fn group_headroom(records: &[Record], capacity: NonZeroUsize) -> Vec<GroupHeadroom> {
    let mut groups: BTreeMap<i64, BTreeMap<i64, usize>> = BTreeMap::new();
    for record in records {
        if let Some(bin_number) = record.bin_number {
            *groups
                .entry(group_key(record))
                .or_default()
                .entry(bin_number)
                .or_default() += 1;
        }
    }

    groups
        .into_iter()
        .filter_map(|(group, bins)| {
            let (&last_bin, &items_in_last_bin) = bins.iter().next_back()?;
            Some(GroupHeadroom {
                group_key: group,
                bins_used: bins.len(),
                last_bin,
                items_in_last_bin,
                remaining: capacity.get().saturating_sub(items_in_last_bin),
            })
        })
        .collect()
}

/// Number of records filed under each override code.
pub fn override_counts(records: &[Record]) -> Vec<OverrideCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        if record.bin_number.is_none() && !record.bin_code.is_empty() {
            *counts.entry(record.bin_code.as_str()).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(bin_code, count)| OverrideCount {
            bin_code: bin_code.to_string(),
            count,
        })
        .collect()
}
