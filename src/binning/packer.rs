//! Capacity-bounded bin packing.
//!
//! Normal-flow records are sorted into a fixed order and poured into
//! numbered bins. A change of group (genre for standard LPs, media type
//! otherwise) always opens a new bin, so groups never share a bin even when
//! the previous one has room left.

use std::num::NonZeroUsize;

use super::classifier::override_code;
use super::naming::sortable_name;
use crate::inventory_store::{Record, STANDARD_MEDIA_TYPE};

pub const DEFAULT_BIN_CAPACITY: NonZeroUsize = match NonZeroUsize::new(55) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

/// The value whose change forces a new bin.
pub fn group_key(record: &Record) -> i64 {
    let media_type = record.media_type_code.unwrap_or(STANDARD_MEDIA_TYPE);
    if media_type == STANDARD_MEDIA_TYPE {
        record.genre_code.unwrap_or(0)
    } else {
        media_type
    }
}

/// Total packing order: group, sortable artist, title, year, id.
///
/// Artist and title compare case-insensitively; the id keeps the order total.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct PackingKey {
    group: i64,
    artist: String,
    title: String,
    year: Option<i32>,
    id: String,
}

impl PackingKey {
    pub(crate) fn of(record: &Record) -> Self {
        Self {
            group: group_key(record),
            artist: sortable_name(&record.artist).to_lowercase(),
            title: record.title.trim().to_lowercase(),
            year: record.year,
            id: record.id.clone(),
        }
    }
}

/// Assigns `bin_number` to every record in place.
///
/// Override-routed records get no bin number and their override code as
/// `bin_code`. Normal-routed records get a bin number only; composing their
/// `bin_code` is left to the normalization pass.
pub fn pack(records: &mut [Record], capacity: NonZeroUsize) {
    let mut normal = Vec::with_capacity(records.len());
    for (index, record) in records.iter_mut().enumerate() {
        match override_code(record.media_type_code) {
            Some(code) => {
                record.bin_number = None;
                record.bin_code = code.to_string();
            }
            None => normal.push((PackingKey::of(record), index)),
        }
    }
    normal.sort();

    let mut bin = 0i64;
    let mut occupancy = 0usize;
    let mut previous_group = None;
    for (key, index) in normal {
        let opens_bin = match previous_group {
            None => true,
            Some(group) if group != key.group => true,
            Some(_) => occupancy >= capacity.get(),
        };
        if opens_bin {
            bin += 1;
            occupancy = 0;
        }
        records[index].bin_number = Some(bin);
        occupancy += 1;
        previous_group = Some(key.group);
    }
}
