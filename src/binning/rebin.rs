use std::num::NonZeroUsize;

use super::naming::alpha_bucket;
use super::packer::pack;
use crate::inventory_store::Record;

/// `"{genre:02}-{bin:02}-{bucket}"`, with a missing genre written as `00`.
pub fn compose_bin_code(genre_code: Option<i64>, bin_number: i64, sort_bucket: Option<char>) -> String {
    format!(
        "{:02}-{:02}-{}",
        genre_code.unwrap_or(0),
        bin_number,
        sort_bucket.map(String::from).unwrap_or_default()
    )
}

/// Recomputes the fields derived from artist and bin number.
///
/// Records without a bin number keep their `bin_code` untouched, which is
/// how override codes survive this pass.
pub fn normalize_derived(records: &mut [Record]) {
    for record in records.iter_mut() {
        if !record.artist.is_empty() {
            record.sort_bucket = alpha_bucket(&record.artist);
        }
        if let Some(bin_number) = record.bin_number {
            record.bin_code = compose_bin_code(record.genre_code, bin_number, record.sort_bucket);
        }
    }
}

/// Full recomputation of every placement. Running it again on its own
/// output changes nothing.
pub fn rebin(records: &mut [Record], capacity: NonZeroUsize) {
    normalize_derived(records);
    pack(records, capacity);
    normalize_derived(records);
}
