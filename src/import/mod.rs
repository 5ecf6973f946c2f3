//! Bulk import of records from tabular input.
//!
//! Reading and preparing rows never touches the store. The caller inserts
//! the prepared batch and runs a single rebin over it, so placements and
//! ADD entries come from the diff alone.

mod reader;
mod row;

pub use reader::{read_rows, read_rows_from_path, ColumnMap};
pub use row::{media_type_or_standard, parse_int, parse_special, prepare_rows, ImportRow, ImportStats};
