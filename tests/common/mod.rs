//! Common test infrastructure
//!
//! Integration tests build a file-backed inventory through [`TestInventory`]
//! and feed it CSV input written with [`write_csv`].

mod constants;
mod fixtures;

pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{count_runs, write_csv, TestInventory};
