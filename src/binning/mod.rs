//! Classification, packing and diffing of bin placements.
//!
//! Everything here is a pure function over an in-memory set of records; the
//! store is responsible for loading them, holding the exclusive section and
//! writing the results back.

pub mod classifier;
pub mod diff;
pub mod master_key;
pub mod naming;
pub mod packer;
pub mod rebin;
pub mod report;

pub use classifier::{override_code, OVERRIDE_CODES};
pub use diff::{rebin_and_diff, BinChange, Placement, Snapshot};
pub use master_key::{next_master_key, MasterKeyAllocator, FIRST_MASTER_KEY};
pub use naming::{alpha_bucket, sortable_name};
pub use packer::{group_key, pack, DEFAULT_BIN_CAPACITY};
pub use rebin::{compose_bin_code, normalize_derived, rebin};
pub use report::{bin_occupancy, group_headroom, override_counts};
