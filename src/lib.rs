//! Vinyl Bins Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod binning;
pub mod change_log;
pub mod config;
pub mod error;
pub mod import;
pub mod inventory_manager;
pub mod inventory_store;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use error::InventoryError;
pub use inventory_manager::{ImportOptions, ImportOutcome, InventoryManager, InventoryReport};
pub use inventory_store::{InventoryStore, NewRecord, Record, SqliteInventoryStore};
