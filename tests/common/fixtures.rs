#![allow(dead_code)]

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use vinyl_bins::binning::DEFAULT_BIN_CAPACITY;
use vinyl_bins::{InventoryManager, SqliteInventoryStore};

/// A file-backed inventory living in its own temporary directory.
pub struct TestInventory {
    pub temp_dir: TempDir,
    pub db_path: PathBuf,
    pub manager: InventoryManager,
}

impl TestInventory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BIN_CAPACITY.get())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("inventory.db");
        let manager = open_manager(&db_path, capacity);
        Self {
            temp_dir,
            db_path,
            manager,
        }
    }

    /// Opens a second manager on the same database file.
    pub fn reopen(&self) -> InventoryManager {
        open_manager(&self.db_path, self.manager.capacity().get())
    }

    pub fn csv(&self, name: &str, contents: &str) -> PathBuf {
        write_csv(self.temp_dir.path(), name, contents)
    }
}

fn open_manager(db_path: &Path, capacity: usize) -> InventoryManager {
    let store = SqliteInventoryStore::new(db_path).expect("Failed to open inventory store");
    let capacity = NonZeroUsize::new(capacity).expect("Capacity must be positive");
    InventoryManager::new(Arc::new(store), capacity)
}

pub fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("Failed to write CSV fixture");
    path
}

pub fn count_runs(manager: &InventoryManager) -> usize {
    manager.rebin_runs(1000).expect("Failed to list runs").len()
}
