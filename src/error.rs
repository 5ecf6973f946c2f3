use thiserror::Error;

/// Domain failures surfaced by the inventory core.
///
/// Store and manager code propagates these through `anyhow::Error`; callers
/// that need to branch on them can `downcast_ref::<InventoryError>()`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Malformed master key '{0}': expected one uppercase letter and 4 digits")]
    MalformedMasterKey(String),

    #[error("Master key space exhausted after {0}")]
    KeyspaceExhausted(String),

    #[error("Missing required columns: {missing:?} (found headers: {found:?})")]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },
}
