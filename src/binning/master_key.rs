//! Master key allocation.
//!
//! Keys are one uppercase letter followed by a 4 digit suffix. New keys are
//! derived from the current maximum: the suffix is incremented, and when it
//! passes 9999 the letter advances and the suffix restarts at 1111.

use crate::error::InventoryError;

pub const FIRST_MASTER_KEY: &str = "A1111";

const SUFFIX_START: u32 = 1111;
const SUFFIX_MAX: u32 = 9999;

/// Derives the key that follows `current_max`, or [`FIRST_MASTER_KEY`] when
/// there are no records yet.
pub fn next_master_key(current_max: Option<&str>) -> Result<String, InventoryError> {
    let current_max = match current_max.map(str::trim) {
        None | Some("") => return Ok(FIRST_MASTER_KEY.to_string()),
        Some(key) => key,
    };

    let (prefix, suffix) = split_master_key(current_max)?;
    let (prefix, suffix) = if suffix + 1 > SUFFIX_MAX {
        if prefix == 'Z' {
            return Err(InventoryError::KeyspaceExhausted(current_max.to_string()));
        }
        ((prefix as u8 + 1) as char, SUFFIX_START)
    } else {
        (prefix, suffix + 1)
    };

    Ok(format!("{}{:04}", prefix, suffix))
}

fn split_master_key(key: &str) -> Result<(char, u32), InventoryError> {
    let malformed = || InventoryError::MalformedMasterKey(key.to_string());

    let mut chars = key.chars();
    let prefix = chars.next().filter(char::is_ascii_uppercase).ok_or_else(malformed)?;
    let digits = chars.as_str();
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let suffix = digits.parse::<u32>().map_err(|_| malformed())?;
    Ok((prefix, suffix))
}

/// Hands out consecutive master keys for a batch of inserts.
///
/// Must be seeded from the maximum key read inside the same exclusive
/// section that performs the inserts, or two writers can derive the same key.
#[derive(Debug, Clone)]
pub struct MasterKeyAllocator {
    last: Option<String>,
}

impl MasterKeyAllocator {
    pub fn starting_after(current_max: Option<String>) -> Self {
        Self { last: current_max }
    }

    pub fn allocate(&mut self) -> Result<String, InventoryError> {
        let key = next_master_key(self.last.as_deref())?;
        self.last = Some(key.clone());
        Ok(key)
    }
}
