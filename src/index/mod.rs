//! Index Module
//!
//! In-memory mapping from key to its current value and log offset.
//!
//! ## Responsibilities
//! - O(1) point lookups for `get`
//! - Remember the offset of the record backing each key, so an overwrite can
//!   tombstone it
//! - Reject keys that could not be replayed from the log
//!
//! ## Locking
//! The index has no lock of its own. The owning `Table` guards it together
//! with the log file behind a single `RwLock`.

mod map;

pub use map::Index;

use bytes::Bytes;

use crate::error::{Result, TableError};
use crate::logfile::{SEPARATOR, TOMBSTONE};

/// Entry stored in the Index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// The live value
    pub value: Bytes,

    /// Offset of the log record that holds this value
    pub offset: u64,
}

impl IndexEntry {
    pub fn new(value: Bytes, offset: u64) -> Self {
        Self { value, offset }
    }
}

/// Check that a key can round-trip through the log format.
///
/// A key must be non-empty (the tombstone byte would otherwise land on the
/// separator), must not contain the separator, and must not start with the
/// tombstone byte.
pub fn validate_key(key: &[u8]) -> Result<()> {
    match key.first() {
        None => Err(TableError::InvalidKey("key is empty".to_string())),
        Some(&TOMBSTONE) => Err(TableError::InvalidKey(format!(
            "key starts with reserved byte {:#04x}",
            TOMBSTONE
        ))),
        Some(_) if key.contains(&SEPARATOR) => Err(TableError::InvalidKey(format!(
            "key contains separator byte {:#04x}",
            SEPARATOR
        ))),
        Some(_) => Ok(()),
    }
}
