//! Error types for logtable
//!
//! Provides a unified error type for all table operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using TableError
pub type Result<T> = std::result::Result<T, TableError>;

/// Unified error type for logtable operations
#[derive(Debug, Error)]
pub enum TableError {
    // -------------------------------------------------------------------------
    // Startup Errors
    // -------------------------------------------------------------------------
    /// Renaming, creating or opening a log file failed while the table was
    /// being established. The partially constructed table is never returned.
    #[error("failed to open log {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // -------------------------------------------------------------------------
    // Recovery Errors
    // -------------------------------------------------------------------------
    /// A record could not be decoded during replay. `offset` is the start of
    /// the record in the file being replayed.
    #[error("log corruption at offset {offset}: {reason}")]
    Corruption { offset: u64, reason: String },

    // -------------------------------------------------------------------------
    // Usage Errors
    // -------------------------------------------------------------------------
    #[error("table not open")]
    NotOpen,

    #[error("invalid key: {0}")]
    InvalidKey(String),
}

impl TableError {
    /// Wrap an I/O error with the path it concerns
    pub(crate) fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TableError::Open {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corruption(offset: u64, reason: impl Into<String>) -> Self {
        TableError::Corruption {
            offset,
            reason: reason.into(),
        }
    }

    /// True if a mutating call was made after `close`
    pub fn is_not_open(&self) -> bool {
        matches!(self, TableError::NotOpen)
    }

    /// True if recovery stopped on a malformed record
    pub fn is_corruption(&self) -> bool {
        matches!(self, TableError::Corruption { .. })
    }
}
