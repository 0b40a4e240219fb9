//! Table Module
//!
//! The key/value table that coordinates the index and the log file.
//!
//! ## Responsibilities
//! - Run log recovery on open
//! - Persist every mutation before it becomes visible in the index
//! - Tombstone superseded records on overwrite
//! - Serve reads from memory

use std::path::Path;

use bytes::Bytes;
use parking_lot::RwLock;

use crate::config::Config;
use crate::error::{Result, TableError};
use crate::index::{validate_key, Index, IndexEntry};
use crate::logfile::{LogRecovery, LogWriter, RecoveryStats};

/// Offset recorded for entries of an in-memory table
const MEMORY_OFFSET: u64 = 0;

/// A persistent, concurrent, memory-resident key/value table
///
/// ## Concurrency Model
///
/// One `RwLock` guards both the index and the log file:
/// - **Reads** (`get`, `len`): shared lock, served from memory
/// - **Writes** (`put`, `close`): exclusive lock, held across the append,
///   the index update and the tombstone write
///
/// All I/O is blocking. Only one `Table` may own a given log path at a time;
/// opening the same path twice is not detected and will corrupt the log.
///
/// ## Compaction
///
/// An overwrite leaves the old record in the log, marked with a tombstone.
/// Space is reclaimed only when the table is reopened, which rewrites the
/// log with live records only.
pub struct Table {
    /// Table configuration
    config: Config,

    /// Index and log, behind one lock
    state: RwLock<TableState>,

    /// Stats from the recovery run at open (persistent tables only)
    recovery: Option<RecoveryStats>,
}

struct TableState {
    index: Index,
    backing: Backing,
}

/// Where mutations are persisted
enum Backing {
    /// No log file; persistence always succeeds
    Memory,

    /// Log file open for appends
    Open(LogWriter),

    /// Log file closed; mutations fail
    Closed,
}

impl Backing {
    fn append(&mut self, key: &[u8], value: &[u8]) -> Result<u64> {
        match self {
            Backing::Memory => Ok(MEMORY_OFFSET),
            Backing::Open(writer) => writer.append(key, value),
            Backing::Closed => Err(TableError::NotOpen),
        }
    }

    fn mark_tombstone(&mut self, offset: u64) -> Result<()> {
        match self {
            Backing::Memory => Ok(()),
            Backing::Open(writer) => writer.mark_tombstone(offset),
            Backing::Closed => Err(TableError::NotOpen),
        }
    }
}

impl Table {
    /// Open a table backed by the log at `path`.
    ///
    /// An empty path creates an in-memory table. Otherwise an existing log
    /// is replayed and compacted before the table is returned.
    /// `initial_capacity` pre-sizes the index.
    pub fn open(path: impl AsRef<Path>, initial_capacity: usize) -> Result<Self> {
        let config = Config::builder()
            .path(path.as_ref())
            .initial_capacity(initial_capacity)
            .build();
        Self::open_with_config(config)
    }

    /// Create a table that never touches the filesystem
    pub fn in_memory(initial_capacity: usize) -> Self {
        Self {
            config: Config::builder()
                .in_memory()
                .initial_capacity(initial_capacity)
                .build(),
            state: RwLock::new(TableState {
                index: Index::with_capacity(initial_capacity),
                backing: Backing::Memory,
            }),
            recovery: None,
        }
    }

    /// Open a table with the given config
    pub fn open_with_config(config: Config) -> Result<Self> {
        let mut index = Index::with_capacity(config.initial_capacity);

        // The table is not shared yet, so recovery has exclusive access
        let (backing, recovery) = match &config.path {
            None => (Backing::Memory, None),
            Some(path) => {
                let (writer, stats) = LogRecovery::rebuild(path, &mut index)?;
                tracing::debug!(
                    path = %path.display(),
                    keys = index.len(),
                    "table opened"
                );
                (Backing::Open(writer), Some(stats))
            }
        };

        Ok(Self {
            config,
            state: RwLock::new(TableState { index, backing }),
            recovery,
        })
    }

    /// Store `value` under `key`.
    ///
    /// The record is appended and synced before the index changes. On an
    /// overwrite the previous record is then tombstoned; if that fails the
    /// index is rolled back and the error returned. The log is left holding
    /// both records unmarked, so the new value reappears after a reopen.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        validate_key(key)?;

        let mut state = self.state.write();
        let TableState { index, backing } = &mut *state;

        let value = Bytes::copy_from_slice(value);
        let offset = backing.append(key, &value)?;

        let previous = match index.insert(key.to_vec(), IndexEntry::new(value, offset)) {
            Some(previous) => previous,
            None => return Ok(()),
        };

        if let Err(e) = backing.mark_tombstone(previous.offset) {
            tracing::warn!(
                old_offset = previous.offset,
                new_offset = offset,
                "failed to tombstone superseded record, rolling back: {}",
                e
            );
            index.restore(key, previous);
            return Err(e);
        }

        Ok(())
    }

    /// Get the value stored under `key`
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.state.read().index.value(key)
    }

    /// Whether `key` is present
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.state.read().index.contains_key(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.state.read().index.len()
    }

    /// Whether the table holds no keys
    pub fn is_empty(&self) -> bool {
        self.state.read().index.is_empty()
    }

    /// Close the log file.
    ///
    /// Reads keep working against the in-memory index; `put` fails with
    /// `NotOpen`. Closing an in-memory table always succeeds. Closing a
    /// persistent table twice returns `NotOpen`.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.write();

        match std::mem::replace(&mut state.backing, Backing::Closed) {
            Backing::Memory => {
                state.backing = Backing::Memory;
                Ok(())
            }
            Backing::Open(writer) => {
                tracing::debug!(path = %writer.path().display(), "closing table");
                writer.close()
            }
            Backing::Closed => Err(TableError::NotOpen),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Path of the backing log, if any
    pub fn path(&self) -> Option<&Path> {
        self.config.path.as_deref()
    }

    /// Whether the table persists to a log file
    pub fn is_persistent(&self) -> bool {
        self.config.is_persistent()
    }

    /// Whether `put` can currently succeed
    pub fn is_open(&self) -> bool {
        !matches!(self.state.read().backing, Backing::Closed)
    }

    /// Current size of the log in bytes (0 when in memory or closed)
    pub fn log_len(&self) -> u64 {
        match &self.state.read().backing {
            Backing::Open(writer) => writer.len(),
            Backing::Memory | Backing::Closed => 0,
        }
    }

    /// Stats from the recovery that ran when the table was opened
    pub fn recovery_stats(&self) -> Option<&RecoveryStats> {
        self.recovery.as_ref()
    }
}
