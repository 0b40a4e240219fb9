//! Log Recovery
//!
//! Rebuilds the index from the log at startup, compacting the log as it goes.

use std::fs;
use std::io;
use std::path::Path;

use bytes::Bytes;

use crate::config::swap_path_for;
use crate::error::{Result, TableError};
use crate::index::{Index, IndexEntry};

use super::{LogReader, LogWriter};

/// Replays and compacts a log file
pub struct LogRecovery;

/// Result of a recovery or verify pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Records read from the previous log
    pub records_scanned: u64,

    /// Records loaded into the index and rewritten
    pub records_kept: u64,

    /// Tombstoned records left behind
    pub tombstones_dropped: u64,

    /// Earlier live records for a key that reappeared later in the log.
    /// They are copied, then tombstoned in the rebuilt log.
    pub duplicates_superseded: u64,

    /// Size of the previous log
    pub bytes_before: u64,

    /// Size of the rebuilt log (estimated by `verify`)
    pub bytes_after: u64,

    /// Whether an interrupted recovery's swap file was replayed
    pub resumed_swap: bool,
}

impl RecoveryStats {
    /// Bytes reclaimed by dropping tombstoned records
    pub fn bytes_reclaimed(&self) -> u64 {
        self.bytes_before.saturating_sub(self.bytes_after)
    }
}

impl LogRecovery {
    /// Rebuild the log at `path` and load its live records into `index`.
    ///
    /// This will:
    /// 1. Rename the existing log to `{path}.swp`
    /// 2. Create a fresh, empty log at `path`
    /// 3. Replay the swap file, skipping tombstoned records
    /// 4. Insert each live record into the index and append it to the fresh log,
    ///    tombstoning any earlier copy of the same key
    /// 5. Remove the swap file, whether or not replay succeeded
    ///
    /// If replay succeeded but the swap file cannot be removed, the rebuild
    /// fails with `TableError::Open` for the swap path.
    ///
    /// If `{path}.swp` already exists, an earlier recovery was interrupted
    /// after step 1. The swap file still holds the complete previous log, so
    /// any partial log at `path` is discarded and the swap file is replayed.
    ///
    /// A replay error is returned after the swap file has been removed; records
    /// loaded before the failure stay in the index and the fresh log.
    ///
    /// The caller must hold exclusive access to the index and must be the only
    /// owner of `path`.
    pub fn rebuild(path: &Path, index: &mut Index) -> Result<(LogWriter, RecoveryStats)> {
        let swap_path = swap_path_for(path);
        let mut stats = RecoveryStats::default();

        if swap_path.exists() {
            tracing::warn!(
                path = %path.display(),
                swap = %swap_path.display(),
                "found swap file from an interrupted recovery, replaying it"
            );
            stats.resumed_swap = true;
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(TableError::open(path, e)),
            }
        } else {
            match fs::rename(path, &swap_path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(TableError::open(path, e)),
            }
        }

        let mut writer = LogWriter::create_new(path)?;

        let reader = match LogReader::open(&swap_path) {
            Ok(reader) => reader,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no existing log, starting empty");
                return Ok((writer, stats));
            }
            Err(e) => return Err(TableError::open(&swap_path, e)),
        };
        stats.bytes_before = reader.file_len();

        let replayed = Self::replay(reader, &mut writer, index, &mut stats);
        let removed = Self::remove_swap(&swap_path);
        stats.bytes_after = writer.len();

        if let Err(e) = replayed {
            if let Err(remove_err) = removed {
                tracing::warn!(
                    swap = %swap_path.display(),
                    "failed to remove swap file: {}",
                    remove_err
                );
            }
            return Err(e);
        }
        // A swap file left behind would be replayed over this log on the next open
        removed?;

        tracing::info!(
            path = %path.display(),
            scanned = stats.records_scanned,
            kept = stats.records_kept,
            dropped = stats.tombstones_dropped,
            superseded = stats.duplicates_superseded,
            bytes_before = stats.bytes_before,
            bytes_after = stats.bytes_after,
            "log recovered"
        );

        Ok((writer, stats))
    }

    /// Scan a log without modifying it.
    ///
    /// `bytes_after` is the size the log would have after a rebuild.
    pub fn verify(path: &Path) -> Result<RecoveryStats> {
        let reader = LogReader::open(path).map_err(|e| TableError::open(path, e))?;
        let mut stats = RecoveryStats {
            bytes_before: reader.file_len(),
            ..RecoveryStats::default()
        };

        for record in reader.records() {
            let record = record?;
            stats.records_scanned += 1;
            if record.is_tombstoned() {
                stats.tombstones_dropped += 1;
            } else {
                stats.records_kept += 1;
                stats.bytes_after += record.encoded_len();
            }
        }

        Ok(stats)
    }

    /// Copy every live record from `reader` into `writer` and `index`
    fn replay(
        reader: LogReader,
        writer: &mut LogWriter,
        index: &mut Index,
        stats: &mut RecoveryStats,
    ) -> Result<()> {
        for record in reader.records() {
            let record = record?;
            stats.records_scanned += 1;

            if record.is_tombstoned() {
                tracing::trace!(offset = record.offset, "skipping tombstoned record");
                stats.tombstones_dropped += 1;
                continue;
            }

            let offset = writer.append(&record.key, &record.value)?;
            let entry = IndexEntry::new(Bytes::from(record.value), offset);
            stats.records_kept += 1;

            // An earlier live record for the same key was never tombstoned
            if let Some(previous) = index.insert(record.key, entry) {
                tracing::debug!(
                    old_offset = previous.offset,
                    new_offset = offset,
                    "tombstoning duplicate live record"
                );
                writer.mark_tombstone(previous.offset)?;
                stats.duplicates_superseded += 1;
            }
        }

        Ok(())
    }

    /// Remove the swap file once its records are in the fresh log
    fn remove_swap(swap_path: &Path) -> Result<()> {
        match fs::remove_file(swap_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TableError::open(swap_path, e)),
        }
    }
}
