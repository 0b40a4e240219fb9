//! Log Writer
//!
//! Handles appending records to the log file and marking tombstones.

use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, TableError};

use super::record::{encode_record, TOMBSTONE};

/// Appends records to a log file
///
/// Every append is followed by `sync_data`, so a returned offset always refers
/// to a record that reached storage. The writer relies on its owner for
/// mutual exclusion: the end-of-file position is queried and written without
/// any locking of its own.
#[derive(Debug)]
pub struct LogWriter {
    file: File,
    path: PathBuf,
    /// Bytes known to be in the file (end of the last successful append)
    len: u64,
}

impl LogWriter {
    /// Create a brand-new, empty log file.
    ///
    /// Fails if anything already exists at `path`.
    pub fn create_new(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| TableError::open(path, e))?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            len: 0,
        })
    }

    /// Append a record at the end of the file and sync it.
    ///
    /// Returns the offset where the record starts. A write that stops part
    /// way through is reported as an error; the torn bytes stay in the file.
    pub fn append(&mut self, key: &[u8], value: &[u8]) -> Result<u64> {
        let buf = encode_record(key, value);
        let offset = self.file.seek(SeekFrom::End(0))?;

        let mut written = 0;
        while written < buf.len() {
            match self.file.write(&buf[written..]) {
                Ok(0) => {
                    return Err(self.torn_write(offset, written, io::ErrorKind::WriteZero.into()))
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.torn_write(offset, written, e)),
            }
        }

        self.file.sync_data()?;
        self.len = offset + buf.len() as u64;

        Ok(offset)
    }

    /// Overwrite the first key byte of the record at `offset` with the
    /// tombstone marker.
    ///
    /// The offset must come from an earlier successful `append`.
    pub fn mark_tombstone(&mut self, offset: u64) -> Result<()> {
        if offset >= self.len {
            return Err(TableError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "tombstone offset {} is past the end of the log ({} bytes)",
                    offset, self.len
                ),
            )));
        }

        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(&[TOMBSTONE])?;
        Ok(())
    }

    /// Force all written data to storage
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Sync and release the file handle
    pub fn close(mut self) -> Result<()> {
        self.sync()
    }

    /// Length of the log in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether nothing has been written to the log
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn torn_write(&self, offset: u64, written: usize, error: io::Error) -> TableError {
        if written > 0 {
            tracing::warn!(
                path = %self.path.display(),
                offset,
                written,
                "partial record written to log: {}",
                error
            );
        }
        TableError::Io(error)
    }
}
