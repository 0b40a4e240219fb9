//! Log Reader
//!
//! Sequentially scans records from a log file.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::{Result, TableError};

use super::record::{read_varint, Record, SEPARATOR};

/// Reads records from a log file, front to back
pub struct LogReader {
    reader: BufReader<File>,
    path: PathBuf,
    /// Offset of the next unread byte
    position: u64,
    /// File size when opened, used to reject impossible value lengths
    file_len: u64,
}

impl LogReader {
    /// Open a log file for reading.
    ///
    /// Returns the raw I/O error so callers can tell a missing file apart
    /// from other failures.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();

        Ok(Self {
            reader: BufReader::new(file),
            path: path.to_path_buf(),
            position: 0,
            file_len,
        })
    }

    /// Read the next record.
    ///
    /// Returns:
    /// - `Ok(Some(record))` — a complete record
    /// - `Ok(None)` — end of file at a record boundary, or a trailing key
    ///   fragment with no separator (a torn append)
    /// - `Err(Corruption)` — malformed length or truncated value
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        let offset = self.position;

        let mut key = Vec::new();
        let n = self.reader.read_until(SEPARATOR, &mut key)?;
        if n == 0 {
            return Ok(None);
        }
        self.position += n as u64;

        if key.pop() != Some(SEPARATOR) {
            tracing::warn!(
                path = %self.path.display(),
                offset,
                bytes = n,
                "ignoring incomplete key at end of log"
            );
            return Ok(None);
        }

        let (value_len, used) = read_varint(&mut self.reader).map_err(|e| {
            TableError::corruption(offset, format!("malformed value length: {}", e))
        })?;
        self.position += used as u64;

        if value_len < 0 {
            return Err(TableError::corruption(
                offset,
                format!("negative value length {}", value_len),
            ));
        }

        let remaining = self.file_len.saturating_sub(self.position);
        if value_len as u64 > remaining {
            return Err(TableError::corruption(
                offset,
                format!(
                    "truncated value: expected {} bytes, {} remain",
                    value_len, remaining
                ),
            ));
        }

        let mut value = vec![0u8; value_len as usize];
        self.reader.read_exact(&mut value).map_err(|e| {
            TableError::corruption(offset, format!("truncated value: {}", e))
        })?;
        self.position += value_len as u64;

        Ok(Some(Record { key, value, offset }))
    }

    /// Offset of the next record to be read
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Size of the file when it was opened
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Iterate over all records until end of file or the first error
    pub fn records(self) -> Records {
        Records {
            reader: self,
            done: false,
        }
    }
}

/// Iterator over log records
pub struct Records {
    reader: LogReader,
    done: bool,
}

impl Iterator for Records {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
