//! Log File Module
//!
//! Provides durability through an append-only record log.
//!
//! ## Responsibilities
//! - Append a record and fsync before the index is updated
//! - Mark superseded records with an in-place tombstone byte
//! - Replay the log at startup, compacting it into a fresh file
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ Record 1                                             │
//! │ ┌───────────┬──────────┬──────────────┬───────────┐  │
//! │ │ Key bytes │ Sep 0x1F │ Varint (len) │  Value    │  │
//! │ └───────────┴──────────┴──────────────┴───────────┘  │
//! ├──────────────────────────────────────────────────────┤
//! │ Record 2 (tombstoned: first key byte is 0x7F)        │
//! │ ┌───────────┬──────────┬──────────────┬───────────┐  │
//! │ │ 0x7F ...  │ Sep 0x1F │ Varint (len) │  Value    │  │
//! │ └───────────┴──────────┴──────────────┴───────────┘  │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! The length is a zig-zag signed varint (LEB128 groups of 7 bits, at most
//! 10 bytes). There is no header, checksum or padding: a file is just the
//! concatenation of records.

mod record;
mod writer;
mod reader;
mod recovery;

pub use record::{
    decode_varint, encode_record, encoded_len, put_varint, read_varint, Record,
    MAX_VARINT_LEN, SEPARATOR, TOMBSTONE,
};
pub use writer::LogWriter;
pub use reader::{LogReader, Records};
pub use recovery::{LogRecovery, RecoveryStats};
