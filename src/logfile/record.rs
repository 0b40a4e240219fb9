//! Log record definitions
//!
//! Defines the byte layout of a single record and the signed varint used for
//! the value length.

use std::io::{self, Read};

use bytes::{BufMut, BytesMut};

/// Separator written between the key and the value length
pub const SEPARATOR: u8 = 0x1F;

/// Written over the first key byte of a superseded record
pub const TOMBSTONE: u8 = 0x7F;

/// Longest encoding of a 64-bit varint
pub const MAX_VARINT_LEN: usize = 10;

/// A single record read back from the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Key bytes, without the trailing separator
    pub key: Vec<u8>,

    /// Value bytes
    pub value: Vec<u8>,

    /// Byte offset in the file where the record starts
    pub offset: u64,
}

impl Record {
    /// Whether a later write superseded this record
    pub fn is_tombstoned(&self) -> bool {
        self.key.first() == Some(&TOMBSTONE)
    }

    /// Number of bytes the record occupies on disk
    pub fn encoded_len(&self) -> u64 {
        encoded_len(&self.key, &self.value)
    }
}

/// Serialize a record: `key | 0x1F | varint(len(value)) | value`
pub fn encode_record(key: &[u8], value: &[u8]) -> BytesMut {
    let mut buf = BytesMut::with_capacity(key.len() + 1 + MAX_VARINT_LEN + value.len());
    buf.put_slice(key);
    buf.put_u8(SEPARATOR);
    put_varint(&mut buf, value.len() as i64);
    buf.put_slice(value);
    buf
}

/// Size of `encode_record(key, value)` without building it
pub fn encoded_len(key: &[u8], value: &[u8]) -> u64 {
    let mut varint = BytesMut::with_capacity(MAX_VARINT_LEN);
    put_varint(&mut varint, value.len() as i64);
    (key.len() + 1 + varint.len() + value.len()) as u64
}

/// Append the zig-zag varint encoding of `value`
pub fn put_varint<B: BufMut>(buf: &mut B, value: i64) {
    let mut ux = ((value << 1) ^ (value >> 63)) as u64;
    while ux >= 0x80 {
        buf.put_u8(ux as u8 | 0x80);
        ux >>= 7;
    }
    buf.put_u8(ux as u8);
}

/// Decode a zig-zag varint from the front of `buf`.
///
/// Returns the value and the number of bytes consumed, or `None` if the
/// buffer ends first or the encoding overflows 64 bits.
pub fn decode_varint(buf: &[u8]) -> Option<(i64, usize)> {
    let mut ux: u64 = 0;
    let mut shift = 0;
    for (i, &byte) in buf.iter().enumerate().take(MAX_VARINT_LEN) {
        if byte < 0x80 {
            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return None;
            }
            ux |= (byte as u64) << shift;
            return Some((unzigzag(ux), i + 1));
        }
        ux |= ((byte & 0x7F) as u64) << shift;
        shift += 7;
    }
    None
}

/// Read a zig-zag varint from a stream.
///
/// Returns the value and the number of bytes consumed. A stream that ends
/// inside the varint yields `UnexpectedEof`; an encoding longer than 64 bits
/// yields `InvalidData`.
pub fn read_varint<R: Read>(reader: &mut R) -> io::Result<(i64, usize)> {
    let mut ux: u64 = 0;
    let mut shift = 0;
    let mut byte = [0u8; 1];
    for i in 0..MAX_VARINT_LEN {
        reader.read_exact(&mut byte)?;
        let b = byte[0];
        if b < 0x80 {
            if i == MAX_VARINT_LEN - 1 && b > 1 {
                break;
            }
            ux |= (b as u64) << shift;
            return Ok((unzigzag(ux), i + 1));
        }
        ux |= ((b & 0x7F) as u64) << shift;
        shift += 7;
    }
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        "varint overflows a 64-bit integer",
    ))
}

fn unzigzag(ux: u64) -> i64 {
    let x = (ux >> 1) as i64;
    if ux & 1 != 0 {
        !x
    } else {
        x
    }
}
