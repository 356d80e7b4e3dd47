//! Small-endian fixed-width integer fields
//!
//! Every numeric field in the metadata wire format is an unsigned integer
//! stored least significant byte first in 0 to 8 bytes. A zero-width field
//! always holds the value 0.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::errors::{CodecError, CodecResult};

/// Largest field width supported by the wire format
pub const MAX_FIELD_BYTES: usize = 8;

/// Mask applied on read so results stay in the positive range of an `i64`
const READ_MASK: u64 = i64::MAX as u64;

/// Returns true if `value` fits in `bytes` small-endian bytes
#[inline]
pub fn fits_in_bytes(value: u64, bytes: usize) -> bool {
    match bytes {
        0 => value == 0,
        b if b >= MAX_FIELD_BYTES => true,
        b => value >> (8 * b) == 0,
    }
}

/// Minimum number of bytes needed to hold `value` (0 for 0)
pub fn byte_len(value: u64) -> usize {
    let mut bytes = 0;
    let mut left = value;
    while left > 0 {
        bytes += 1;
        left >>= 8;
    }
    bytes
}

/// Append `value` to `buffer` as `bytes` small-endian bytes.
///
/// Fails with `Validation` if the value does not fit in the requested width.
///
/// # Examples
/// ```
/// use coinspark_metadata::utils::bytes::write_small_endian;
///
/// let mut buf = Vec::new();
/// write_small_endian(&mut buf, 0x0102, 2).unwrap();
/// assert_eq!(buf, vec![0x02, 0x01]);
/// assert!(write_small_endian(&mut buf, 256, 1).is_err());
/// ```
pub fn write_small_endian(buffer: &mut Vec<u8>, value: u64, bytes: usize) -> CodecResult<()> {
    if bytes > MAX_FIELD_BYTES || !fits_in_bytes(value, bytes) {
        return Err(CodecError::validation(format!(
            "value {} does not fit in {} bytes",
            value, bytes
        )));
    }

    if bytes == 0 {
        return Ok(());
    }

    buffer
        .write_uint::<LittleEndian>(value, bytes)
        .map_err(|e| CodecError::malformed(format!("write failed: {}", e)))
}

/// Read a `bytes`-wide small-endian value from the start of `data`.
pub fn read_small_endian(data: &[u8], bytes: usize) -> CodecResult<u64> {
    if bytes > MAX_FIELD_BYTES {
        return Err(CodecError::malformed(format!(
            "field width {} exceeds {} bytes",
            bytes, MAX_FIELD_BYTES
        )));
    }

    if data.len() < bytes {
        return Err(CodecError::Truncated {
            expected: bytes,
            actual: data.len(),
        });
    }

    if bytes == 0 {
        return Ok(0);
    }

    Ok(LittleEndian::read_uint(&data[..bytes], bytes) & READ_MASK)
}

/// Forward-only cursor over an encoded record
#[derive(Debug, Clone)]
pub struct MetadataReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> MetadataReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Unconsumed tail of the buffer
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    pub fn read_u8(&mut self) -> CodecResult<u8> {
        let value = self.read_uint(1)?;
        Ok(value as u8)
    }

    pub fn read_uint(&mut self, bytes: usize) -> CodecResult<u64> {
        let value = read_small_endian(self.rest(), bytes)?;
        self.position += bytes;
        Ok(value)
    }

    pub fn read_bytes(&mut self, count: usize) -> CodecResult<&'a [u8]> {
        if self.remaining() < count {
            return Err(CodecError::Truncated {
                expected: count,
                actual: self.remaining(),
            });
        }
        let slice = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    /// Skip `count` bytes that a sub-decoder has already consumed
    pub fn advance(&mut self, count: usize) -> CodecResult<()> {
        self.read_bytes(count).map(|_| ())
    }
}
