//! Message record wire format
//!
//! ```text
//! SPK m [server host/path] [public flag]? ([range packing] [first]? [count]?)* [hash...]
//! ```
//!
//! Each output range starts with a packing byte. Bit 0x80 says another
//! range follows, bits 0x60 are reserved, bits 0x18 pick the type and bits
//! 0x07 carry an inline value or an extend code. The public flag is an
//! extend byte with code 0 and always comes first.

use tracing::debug;

use super::domain_path::DomainPath;
use super::metadata::locate_range;
use crate::errors::{CodecError, CodecResult};
use crate::types::common::{
    MESSAGE_PREFIX, METADATA_IDENTIFIER, METADATA_IDENTIFIER_LEN, UNSIGNED_2_BYTES_MAX,
    UNSIGNED_BYTE_MAX,
};
use crate::types::io_range::IoRange;
use crate::types::message::{MessageRecord, MESSAGE_HASH_MAX_LEN, MESSAGE_MAX_IO_RANGES};
use crate::utils::bytes::{write_small_endian, MetadataReader};

const OUTPUTS_MORE_FLAG: u8 = 0x80;
const OUTPUTS_RESERVED_MASK: u8 = 0x60;
const OUTPUTS_TYPE_MASK: u8 = 0x18;
const OUTPUTS_TYPE_SINGLE: u8 = 0x00;
const OUTPUTS_TYPE_FIRST: u8 = 0x08;
const OUTPUTS_TYPE_UNUSED: u8 = 0x10;
const OUTPUTS_TYPE_EXTEND: u8 = 0x18;
const OUTPUTS_VALUE_MASK: u8 = 0x07;
const OUTPUTS_VALUE_MAX: u32 = 7;

const EXTEND_PUBLIC: u8 = 0;
const EXTEND_0_1_BYTE: u8 = 1;
const EXTEND_1_0_BYTE: u8 = 2;
const EXTEND_2_BYTES: u8 = 3;
const EXTEND_1_1_BYTES: u8 = 4;
const EXTEND_2_1_BYTES: u8 = 5;
const EXTEND_2_2_BYTES: u8 = 6;
const EXTEND_ALL: u8 = 7;

/// Packing byte and explicit field widths chosen for one output range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OutputsPacking {
    packing: u8,
    first_bytes: usize,
    count_bytes: usize,
}

impl OutputsPacking {
    fn inline(packing: u8) -> Self {
        Self {
            packing,
            first_bytes: 0,
            count_bytes: 0,
        }
    }

    fn extend(code: u8) -> Self {
        let (first_bytes, count_bytes) = extend_field_bytes(code);
        Self {
            packing: OUTPUTS_TYPE_EXTEND | code,
            first_bytes,
            count_bytes,
        }
    }

    /// Encoded size including the packing byte
    fn encoded_len(&self) -> usize {
        1 + self.first_bytes + self.count_bytes
    }

    /// Smallest representation of `range`, inline forms first
    fn choose(range: &IoRange, count_outputs: usize) -> Option<Self> {
        let first = u64::from(range.first);
        let count = u64::from(range.count);
        let first_zero = range.first == 0;
        let count_one = range.count == 1;

        if count_one && range.first <= OUTPUTS_VALUE_MAX {
            return Some(Self::inline(OUTPUTS_TYPE_SINGLE | range.first as u8));
        }

        if first_zero && range.count <= OUTPUTS_VALUE_MAX {
            return Some(Self::inline(OUTPUTS_TYPE_FIRST | range.count as u8));
        }

        let code = if first_zero && range.count as usize >= count_outputs {
            EXTEND_ALL
        } else if first <= UNSIGNED_BYTE_MAX && count_one {
            EXTEND_1_0_BYTE
        } else if first_zero && count <= UNSIGNED_BYTE_MAX {
            EXTEND_0_1_BYTE
        } else if first <= UNSIGNED_2_BYTES_MAX && count_one {
            EXTEND_2_BYTES
        } else if first <= UNSIGNED_BYTE_MAX && count <= UNSIGNED_BYTE_MAX {
            EXTEND_1_1_BYTES
        } else if first <= UNSIGNED_2_BYTES_MAX && count <= UNSIGNED_BYTE_MAX {
            EXTEND_2_1_BYTES
        } else if first <= UNSIGNED_2_BYTES_MAX && count <= UNSIGNED_2_BYTES_MAX {
            EXTEND_2_2_BYTES
        } else {
            return None;
        };

        Some(Self::extend(code))
    }
}

/// Explicit (first, count) field widths for an extend code
fn extend_field_bytes(code: u8) -> (usize, usize) {
    match code {
        EXTEND_0_1_BYTE => (0, 1),
        EXTEND_1_0_BYTE => (1, 0),
        EXTEND_2_BYTES => (2, 0),
        EXTEND_1_1_BYTES => (1, 1),
        EXTEND_2_1_BYTES => (2, 1),
        EXTEND_2_2_BYTES => (2, 2),
        _ => (0, 0),
    }
}

/// Range implied by an extend code before explicit fields are read
fn extend_implied_range(code: u8, count_outputs: usize) -> IoRange {
    match code {
        EXTEND_ALL => IoRange::new(0, u32::try_from(count_outputs).unwrap_or(u32::MAX)),
        EXTEND_1_0_BYTE | EXTEND_2_BYTES => IoRange::new(0, 1),
        _ => IoRange::new(0, 0),
    }
}

impl MessageRecord {
    /// Number of hash bytes that fit in `metadata_max_len`, at most 32.
    ///
    /// Callers must still check the result against the 12-byte minimum.
    pub fn calc_hash_len(&self, count_outputs: usize, metadata_max_len: usize) -> usize {
        let mut hash_len = metadata_max_len as i64 - METADATA_IDENTIFIER_LEN as i64 - 1;

        hash_len -= self.domain_path().encoded_len().unwrap_or(0) as i64;

        if self.is_public {
            hash_len -= 1;
        }

        for range in &self.output_ranges {
            if let Some(packing) = OutputsPacking::choose(range, count_outputs) {
                hash_len -= packing.encoded_len() as i64;
            }
        }

        hash_len.clamp(0, MESSAGE_HASH_MAX_LEN as i64) as usize
    }

    /// Encode as a standalone metadata buffer of at most `metadata_max_len` bytes
    pub fn encode(&self, count_outputs: usize, metadata_max_len: usize) -> CodecResult<Vec<u8>> {
        self.validate()?;

        let mut metadata = Vec::with_capacity(metadata_max_len);
        metadata.extend_from_slice(METADATA_IDENTIFIER);
        metadata.push(MESSAGE_PREFIX);
        metadata.extend_from_slice(&self.domain_path().encode()?);

        if self.is_public {
            let more = if self.output_ranges.is_empty() {
                0
            } else {
                OUTPUTS_MORE_FLAG
            };
            metadata.push(more | OUTPUTS_TYPE_EXTEND | EXTEND_PUBLIC);
        }

        for (index, range) in self.output_ranges.iter().enumerate() {
            let packing = OutputsPacking::choose(range, count_outputs).ok_or_else(|| {
                CodecError::validation(format!(
                    "output range {}+{} cannot be packed",
                    range.first, range.count
                ))
            })?;

            let more = if index + 1 < self.output_ranges.len() {
                OUTPUTS_MORE_FLAG
            } else {
                0
            };
            metadata.push(packing.packing | more);
            write_small_endian(&mut metadata, u64::from(range.first), packing.first_bytes)?;
            write_small_endian(&mut metadata, u64::from(range.count), packing.count_bytes)?;
        }

        metadata.extend_from_slice(&self.hash);

        if metadata.len() > metadata_max_len {
            debug!(
                "Message needs {} bytes but only {} available",
                metadata.len(),
                metadata_max_len
            );
            return Err(CodecError::Capacity {
                needed: metadata.len(),
                available: metadata_max_len,
            });
        }

        Ok(metadata)
    }

    /// Decode the message record from a metadata buffer
    pub fn decode(metadata: &[u8], count_outputs: usize) -> CodecResult<Self> {
        let payload = locate_range(metadata, Some(MESSAGE_PREFIX))?;
        let mut reader = MetadataReader::new(payload);

        let location = DomainPath::decode(&mut reader)?;

        let mut is_public = false;
        let mut output_ranges = Vec::new();
        let mut packing = OUTPUTS_MORE_FLAG;

        while packing & OUTPUTS_MORE_FLAG != 0 {
            let offset = reader.position();
            packing = reader.read_u8()?;

            if packing & OUTPUTS_RESERVED_MASK != 0 {
                debug!("Reserved bits set in packing {:#04x} at offset {}", packing, offset);
                return Err(CodecError::malformed(format!(
                    "reserved bits set in output packing {:#04x}",
                    packing
                )));
            }

            let packing_type = packing & OUTPUTS_TYPE_MASK;
            let packing_value = packing & OUTPUTS_VALUE_MASK;

            if packing_type == OUTPUTS_TYPE_EXTEND && packing_value == EXTEND_PUBLIC {
                is_public = true;
                continue;
            }

            if output_ranges.len() >= MESSAGE_MAX_IO_RANGES {
                return Err(CodecError::malformed(format!(
                    "more than {} output ranges",
                    MESSAGE_MAX_IO_RANGES
                )));
            }

            if packing_type == OUTPUTS_TYPE_UNUSED {
                debug!("Unused packing type {:#04x} at offset {}", packing, offset);
                return Err(CodecError::malformed(format!(
                    "unused output packing type {:#04x}",
                    packing
                )));
            }

            let range = match packing_type {
                OUTPUTS_TYPE_SINGLE => IoRange::single(u32::from(packing_value)),
                OUTPUTS_TYPE_FIRST => IoRange::new(0, u32::from(packing_value)),
                _ => {
                    let mut range = extend_implied_range(packing_value, count_outputs);
                    let (first_bytes, count_bytes) = extend_field_bytes(packing_value);
                    if first_bytes > 0 {
                        range.first = reader.read_uint(first_bytes)? as u32;
                    }
                    if count_bytes > 0 {
                        range.count = reader.read_uint(count_bytes)? as u32;
                    }
                    range
                }
            };

            output_ranges.push(range);
        }

        let hash_len = reader.remaining().min(MESSAGE_HASH_MAX_LEN);
        let hash = reader.read_bytes(hash_len)?.to_vec();

        let message = MessageRecord {
            use_https: location.use_https,
            server_host: location.domain_name,
            use_prefix: location.use_prefix,
            server_path: location.page_path,
            is_public,
            output_ranges,
            hash,
        };

        message.validate()?;
        Ok(message)
    }
}
