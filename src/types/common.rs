//! Protocol-wide constants and quantity aliases
//!
//! These bounds are shared by every record type and by the quantity flow
//! calculations, so they live in one place.

/// Asset units held by an input or output
pub type AssetQty = u64;

/// Bitcoin value of an output in satoshis
pub type SatoshiQty = u64;

/// Total satoshis that can ever exist, used as "no limit" for fees
pub const SATOSHI_QTY_MAX: SatoshiQty = 2_100_000_000_000_000;

/// Largest asset quantity that can be issued or transferred
pub const ASSET_QTY_MAX: AssetQty = 100_000_000_000_000;

/// Largest payment reference value (2^52 - 1)
pub const PAYMENT_REF_MAX: u64 = 4_503_599_627_370_495;

/// Largest input or output index and range count
pub const IO_INDEX_MAX: u32 = 65_535;

/// Ceiling on the per-output fee basis
pub const FEE_BASIS_MAX_SATOSHIS: SatoshiQty = 1000;

/// Identifier every metadata buffer starts with
pub const METADATA_IDENTIFIER: &[u8; 3] = b"SPK";
pub const METADATA_IDENTIFIER_LEN: usize = 3;

/// Largest value of a length-prefix byte; anything above is a record tag
pub const LENGTH_PREFIX_MAX: u8 = 96;

/// Typical metadata budget for a relayed OP_RETURN output
pub const DEFAULT_METADATA_MAX_LEN: usize = 40;

pub const GENESIS_PREFIX: u8 = b'g';
pub const TRANSFERS_PREFIX: u8 = b't';
pub const PAYMENT_REF_PREFIX: u8 = b'r';
pub const MESSAGE_PREFIX: u8 = b'm';

pub const UNSIGNED_BYTE_MAX: u64 = 0xFF;
pub const UNSIGNED_2_BYTES_MAX: u64 = 0xFFFF;
pub const UNSIGNED_3_BYTES_MAX: u64 = 0xFF_FFFF;
pub const UNSIGNED_4_BYTES_MAX: u64 = 0xFFFF_FFFF;

/// Size limits a caller applies to encode and decode calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecLimits {
    /// Maximum total metadata length in bytes
    pub metadata_max_len: usize,
    /// Practical cap on the number of transfers in one list
    pub max_transfers: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            metadata_max_len: DEFAULT_METADATA_MAX_LEN,
            max_transfers: 1024,
        }
    }
}
