//! Genesis record wire format
//!
//! ```text
//! SPK g [qty+flags:2] [flat charge:1]? [bps charge:1]? [domain/path] [asset hash...]
//! ```
//!
//! The 2-byte field holds `exponent * 1001 + mantissa` in its low 14 bits,
//! bit 0x4000 flags a flat charge byte and bit 0x8000 a basis-points byte.

use tracing::debug;

use super::domain_path::{read_ipv4_address, shrink_lower_domain_name, DomainPath};
use super::metadata::locate_range;
use crate::errors::{CodecError, CodecResult};
use crate::types::common::{GENESIS_PREFIX, METADATA_IDENTIFIER, METADATA_IDENTIFIER_LEN};
use crate::types::genesis::{GenesisRecord, GENESIS_HASH_MAX_LEN};
use crate::utils::bytes::{write_small_endian, MetadataReader};

const QTY_FLAGS_LENGTH: usize = 2;
const QTY_MASK: u64 = 0x3FFF;
const QTY_EXPONENT_MULTIPLE: u64 = 1001;
const FLAG_CHARGE_FLAT: u64 = 0x4000;
const FLAG_CHARGE_BPS: u64 = 0x8000;
const CHARGE_FLAT_EXPONENT_MULTIPLE: u64 = 101;
const CHARGE_FLAT_LENGTH: usize = 1;
const CHARGE_BPS_LENGTH: usize = 1;

/// Bytes taken by the IPv4 packing byte and its four octets
const IPV4_DOMAIN_LENGTH: i64 = 5;

impl GenesisRecord {
    /// Number of asset hash bytes that fit in `metadata_max_len`.
    ///
    /// The result is clamped to 0..=32. Callers must still check it against
    /// the 12-byte minimum.
    pub fn calc_hash_len(&self, metadata_max_len: usize) -> usize {
        let mut hash_len =
            metadata_max_len as i64 - METADATA_IDENTIFIER_LEN as i64 - 1 - QTY_FLAGS_LENGTH as i64;

        if self.charge_flat_mantissa > 0 {
            hash_len -= CHARGE_FLAT_LENGTH as i64;
        }

        if self.charge_basis_points > 0 {
            hash_len -= CHARGE_BPS_LENGTH as i64;
        }

        let mut domain_path_len = self.page_path.len() as i64 + 1;

        if read_ipv4_address(&self.domain_name).is_some() {
            hash_len -= IPV4_DOMAIN_LENGTH;
        } else {
            hash_len -= 1;
            let shrunk_len = shrink_lower_domain_name(&self.domain_name)
                .map(|shrunk| shrunk.domain_name.len())
                .unwrap_or(0);
            domain_path_len += shrunk_len as i64 + 1;
        }

        hash_len -= 2 * ((domain_path_len + 2) / 3);

        hash_len.clamp(0, GENESIS_HASH_MAX_LEN as i64) as usize
    }

    /// Encode as a standalone metadata buffer of at most `metadata_max_len` bytes
    pub fn encode(&self, metadata_max_len: usize) -> CodecResult<Vec<u8>> {
        self.validate()?;

        let mut metadata = Vec::with_capacity(metadata_max_len);
        metadata.extend_from_slice(METADATA_IDENTIFIER);
        metadata.push(GENESIS_PREFIX);

        let mut qty_encoded = (u64::from(self.qty_exponent) * QTY_EXPONENT_MULTIPLE
            + u64::from(self.qty_mantissa))
            & QTY_MASK;
        if self.charge_flat_mantissa > 0 {
            qty_encoded |= FLAG_CHARGE_FLAT;
        }
        if self.charge_basis_points > 0 {
            qty_encoded |= FLAG_CHARGE_BPS;
        }
        write_small_endian(&mut metadata, qty_encoded, QTY_FLAGS_LENGTH)?;

        if qty_encoded & FLAG_CHARGE_FLAT != 0 {
            let charge_encoded = u64::from(self.charge_flat_exponent)
                * CHARGE_FLAT_EXPONENT_MULTIPLE
                + u64::from(self.charge_flat_mantissa);
            write_small_endian(&mut metadata, charge_encoded, CHARGE_FLAT_LENGTH)?;
        }

        if qty_encoded & FLAG_CHARGE_BPS != 0 {
            write_small_endian(
                &mut metadata,
                u64::from(self.charge_basis_points),
                CHARGE_BPS_LENGTH,
            )?;
        }

        metadata.extend_from_slice(&self.domain_path().encode()?);
        metadata.extend_from_slice(&self.asset_hash);

        if metadata.len() > metadata_max_len {
            debug!(
                "Genesis needs {} bytes but only {} available",
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

    /// Decode the genesis record from a metadata buffer
    pub fn decode(metadata: &[u8]) -> CodecResult<Self> {
        let payload = locate_range(metadata, Some(GENESIS_PREFIX))?;
        let mut reader = MetadataReader::new(payload);

        let qty_encoded = reader.read_uint(QTY_FLAGS_LENGTH)?;
        let qty_packed = qty_encoded & QTY_MASK;

        let (charge_flat_mantissa, charge_flat_exponent) = if qty_encoded & FLAG_CHARGE_FLAT != 0 {
            let charge_encoded = reader.read_uint(CHARGE_FLAT_LENGTH)?;
            (
                charge_encoded % CHARGE_FLAT_EXPONENT_MULTIPLE,
                charge_encoded / CHARGE_FLAT_EXPONENT_MULTIPLE,
            )
        } else {
            (0, 0)
        };

        let charge_basis_points = if qty_encoded & FLAG_CHARGE_BPS != 0 {
            reader.read_u8()?
        } else {
            0
        };

        let location = DomainPath::decode(&mut reader)?;

        let hash_len = reader.remaining().min(GENESIS_HASH_MAX_LEN);
        let asset_hash = reader.read_bytes(hash_len)?.to_vec();

        let genesis = GenesisRecord {
            qty_mantissa: (qty_packed % QTY_EXPONENT_MULTIPLE) as u16,
            qty_exponent: (qty_packed / QTY_EXPONENT_MULTIPLE) as u8,
            charge_flat_mantissa: charge_flat_mantissa as u8,
            charge_flat_exponent: charge_flat_exponent as u8,
            charge_basis_points,
            use_https: location.use_https,
            domain_name: location.domain_name,
            use_prefix: location.use_prefix,
            page_path: location.page_path,
            asset_hash,
        };

        genesis.validate()?;
        Ok(genesis)
    }
}
