//! Transfer list wire format
//!
//! ```text
//! SPK t [transfer] [transfer] ...
//! transfer: [packing] [extend]? [block] [offset] [txid prefix:2] [first in] [count in]
//!           [first out] [count out] [quantity]
//! ```
//!
//! The packing byte holds three fields: asset reference packing (0xC0),
//! index packing (0x38) and quantity packing (0x07). Every transfer is
//! encoded relative to the one before it in encoding order, so repeated
//! references, ranges and quantities cost nothing.

use tracing::{debug, trace};

use super::metadata::locate_range;
use super::packing::{IndicesPacking, RangePacking, PACKING_INDICES_EXTEND, PACKING_INDICES_MASK};
use crate::errors::{CodecError, CodecResult};
use crate::types::asset_ref::{AssetRef, TXID_PREFIX_LEN};
use crate::types::common::{
    AssetQty, CodecLimits, ASSET_QTY_MAX, IO_INDEX_MAX, METADATA_IDENTIFIER, TRANSFERS_PREFIX,
    UNSIGNED_2_BYTES_MAX, UNSIGNED_3_BYTES_MAX, UNSIGNED_4_BYTES_MAX, UNSIGNED_BYTE_MAX,
};
use crate::types::io_range::IoRange;
use crate::types::transfer::{TransferList, TransferRecord};
use crate::utils::bytes::{write_small_endian, MetadataReader};
use crate::utils::math::{mantissa_exponent_to_qty, qty_to_mantissa_exponent, Rounding};

const PACKING_GENESIS_MASK: u8 = 0xC0;
const PACKING_GENESIS_PREV: u8 = 0x00;
const PACKING_GENESIS_3_3_BYTES: u8 = 0x40;
const PACKING_GENESIS_3_4_BYTES: u8 = 0x80;
const PACKING_GENESIS_4_4_BYTES: u8 = 0xC0;

const PACKING_QUANTITY_MASK: u8 = 0x07;
const PACKING_QUANTITY_1P: u8 = 0x00;
const PACKING_QUANTITY_1_BYTE: u8 = 0x01;
const PACKING_QUANTITY_2_BYTES: u8 = 0x02;
const PACKING_QUANTITY_3_BYTES: u8 = 0x03;
const PACKING_QUANTITY_4_BYTES: u8 = 0x04;
const PACKING_QUANTITY_6_BYTES: u8 = 0x05;
const PACKING_QUANTITY_FLOAT: u8 = 0x06;
const PACKING_QUANTITY_MAX: u8 = 0x07;

const QTY_FLOAT_LENGTH: usize = 2;
const QTY_FLOAT_MANTISSA_MAX: u64 = 1000;
const QTY_FLOAT_EXPONENT_MAX: u32 = 11;
const QTY_FLOAT_MASK: u64 = 0x3FFF;
const QTY_FLOAT_EXPONENT_MULTIPLE: u64 = 1001;

/// Bytes used for block number and transaction offset
fn asset_ref_field_bytes(packing: u8) -> (usize, usize) {
    match packing & PACKING_GENESIS_MASK {
        PACKING_GENESIS_3_3_BYTES => (3, 3),
        PACKING_GENESIS_3_4_BYTES => (3, 4),
        PACKING_GENESIS_4_4_BYTES => (4, 4),
        _ => (0, 0),
    }
}

fn quantity_field_bytes(packing: u8) -> usize {
    match packing & PACKING_QUANTITY_MASK {
        PACKING_QUANTITY_1_BYTE => 1,
        PACKING_QUANTITY_2_BYTES => 2,
        PACKING_QUANTITY_3_BYTES => 3,
        PACKING_QUANTITY_4_BYTES => 4,
        PACKING_QUANTITY_6_BYTES => 6,
        PACKING_QUANTITY_FLOAT => QTY_FLOAT_LENGTH,
        _ => 0,
    }
}

fn asset_ref_packing(transfer: &TransferRecord, previous: Option<&TransferRecord>) -> CodecResult<u8> {
    match transfer.asset_ref {
        AssetRef::DefaultRoute => match previous {
            Some(prev) if !prev.is_default_route() => Err(CodecError::validation(
                "default route transfers must come before all others",
            )),
            _ => Ok(PACKING_GENESIS_PREV),
        },
        AssetRef::Explicit {
            block_num,
            tx_offset,
            ..
        } => {
            if previous.is_some_and(|prev| prev.asset_ref == transfer.asset_ref) {
                return Ok(PACKING_GENESIS_PREV);
            }

            let block_num = u64::from(block_num);
            let tx_offset = u64::from(tx_offset);

            if block_num <= UNSIGNED_3_BYTES_MAX {
                if tx_offset <= UNSIGNED_3_BYTES_MAX {
                    Ok(PACKING_GENESIS_3_3_BYTES)
                } else {
                    Ok(PACKING_GENESIS_3_4_BYTES)
                }
            } else if block_num <= UNSIGNED_4_BYTES_MAX && tx_offset <= UNSIGNED_4_BYTES_MAX {
                Ok(PACKING_GENESIS_4_4_BYTES)
            } else {
                Err(CodecError::validation("asset reference does not fit 4+4 bytes"))
            }
        }
    }
}

/// Quantity packing bits and the value to write
fn quantity_packing(qty: AssetQty, previous: Option<&TransferRecord>) -> (u8, u64) {
    let implied = previous.map_or(1, |prev| prev.qty_per_output);

    if qty == implied {
        return (PACKING_QUANTITY_1P, 0);
    }
    if qty >= ASSET_QTY_MAX {
        return (PACKING_QUANTITY_MAX, 0);
    }
    if qty <= UNSIGNED_BYTE_MAX {
        return (PACKING_QUANTITY_1_BYTE, qty);
    }
    if qty <= UNSIGNED_2_BYTES_MAX {
        return (PACKING_QUANTITY_2_BYTES, qty);
    }

    let float = qty_to_mantissa_exponent(
        qty,
        Rounding::Nearest,
        QTY_FLOAT_MANTISSA_MAX,
        QTY_FLOAT_EXPONENT_MAX,
    );
    if float.qty == qty {
        let encoded = (u64::from(float.exponent) * QTY_FLOAT_EXPONENT_MULTIPLE + float.mantissa)
            & QTY_FLOAT_MASK;
        return (PACKING_QUANTITY_FLOAT, encoded);
    }

    if qty <= UNSIGNED_3_BYTES_MAX {
        (PACKING_QUANTITY_3_BYTES, qty)
    } else if qty <= UNSIGNED_4_BYTES_MAX {
        (PACKING_QUANTITY_4_BYTES, qty)
    } else {
        (PACKING_QUANTITY_6_BYTES, qty)
    }
}

impl TransferRecord {
    /// Append this transfer's encoding, relative to `previous`, to `out`
    pub fn encode_into(
        &self,
        out: &mut Vec<u8>,
        previous: Option<&TransferRecord>,
        count_inputs: usize,
        count_outputs: usize,
    ) -> CodecResult<()> {
        self.validate()?;

        let mut packing = asset_ref_packing(self, previous)?;

        let indices = IndicesPacking::choose(
            previous.map(|prev| (&prev.inputs, &prev.outputs)),
            &self.inputs,
            &self.outputs,
            count_inputs,
            count_outputs,
        )
        .ok_or_else(|| CodecError::validation("index range cannot be packed"))?;
        packing |= indices.indices_bits;

        let (qty_bits, qty_value) = quantity_packing(self.qty_per_output, previous);
        packing |= qty_bits;

        trace!(
            "Transfer packing {:#04x} extend {:?} for {}",
            packing,
            indices.extend,
            self.asset_ref
        );

        out.push(packing);
        if let Some(extend) = indices.extend {
            out.push(extend);
        }

        let (block_bytes, offset_bytes) = asset_ref_field_bytes(packing);
        if let AssetRef::Explicit {
            block_num,
            tx_offset,
            txid_prefix,
        } = self.asset_ref
        {
            if block_bytes > 0 {
                write_small_endian(out, u64::from(block_num), block_bytes)?;
                write_small_endian(out, u64::from(tx_offset), offset_bytes)?;
                out.extend_from_slice(&txid_prefix);
            }
        }

        let (first_in_bytes, count_in_bytes) = indices.inputs.field_bytes();
        let (first_out_bytes, count_out_bytes) = indices.outputs.field_bytes();
        write_small_endian(out, u64::from(self.inputs.first), first_in_bytes)?;
        write_small_endian(out, u64::from(self.inputs.count), count_in_bytes)?;
        write_small_endian(out, u64::from(self.outputs.first), first_out_bytes)?;
        write_small_endian(out, u64::from(self.outputs.count), count_out_bytes)?;

        write_small_endian(out, qty_value, quantity_field_bytes(packing))?;

        Ok(())
    }

    /// Decode one transfer from the reader, relative to `previous`
    pub fn decode_from(
        reader: &mut MetadataReader<'_>,
        previous: Option<&TransferRecord>,
        count_inputs: usize,
        count_outputs: usize,
    ) -> CodecResult<Self> {
        let offset = reader.position();
        let packing = reader.read_u8()?;

        let (input_packing, output_packing) = if packing & PACKING_INDICES_MASK
            == PACKING_INDICES_EXTEND
        {
            let extend = reader.read_u8()?;
            IndicesPacking::from_extend_byte(extend).ok_or_else(|| {
                CodecError::malformed(format!("bad extend packing byte {:#04x}", extend))
            })?
        } else {
            IndicesPacking::from_indices_bits(packing).ok_or_else(|| {
                CodecError::malformed(format!("bad index packing in byte {:#04x}", packing))
            })?
        };

        let (block_bytes, offset_bytes) = asset_ref_field_bytes(packing);
        let asset_ref = if block_bytes == 0 {
            previous.map_or(AssetRef::DefaultRoute, |prev| prev.asset_ref)
        } else {
            let block_num = reader.read_uint(block_bytes)? as u32;
            let tx_offset = reader.read_uint(offset_bytes)? as u32;
            let prefix = reader.read_bytes(TXID_PREFIX_LEN)?;
            AssetRef::new(block_num, tx_offset, [prefix[0], prefix[1]])
        };

        let inputs = read_range(
            reader,
            input_packing,
            previous.map(|prev| &prev.inputs),
            count_inputs,
        )?;
        let outputs = read_range(
            reader,
            output_packing,
            previous.map(|prev| &prev.outputs),
            count_outputs,
        )?;

        let raw_qty = reader.read_uint(quantity_field_bytes(packing))?;
        let qty_per_output = match packing & PACKING_QUANTITY_MASK {
            PACKING_QUANTITY_1P => previous.map_or(1, |prev| prev.qty_per_output),
            PACKING_QUANTITY_MAX => ASSET_QTY_MAX,
            PACKING_QUANTITY_FLOAT => {
                let encoded = raw_qty & QTY_FLOAT_MASK;
                mantissa_exponent_to_qty(
                    encoded % QTY_FLOAT_EXPONENT_MULTIPLE,
                    (encoded / QTY_FLOAT_EXPONENT_MULTIPLE) as u32,
                )
            }
            _ => raw_qty,
        };

        let transfer = TransferRecord {
            asset_ref,
            inputs,
            outputs,
            qty_per_output,
        };

        transfer.validate().map_err(|e| {
            debug!("Invalid transfer at offset {}: {}", offset, e);
            e
        })?;

        Ok(transfer)
    }
}

fn read_range(
    reader: &mut MetadataReader<'_>,
    packing: RangePacking,
    previous: Option<&IoRange>,
    count_io: usize,
) -> CodecResult<IoRange> {
    let mut range = packing.implied_range(previous, count_io);
    let (first_bytes, count_bytes) = packing.field_bytes();

    if first_bytes > 0 {
        range.first = reader.read_uint(first_bytes)? as u32;
    }
    if count_bytes > 0 {
        range.count = reader.read_uint(count_bytes)? as u32;
    }

    Ok(range)
}

impl TransferList {
    /// Encode the list in group order as a standalone metadata buffer
    pub fn encode(
        &self,
        count_inputs: usize,
        count_outputs: usize,
        limits: &CodecLimits,
    ) -> CodecResult<Vec<u8>> {
        if self.len() > limits.max_transfers {
            return Err(CodecError::TooManyTransfers {
                count: self.len(),
                max: limits.max_transfers,
            });
        }

        let mut metadata = Vec::with_capacity(limits.metadata_max_len);
        metadata.extend_from_slice(METADATA_IDENTIFIER);
        metadata.push(TRANSFERS_PREFIX);

        let mut previous: Option<&TransferRecord> = None;
        for index in self.group_ordering() {
            let transfer = &self.transfers[index];
            transfer.encode_into(&mut metadata, previous, count_inputs, count_outputs)?;
            previous = Some(transfer);
        }

        if metadata.len() > limits.metadata_max_len {
            debug!(
                "{} transfers need {} bytes but only {} available",
                self.len(),
                metadata.len(),
                limits.metadata_max_len
            );
            return Err(CodecError::Capacity {
                needed: metadata.len(),
                available: limits.metadata_max_len,
            });
        }

        Ok(metadata)
    }

    /// Decode every transfer in the metadata's transfer record
    pub fn decode(metadata: &[u8], count_inputs: usize, count_outputs: usize) -> CodecResult<Self> {
        let (list, _) = Self::decode_limited(metadata, usize::MAX, count_inputs, count_outputs)?;
        Ok(list)
    }

    /// Decode at most `max_transfers` entries, also returning the total
    /// number of entries present.
    ///
    /// Entries beyond the cap are still decoded and validated so a corrupt
    /// tail fails the whole list.
    pub fn decode_limited(
        metadata: &[u8],
        max_transfers: usize,
        count_inputs: usize,
        count_outputs: usize,
    ) -> CodecResult<(Self, usize)> {
        let payload = locate_range(metadata, Some(TRANSFERS_PREFIX))?;
        let mut reader = MetadataReader::new(payload);

        let mut transfers = Vec::new();
        let mut previous: Option<TransferRecord> = None;
        let mut total = 0usize;

        while !reader.is_empty() {
            let transfer = TransferRecord::decode_from(
                &mut reader,
                previous.as_ref(),
                count_inputs,
                count_outputs,
            )?;

            if transfers.len() < max_transfers {
                transfers.push(transfer);
            }
            total += 1;
            previous = Some(transfer);
        }

        Ok((Self::new(transfers), total))
    }

    /// Number of transfers present, decoding with the widest index space
    pub fn decode_count(metadata: &[u8]) -> CodecResult<usize> {
        let max_index = IO_INDEX_MAX as usize;
        let (_, total) = Self::decode_limited(metadata, 0, max_index, max_index)?;
        Ok(total)
    }
}
