//! Payment reference wire format: `SPK r` followed by the value in as few
//! small-endian bytes as it needs (none for zero).

use super::metadata::locate_range;
use crate::errors::{CodecError, CodecResult};
use crate::types::common::{METADATA_IDENTIFIER, PAYMENT_REF_PREFIX};
use crate::types::payment_ref::PaymentRef;
use crate::utils::bytes::{byte_len, read_small_endian, write_small_endian, MAX_FIELD_BYTES};

impl PaymentRef {
    pub fn encode(&self, metadata_max_len: usize) -> CodecResult<Vec<u8>> {
        self.validate()?;

        let bytes = byte_len(self.0);
        let mut metadata = Vec::with_capacity(METADATA_IDENTIFIER.len() + 1 + bytes);
        metadata.extend_from_slice(METADATA_IDENTIFIER);
        metadata.push(PAYMENT_REF_PREFIX);
        write_small_endian(&mut metadata, self.0, bytes)?;

        if metadata.len() > metadata_max_len {
            return Err(CodecError::Capacity {
                needed: metadata.len(),
                available: metadata_max_len,
            });
        }

        Ok(metadata)
    }

    pub fn decode(metadata: &[u8]) -> CodecResult<Self> {
        let payload = locate_range(metadata, Some(PAYMENT_REF_PREFIX))?;

        if payload.len() > MAX_FIELD_BYTES {
            return Err(CodecError::malformed(format!(
                "payment reference of {} bytes",
                payload.len()
            )));
        }

        let payment_ref = PaymentRef(read_small_endian(payload, payload.len())?);
        payment_ref.validate()?;
        Ok(payment_ref)
    }
}
