//! Minimum transaction fees for genesis and transfer metadata
//!
//! Metadata only takes effect when the bitcoin fee covers one fee basis per
//! output the metadata creates work for. The basis is the smallest regular
//! output value, capped at 1000 satoshis.

use tracing::debug;

use crate::types::common::{SatoshiQty, FEE_BASIS_MAX_SATOSHIS, SATOSHI_QTY_MAX};
use crate::types::genesis::GenesisRecord;
use crate::types::transfer::{TransferList, TransferRecord};

/// Per-output fee unit for a transaction
pub fn min_fee_basis(outputs_satoshis: &[SatoshiQty], outputs_regular: &[bool]) -> SatoshiQty {
    let smallest = outputs_satoshis
        .iter()
        .zip(outputs_regular)
        .filter(|(_, &regular)| regular)
        .map(|(&satoshis, _)| satoshis)
        .min()
        .unwrap_or(SATOSHI_QTY_MAX);

    smallest.min(FEE_BASIS_MAX_SATOSHIS)
}

/// Index of the last regular output, if there is one
pub fn last_regular_output(outputs_regular: &[bool]) -> Option<usize> {
    outputs_regular.iter().rposition(|&regular| regular)
}

/// Number of regular outputs other than the last one
pub fn count_non_last_regular(outputs_regular: &[bool]) -> usize {
    outputs_regular
        .iter()
        .filter(|&&regular| regular)
        .count()
        .saturating_sub(1)
}

fn lengths_match(outputs_satoshis: &[SatoshiQty], outputs_regular: &[bool]) -> bool {
    if outputs_satoshis.len() != outputs_regular.len() {
        debug!(
            "Output value count {} does not match regular flag count {}",
            outputs_satoshis.len(),
            outputs_regular.len()
        );
        return false;
    }
    true
}

/// Fee needed for a genesis to issue anything.
///
/// Every regular output except the last receives part of the issue, so each
/// of them costs one fee basis.
pub fn genesis_min_fee(outputs_satoshis: &[SatoshiQty], outputs_regular: &[bool]) -> SatoshiQty {
    if !lengths_match(outputs_satoshis, outputs_regular) {
        return SATOSHI_QTY_MAX;
    }

    (count_non_last_regular(outputs_regular) as SatoshiQty)
        .saturating_mul(min_fee_basis(outputs_satoshis, outputs_regular))
}

/// Fee needed for a transfer list to be applied.
///
/// One fee basis is charged for each pair of explicit transfer and regular
/// output it names, counting only transfers with at least one real input.
pub fn transfers_min_fee(
    transfers: &[TransferRecord],
    count_inputs: usize,
    outputs_satoshis: &[SatoshiQty],
    outputs_regular: &[bool],
) -> SatoshiQty {
    if !lengths_match(outputs_satoshis, outputs_regular) {
        return SATOSHI_QTY_MAX;
    }

    let count_outputs = outputs_regular.len();
    let transfers_to_cover: usize = transfers
        .iter()
        .filter(|t| {
            !t.is_default_route() && t.inputs.count > 0 && (t.inputs.first as usize) < count_inputs
        })
        .map(|t| {
            t.outputs
                .clipped(count_outputs)
                .filter(|&index| outputs_regular[index])
                .count()
        })
        .sum();

    (transfers_to_cover as SatoshiQty)
        .saturating_mul(min_fee_basis(outputs_satoshis, outputs_regular))
}

impl GenesisRecord {
    pub fn calc_min_fee(&self, outputs_satoshis: &[SatoshiQty], outputs_regular: &[bool]) -> SatoshiQty {
        genesis_min_fee(outputs_satoshis, outputs_regular)
    }
}

impl TransferList {
    pub fn calc_min_fee(
        &self,
        count_inputs: usize,
        outputs_satoshis: &[SatoshiQty],
        outputs_regular: &[bool],
    ) -> SatoshiQty {
        transfers_min_fee(&self.transfers, count_inputs, outputs_satoshis, outputs_regular)
    }
}
