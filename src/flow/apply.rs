//! Asset quantity flow through a transaction
//!
//! Explicit transfers drain inputs in order, charges are taken from what
//! they deliver, and whatever is left on each input follows its default
//! route.

use tracing::trace;

use super::fees::{count_non_last_regular, last_regular_output};
use crate::types::asset_ref::AssetRef;
use crate::types::common::AssetQty;
use crate::types::genesis::GenesisRecord;
use crate::types::transfer::{TransferList, TransferRecord};

/// Output that receives each input's leftovers, `None` when no regular
/// output exists.
///
/// Inputs default to the last regular output. Default-route entries then
/// override that, with the earliest entry in the list taking precedence.
pub fn default_route_map(
    transfers: &[TransferRecord],
    count_inputs: usize,
    outputs_regular: &[bool],
) -> Vec<Option<usize>> {
    let count_outputs = outputs_regular.len();
    let mut map = vec![last_regular_output(outputs_regular); count_inputs];

    for transfer in transfers.iter().rev().filter(|t| t.is_default_route()) {
        let output_index = transfer.outputs.first as usize;
        if output_index >= count_outputs {
            continue;
        }

        for input_index in transfer.inputs.clipped(count_inputs) {
            map[input_index] = Some(output_index);
        }
    }

    map
}

/// Initial distribution of a newly issued asset.
///
/// Every regular output except the last receives an equal share and the
/// first of them also takes the rounding remainder.
pub fn apply_genesis(genesis: &GenesisRecord, outputs_regular: &[bool]) -> Vec<AssetQty> {
    let last_regular = last_regular_output(outputs_regular);
    let divide_outputs = count_non_last_regular(outputs_regular) as AssetQty;
    let genesis_qty = genesis.qty();

    let qty_per_output = genesis_qty.checked_div(divide_outputs).unwrap_or(0);
    let mut extra_first_output = genesis_qty - qty_per_output * divide_outputs;

    outputs_regular
        .iter()
        .enumerate()
        .map(|(index, &regular)| {
            if regular && Some(index) != last_regular {
                let qty = qty_per_output + extra_first_output;
                extra_first_output = 0;
                qty
            } else {
                0
            }
        })
        .collect()
}

/// Output balances of `asset_ref` after applying `transfers`
pub fn apply_transfers(
    asset_ref: &AssetRef,
    genesis: &GenesisRecord,
    transfers: &[TransferRecord],
    input_balances: &[AssetQty],
    outputs_regular: &[bool],
) -> Vec<AssetQty> {
    let count_inputs = input_balances.len();
    let count_outputs = outputs_regular.len();

    let mut inputs_remaining = input_balances.to_vec();
    let mut output_balances: Vec<AssetQty> = vec![0; count_outputs];

    let matching = transfers
        .iter()
        .filter(|t| !t.is_default_route() && t.asset_ref == *asset_ref);

    for transfer in matching {
        let inputs = transfer.inputs.clipped(count_inputs);
        let mut input_index = inputs.start;

        for output_index in transfer.outputs.clipped(count_outputs) {
            if !outputs_regular[output_index] {
                continue;
            }

            let mut transfer_remaining = transfer.qty_per_output;

            while input_index < inputs.end {
                let quantity = transfer_remaining.min(inputs_remaining[input_index]);
                inputs_remaining[input_index] -= quantity;
                transfer_remaining -= quantity;
                output_balances[output_index] = output_balances[output_index].saturating_add(quantity);

                if transfer_remaining > 0 {
                    input_index += 1;
                } else {
                    break;
                }
            }
        }
    }

    for (balance, _) in output_balances
        .iter_mut()
        .zip(outputs_regular)
        .filter(|(_, &regular)| regular)
    {
        *balance = genesis.calc_net(*balance);
    }

    let route_map = default_route_map(transfers, count_inputs, outputs_regular);
    for (input_index, default_output) in route_map.into_iter().enumerate() {
        if let Some(output_index) = default_output {
            output_balances[output_index] =
                output_balances[output_index].saturating_add(inputs_remaining[input_index]);
        } else if inputs_remaining[input_index] > 0 {
            trace!(
                "Input {} has {} units and no output to route them to",
                input_index,
                inputs_remaining[input_index]
            );
        }
    }

    output_balances
}

/// Output balances when the transfers do not take effect
pub fn apply_none(
    asset_ref: &AssetRef,
    genesis: &GenesisRecord,
    input_balances: &[AssetQty],
    outputs_regular: &[bool],
) -> Vec<AssetQty> {
    apply_transfers(asset_ref, genesis, &[], input_balances, outputs_regular)
}

/// Outputs that receive at least one input's leftovers
pub fn default_outputs(
    transfers: &[TransferRecord],
    count_inputs: usize,
    outputs_regular: &[bool],
) -> Vec<bool> {
    let mut outputs_default = vec![false; outputs_regular.len()];

    for output_index in default_route_map(transfers, count_inputs, outputs_regular)
        .into_iter()
        .flatten()
    {
        outputs_default[output_index] = true;
    }

    outputs_default
}

impl GenesisRecord {
    /// See [`apply_genesis`]
    pub fn apply(&self, outputs_regular: &[bool]) -> Vec<AssetQty> {
        apply_genesis(self, outputs_regular)
    }
}

impl TransferList {
    /// See [`apply_transfers`]
    pub fn apply(
        &self,
        asset_ref: &AssetRef,
        genesis: &GenesisRecord,
        input_balances: &[AssetQty],
        outputs_regular: &[bool],
    ) -> Vec<AssetQty> {
        apply_transfers(
            asset_ref,
            genesis,
            &self.transfers,
            input_balances,
            outputs_regular,
        )
    }

    pub fn default_outputs(&self, count_inputs: usize, outputs_regular: &[bool]) -> Vec<bool> {
        default_outputs(&self.transfers, count_inputs, outputs_regular)
    }
}
