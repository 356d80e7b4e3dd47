//! Quantity flow engine
//!
//! - `fees`: fee basis and minimum fees for genesis and transfer metadata
//! - `apply`: genesis issue, transfer application and default routes
//!
//! The helpers here combine both with script framing to answer the usual
//! wallet question: how many units of an asset does one output hold?

pub mod apply;
pub mod fees;

use bitcoin::ScriptBuf;
use tracing::debug;

use crate::script::{script_is_regular, scripts_to_metadata};
use crate::types::asset_ref::AssetRef;
use crate::types::common::{AssetQty, SatoshiQty};
use crate::types::genesis::GenesisRecord;
use crate::types::transfer::TransferList;

pub use apply::{apply_genesis, apply_none, apply_transfers, default_outputs, default_route_map};
pub use fees::{genesis_min_fee, min_fee_basis, transfers_min_fee};

/// Outputs and fee of one transaction, as needed for quantity calculations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionOutputs {
    pub scripts: Vec<ScriptBuf>,
    pub satoshis: Vec<SatoshiQty>,
    pub fee: SatoshiQty,
}

impl TransactionOutputs {
    pub fn new(scripts: Vec<ScriptBuf>, satoshis: Vec<SatoshiQty>, fee: SatoshiQty) -> Self {
        Self {
            scripts,
            satoshis,
            fee,
        }
    }

    pub fn count_outputs(&self) -> usize {
        self.scripts.len()
    }

    /// Which outputs can hold asset units
    pub fn regular_flags(&self) -> Vec<bool> {
        self.scripts.iter().map(|s| script_is_regular(s)).collect()
    }

    /// Metadata carried by the transaction, if any
    pub fn metadata(&self) -> Option<Vec<u8>> {
        scripts_to_metadata(&self.scripts)
    }

    /// Genesis carried by the transaction, provided its fee is high enough
    fn valid_genesis(&self) -> Option<GenesisRecord> {
        let metadata = self.metadata()?;
        let genesis = match GenesisRecord::decode(&metadata) {
            Ok(genesis) => genesis,
            Err(e) => {
                debug!("No usable genesis in transaction: {}", e);
                return None;
            }
        };

        let min_fee = genesis.calc_min_fee(&self.satoshis, &self.regular_flags());
        if self.fee < min_fee {
            debug!("Genesis fee {} below minimum {}", self.fee, min_fee);
            return None;
        }

        Some(genesis)
    }
}

/// Units of a newly issued asset held by `output_index` of the genesis
/// transaction, 0 when the transaction does not validly issue one.
pub fn get_genesis_output_qty(genesis_tx: &TransactionOutputs, output_index: usize) -> AssetQty {
    genesis_tx
        .valid_genesis()
        .and_then(|genesis| {
            genesis
                .apply(&genesis_tx.regular_flags())
                .get(output_index)
                .copied()
        })
        .unwrap_or(0)
}

/// Units of `asset_ref` held by `output_index` of a spending transaction.
///
/// Returns 0 when the genesis transaction is not valid or the spending
/// transaction's transfer list cannot be fully decoded. If the spending
/// transaction's fee is too low for its transfers, every input follows its
/// default route.
pub fn get_transfer_output_qty(
    genesis_tx: &TransactionOutputs,
    asset_ref: &AssetRef,
    input_balances: &[AssetQty],
    this_tx: &TransactionOutputs,
    output_index: usize,
) -> AssetQty {
    let Some(genesis) = genesis_tx.valid_genesis() else {
        return 0;
    };

    let count_inputs = input_balances.len();
    let count_outputs = this_tx.count_outputs();

    let transfers = match this_tx.metadata() {
        Some(metadata) => {
            let expected = TransferList::decode_count(&metadata).unwrap_or(0);
            if expected == 0 {
                TransferList::default()
            } else {
                match TransferList::decode(&metadata, count_inputs, count_outputs) {
                    Ok(list) if list.len() == expected => list,
                    Ok(list) => {
                        debug!("Decoded {} of {} transfers", list.len(), expected);
                        return 0;
                    }
                    Err(e) => {
                        debug!("Transfer list failed to decode: {}", e);
                        return 0;
                    }
                }
            }
        }
        None => TransferList::default(),
    };

    let outputs_regular = this_tx.regular_flags();
    let min_fee = transfers.calc_min_fee(count_inputs, &this_tx.satoshis, &outputs_regular);

    let balances = if this_tx.fee >= min_fee {
        transfers.apply(asset_ref, &genesis, input_balances, &outputs_regular)
    } else {
        debug!("Transfer fee {} below minimum {}", this_tx.fee, min_fee);
        apply_none(asset_ref, &genesis, input_balances, &outputs_regular)
    };

    balances.get(output_index).copied().unwrap_or(0)
}
