//! Transfer records and ordered transfer lists
//!
//! A transfer moves `qty_per_output` units of one asset from a range of
//! inputs to every regular output in a range of outputs. Default-route
//! entries instead name the output that receives whatever is left on a range
//! of inputs after explicit transfers.

use serde::{Deserialize, Serialize};

use crate::errors::{CodecError, CodecResult};
use crate::types::asset_ref::AssetRef;
use crate::types::common::{AssetQty, ASSET_QTY_MAX};
use crate::types::io_range::IoRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub asset_ref: AssetRef,
    pub inputs: IoRange,
    pub outputs: IoRange,
    pub qty_per_output: AssetQty,
}

impl TransferRecord {
    /// Quantity meaning "everything available on the inputs"
    pub const TRANSFER_ALL: AssetQty = ASSET_QTY_MAX;

    pub fn new(asset_ref: AssetRef, inputs: IoRange, outputs: IoRange, qty_per_output: AssetQty) -> Self {
        Self {
            asset_ref,
            inputs,
            outputs,
            qty_per_output,
        }
    }

    /// Route leftovers on `inputs` to `output_index`
    pub fn default_route(inputs: IoRange, output_index: u32) -> Self {
        Self {
            asset_ref: AssetRef::DefaultRoute,
            inputs,
            outputs: IoRange::single(output_index),
            qty_per_output: 0,
        }
    }

    pub fn is_default_route(&self) -> bool {
        self.asset_ref.is_default_route()
    }

    pub fn validate(&self) -> CodecResult<()> {
        if !self.inputs.is_valid() {
            return Err(CodecError::validation(format!(
                "input range {}+{} out of bounds",
                self.inputs.first, self.inputs.count
            )));
        }

        if !self.outputs.is_valid() {
            return Err(CodecError::validation(format!(
                "output range {}+{} out of bounds",
                self.outputs.first, self.outputs.count
            )));
        }

        if self.qty_per_output > ASSET_QTY_MAX {
            return Err(CodecError::validation(format!(
                "quantity per output {} above {}",
                self.qty_per_output, ASSET_QTY_MAX
            )));
        }

        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Compare two transfers.
    ///
    /// For default routes only the input range and first output matter.
    pub fn matches(&self, other: &TransferRecord) -> bool {
        let partial = self.inputs == other.inputs && self.outputs.first == other.outputs.first;

        if self.is_default_route() {
            other.is_default_route() && partial
        } else {
            self.asset_ref == other.asset_ref
                && partial
                && self.outputs.count == other.outputs.count
                && self.qty_per_output == other.qty_per_output
        }
    }
}

/// Ordered list of transfers carried in one transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferList {
    pub transfers: Vec<TransferRecord>,
}

impl TransferList {
    pub fn new(transfers: Vec<TransferRecord>) -> Self {
        Self { transfers }
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TransferRecord> {
        self.transfers.iter()
    }

    pub fn validate(&self) -> CodecResult<()> {
        self.transfers.iter().try_for_each(TransferRecord::validate)
    }

    /// Order in which the transfers are encoded.
    ///
    /// Default routes come first, then each step prefers a transfer sharing
    /// the asset reference just chosen. Ties go to the lowest reference and
    /// then to the earliest position in the list.
    pub fn group_ordering(&self) -> Vec<usize> {
        let transfers = &self.transfers;
        let mut used = vec![false; transfers.len()];
        let mut ordering: Vec<usize> = Vec::with_capacity(transfers.len());

        for _ in 0..transfers.len() {
            let previous_ref = ordering.last().map(|&index| transfers[index].asset_ref);
            let mut best: Option<(u8, usize)> = None;

            for (index, transfer) in transfers.iter().enumerate() {
                if used[index] {
                    continue;
                }

                let score = if transfer.is_default_route() {
                    3
                } else if previous_ref == Some(transfer.asset_ref) {
                    2
                } else {
                    1
                };

                best = match best {
                    Some((best_score, best_index))
                        if score < best_score
                            || (score == best_score
                                && transfer.asset_ref >= transfers[best_index].asset_ref) =>
                    {
                        Some((best_score, best_index))
                    }
                    _ => Some((score, index)),
                };
            }

            if let Some((_, index)) = best {
                used[index] = true;
                ordering.push(index);
            }
        }

        ordering
    }

    /// Transfers in encoding order
    pub fn grouped(&self) -> Vec<TransferRecord> {
        self.group_ordering()
            .into_iter()
            .map(|index| self.transfers[index])
            .collect()
    }

    /// Compare two lists.
    ///
    /// Strict matching compares position by position; otherwise both lists
    /// are compared in their encoding order.
    pub fn matches(&self, other: &TransferList, strict: bool) -> bool {
        if self.len() != other.len() {
            return false;
        }

        if strict {
            self.transfers
                .iter()
                .zip(&other.transfers)
                .all(|(a, b)| a.matches(b))
        } else {
            self.grouped()
                .iter()
                .zip(other.grouped().iter())
                .all(|(a, b)| a.matches(b))
        }
    }
}

impl From<Vec<TransferRecord>> for TransferList {
    fn from(transfers: Vec<TransferRecord>) -> Self {
        Self::new(transfers)
    }
}

impl<'a> IntoIterator for &'a TransferList {
    type Item = &'a TransferRecord;
    type IntoIter = std::slice::Iter<'a, TransferRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.transfers.iter()
    }
}
