//! Index range packing for transfer records
//!
//! Each input or output range of a transfer is written using the first
//! applicable strategy from a fixed priority list. Seven common
//! input/output combinations fit in the main packing byte; anything else
//! spends an extension byte holding a 3-bit code per side.

use crate::types::common::{UNSIGNED_2_BYTES_MAX, UNSIGNED_BYTE_MAX};
use crate::types::io_range::IoRange;

pub const PACKING_INDICES_MASK: u8 = 0x38;
pub const PACKING_INDICES_EXTEND: u8 = 0x38;
pub const PACKING_EXTEND_INPUTS_SHIFT: u8 = 3;
pub const PACKING_EXTEND_OUTPUTS_SHIFT: u8 = 0;
pub const PACKING_EXTEND_MASK: u8 = 0x07;

/// How one index range is represented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePacking {
    /// Same as the previous range, or index 0 alone when there is none
    ZeroOrPrevious,
    /// Single index right after the previous range, or index 1 alone
    OneOrSubsequent,
    /// Every input or output of the transaction
    All,
    /// Single index in one byte
    Byte,
    /// Single index in two bytes
    TwoBytes,
    OneOneBytes,
    TwoOneBytes,
    TwoTwoBytes,
}

impl RangePacking {
    /// Order in which strategies are tried when encoding
    pub const PRIORITY: [RangePacking; 8] = [
        RangePacking::ZeroOrPrevious,
        RangePacking::OneOrSubsequent,
        RangePacking::All,
        RangePacking::Byte,
        RangePacking::TwoBytes,
        RangePacking::OneOneBytes,
        RangePacking::TwoOneBytes,
        RangePacking::TwoTwoBytes,
    ];

    /// 3-bit code used in the extension byte
    pub fn extend_code(self) -> u8 {
        match self {
            RangePacking::ZeroOrPrevious => 0,
            RangePacking::OneOrSubsequent => 1,
            RangePacking::Byte => 2,
            RangePacking::TwoBytes => 3,
            RangePacking::OneOneBytes => 4,
            RangePacking::TwoOneBytes => 5,
            RangePacking::TwoTwoBytes => 6,
            RangePacking::All => 7,
        }
    }

    pub fn from_extend_code(code: u8) -> Option<Self> {
        Self::PRIORITY
            .iter()
            .copied()
            .find(|packing| packing.extend_code() == code)
    }

    /// Bytes written for the first index and for the count
    pub fn field_bytes(self) -> (usize, usize) {
        match self {
            RangePacking::Byte => (1, 0),
            RangePacking::TwoBytes => (2, 0),
            RangePacking::OneOneBytes => (1, 1),
            RangePacking::TwoOneBytes => (2, 1),
            RangePacking::TwoTwoBytes => (2, 2),
            RangePacking::ZeroOrPrevious | RangePacking::OneOrSubsequent | RangePacking::All => {
                (0, 0)
            }
        }
    }

    /// Whether this strategy can represent `range` exactly
    pub fn applies(self, previous: Option<&IoRange>, range: &IoRange, count_io: usize) -> bool {
        let first = u64::from(range.first);
        let count = u64::from(range.count);
        let count_one = range.count == 1;

        match self {
            RangePacking::ZeroOrPrevious => match previous {
                Some(prev) => range == prev,
                None => range.first == 0 && count_one,
            },
            RangePacking::OneOrSubsequent => match previous {
                Some(prev) => first == prev.end() && count_one,
                None => range.first == 1 && count_one,
            },
            RangePacking::All => range.first == 0 && range.count as usize >= count_io,
            RangePacking::Byte => first <= UNSIGNED_BYTE_MAX && count_one,
            RangePacking::TwoBytes => first <= UNSIGNED_2_BYTES_MAX && count_one,
            RangePacking::OneOneBytes => first <= UNSIGNED_BYTE_MAX && count <= UNSIGNED_BYTE_MAX,
            RangePacking::TwoOneBytes => {
                first <= UNSIGNED_2_BYTES_MAX && count <= UNSIGNED_BYTE_MAX
            }
            RangePacking::TwoTwoBytes => {
                first <= UNSIGNED_2_BYTES_MAX && count <= UNSIGNED_2_BYTES_MAX
            }
        }
    }

    /// First applicable strategy in priority order
    pub fn choose(previous: Option<&IoRange>, range: &IoRange, count_io: usize) -> Option<Self> {
        Self::PRIORITY
            .iter()
            .copied()
            .find(|packing| packing.applies(previous, range, count_io))
    }

    /// Range implied by the strategy before any explicit fields are read.
    ///
    /// Explicit fields then overwrite `first` and, where present, `count`.
    pub fn implied_range(self, previous: Option<&IoRange>, count_io: usize) -> IoRange {
        match self {
            RangePacking::ZeroOrPrevious => previous.copied().unwrap_or(IoRange::new(0, 1)),
            RangePacking::OneOrSubsequent => match previous {
                Some(prev) => IoRange::new(prev.first.saturating_add(prev.count), 1),
                None => IoRange::new(1, 1),
            },
            RangePacking::All => IoRange::new(0, u32::try_from(count_io).unwrap_or(u32::MAX)),
            RangePacking::Byte | RangePacking::TwoBytes => IoRange::new(0, 1),
            _ => IoRange::default(),
        }
    }
}

/// Input/output combinations that fit in the main packing byte
const INDICES_COMBINATIONS: [(u8, RangePacking, RangePacking); 7] = [
    (0x00, RangePacking::ZeroOrPrevious, RangePacking::ZeroOrPrevious),
    (0x08, RangePacking::ZeroOrPrevious, RangePacking::OneOrSubsequent),
    (0x10, RangePacking::ZeroOrPrevious, RangePacking::All),
    (0x18, RangePacking::OneOrSubsequent, RangePacking::ZeroOrPrevious),
    (0x20, RangePacking::All, RangePacking::ZeroOrPrevious),
    (0x28, RangePacking::All, RangePacking::OneOrSubsequent),
    (0x30, RangePacking::All, RangePacking::All),
];

/// Index packing chosen for one transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicesPacking {
    /// Bits for the main packing byte, within `PACKING_INDICES_MASK`
    pub indices_bits: u8,
    /// Extension byte, present only when `indices_bits` is the extend marker
    pub extend: Option<u8>,
    pub inputs: RangePacking,
    pub outputs: RangePacking,
}

impl IndicesPacking {
    /// Pick the packing for a transfer's input and output ranges.
    ///
    /// Returns `None` if a range cannot be represented at all.
    pub fn choose(
        previous: Option<(&IoRange, &IoRange)>,
        inputs: &IoRange,
        outputs: &IoRange,
        count_inputs: usize,
        count_outputs: usize,
    ) -> Option<Self> {
        let prev_inputs = previous.map(|(i, _)| i);
        let prev_outputs = previous.map(|(_, o)| o);

        for (bits, input_packing, output_packing) in INDICES_COMBINATIONS {
            if input_packing.applies(prev_inputs, inputs, count_inputs)
                && output_packing.applies(prev_outputs, outputs, count_outputs)
            {
                return Some(Self {
                    indices_bits: bits,
                    extend: None,
                    inputs: input_packing,
                    outputs: output_packing,
                });
            }
        }

        let input_packing = RangePacking::choose(prev_inputs, inputs, count_inputs)?;
        let output_packing = RangePacking::choose(prev_outputs, outputs, count_outputs)?;

        Some(Self {
            indices_bits: PACKING_INDICES_EXTEND,
            extend: Some(
                (input_packing.extend_code() << PACKING_EXTEND_INPUTS_SHIFT)
                    | (output_packing.extend_code() << PACKING_EXTEND_OUTPUTS_SHIFT),
            ),
            inputs: input_packing,
            outputs: output_packing,
        })
    }

    /// Strategies named by the main packing byte alone
    pub fn from_indices_bits(indices_bits: u8) -> Option<(RangePacking, RangePacking)> {
        INDICES_COMBINATIONS
            .iter()
            .find(|(bits, _, _)| *bits == indices_bits & PACKING_INDICES_MASK)
            .map(|(_, inputs, outputs)| (*inputs, *outputs))
    }

    /// Strategies named by an extension byte
    pub fn from_extend_byte(extend: u8) -> Option<(RangePacking, RangePacking)> {
        let inputs = RangePacking::from_extend_code(
            (extend >> PACKING_EXTEND_INPUTS_SHIFT) & PACKING_EXTEND_MASK,
        )?;
        let outputs = RangePacking::from_extend_code(
            (extend >> PACKING_EXTEND_OUTPUTS_SHIFT) & PACKING_EXTEND_MASK,
        )?;
        Some((inputs, outputs))
    }
}
