//! Asset references
//!
//! An asset is identified by the position of its genesis transaction in the
//! chain: block height, byte offset of the transaction within the block, and
//! the first two bytes of its txid. Transfer lists additionally use a
//! "default route" entry that names no asset at all.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::errors::CodecError;

/// Bytes of the genesis txid kept in a reference
pub const TXID_PREFIX_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssetRef {
    /// Reference to a specific genesis transaction
    Explicit {
        block_num: u32,
        tx_offset: u32,
        #[serde(with = "hex::serde")]
        txid_prefix: [u8; TXID_PREFIX_LEN],
    },
    /// Fallback routing entry in a transfer list
    DefaultRoute,
}

impl AssetRef {
    pub fn new(block_num: u32, tx_offset: u32, txid_prefix: [u8; TXID_PREFIX_LEN]) -> Self {
        AssetRef::Explicit {
            block_num,
            tx_offset,
            txid_prefix,
        }
    }

    /// Build a reference from a full genesis txid in internal byte order
    pub fn from_txid(block_num: u32, tx_offset: u32, txid: &[u8]) -> Option<Self> {
        let prefix: [u8; TXID_PREFIX_LEN] = txid.get(..TXID_PREFIX_LEN)?.try_into().ok()?;
        Some(Self::new(block_num, tx_offset, prefix))
    }

    pub fn is_default_route(&self) -> bool {
        matches!(self, AssetRef::DefaultRoute)
    }

    /// The txid prefix read as a little-endian 16-bit integer
    pub fn txid_prefix_value(&self) -> Option<u16> {
        match self {
            AssetRef::Explicit { txid_prefix, .. } => Some(u16::from_le_bytes(*txid_prefix)),
            AssetRef::DefaultRoute => None,
        }
    }
}

impl Ord for AssetRef {
    /// Block number, then transaction offset, then txid prefix bytes.
    /// Default routes sort before every explicit reference.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (AssetRef::DefaultRoute, AssetRef::DefaultRoute) => Ordering::Equal,
            (AssetRef::DefaultRoute, _) => Ordering::Less,
            (_, AssetRef::DefaultRoute) => Ordering::Greater,
            (
                AssetRef::Explicit {
                    block_num: b1,
                    tx_offset: o1,
                    txid_prefix: p1,
                },
                AssetRef::Explicit {
                    block_num: b2,
                    tx_offset: o2,
                    txid_prefix: p2,
                },
            ) => b1.cmp(b2).then(o1.cmp(o2)).then(p1.cmp(p2)),
        }
    }
}

impl PartialOrd for AssetRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetRef::Explicit {
                block_num,
                tx_offset,
                txid_prefix,
            } => write!(
                f,
                "{}-{}-{}",
                block_num,
                tx_offset,
                u16::from_le_bytes(*txid_prefix)
            ),
            AssetRef::DefaultRoute => write!(f, "default"),
        }
    }
}

impl FromStr for AssetRef {
    type Err = CodecError;

    /// Parse the `block-offset-prefix` text form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "default" {
            return Ok(AssetRef::DefaultRoute);
        }

        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit() || c == '-') {
            return Err(CodecError::validation(format!(
                "asset reference '{}' must be digits separated by '-'",
                s
            )));
        }

        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 3 {
            return Err(CodecError::validation(format!(
                "asset reference '{}' must have three parts",
                s
            )));
        }

        let out_of_range = |what: &str| {
            CodecError::validation(format!("asset reference {} out of range in '{}'", what, s))
        };

        let block_num = parts[0]
            .parse::<u32>()
            .map_err(|_| out_of_range("block number"))?;
        let tx_offset = parts[1]
            .parse::<u32>()
            .map_err(|_| out_of_range("transaction offset"))?;
        let prefix = parts[2]
            .parse::<u16>()
            .map_err(|_| out_of_range("txid prefix"))?;

        Ok(AssetRef::new(block_num, tx_offset, prefix.to_le_bytes()))
    }
}
