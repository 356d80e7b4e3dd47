//! CoinSpark metadata - Type System
//!
//! - `common`: protocol-wide constants, quantity aliases and codec limits
//! - `io_range`: contiguous input/output index ranges
//! - `asset_ref`: asset references and the default-route variant
//! - `genesis`: asset creation records and charge calculations
//! - `transfer`: transfer records and ordered transfer lists
//! - `payment_ref`: payment references
//! - `message`: message pointer records

pub mod asset_ref;
pub mod common;
pub mod genesis;
pub mod io_range;
pub mod message;
pub mod payment_ref;
pub mod transfer;

// Re-export the record types for convenience
pub use asset_ref::AssetRef;
pub use common::*;
pub use genesis::GenesisRecord;
pub use io_range::{normalize_ranges, IoRange};
pub use message::MessageRecord;
pub use payment_ref::PaymentRef;
pub use transfer::{TransferList, TransferRecord};
