//! CoinSpark metadata codec
//!
//! Compact genesis, transfer, payment reference and message records carried
//! in a bitcoin OP_RETURN output, plus the asset quantity flow rules that
//! give those records meaning.

pub mod address;
pub mod cli;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod flow;
pub mod script;
pub mod types;
pub mod utils;
