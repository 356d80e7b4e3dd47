//! Wire formats for every record kind
//!
//! - `metadata`: the shared `SPK` container and record framing
//! - `domain_path`: compressed domain name and path used by genesis and message records
//! - `genesis`, `transfer`, `payment_ref`, `message`: one codec per record kind
//! - `packing`: index range packing shared by the transfer codec

pub mod domain_path;
pub mod genesis;
pub mod message;
pub mod metadata;
pub mod packing;
pub mod payment_ref;
pub mod transfer;

pub use metadata::{append, locate_range, max_append_len, record_tags};
