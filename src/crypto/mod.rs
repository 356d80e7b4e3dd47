/// Hashes that bind off-chain content to on-chain records
///
/// Genesis records carry a prefix of the asset hash and message records a
/// prefix of the message hash; both are SHA-256 over a canonical layout.
pub mod hash;

pub use hash::{calc_asset_hash, calc_message_hash, sha256, AssetHashFields, MessagePart};
