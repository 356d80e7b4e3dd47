//! Common Test Utilities
//!
//! Builders for records, scripts and transactions shared by the unit and
//! integration test suites, plus the reference metadata fixtures they check
//! against.

#![allow(dead_code)]

use anyhow::{Context, Result};
use bitcoin::ScriptBuf;
use coinspark_metadata::flow::TransactionOutputs;
use coinspark_metadata::script::metadata_to_script;
use coinspark_metadata::types::{AssetRef, GenesisRecord, IoRange, TransferList, TransferRecord};

/// Reference metadata vectors from the CoinSpark libraries
pub mod fixtures {
    /// 123 x 10^4 units, flat charge 5 x 10^1, 30 bps, http://coinspark.org/coinspark/gold/
    pub const GENESIS_DOMAIN: &str =
        "53504b671fd06a1e2e4c74b7a04281a698ddf5000102030405060708090a0b0c0d0e0f1011121314";

    /// 1000 units, https://212.56.34.7/ without the coinspark/ prefix
    pub const GENESIS_IPV4: &str = "53504b67bc0b7fd43822072600a0a1a2a3a4a5a6a7a8a9aaabacadaeafb0b1b2b3b4b5b6b7b8b9ba";

    /// Default route for inputs 0-1 to output 2, then 500 and 250 units of
    /// 300000-1234-4779 from input 0 to outputs 0 and 1
    pub const TRANSFERS: &str = "53504b74393a02007a12e09304d20400ab120000f40109fa";

    pub const PAYMENT_REF_123456789: &str = "53504b7215cd5b07";
}

/// Decode a hex fixture
pub fn hex_fixture(hex: &str) -> Result<Vec<u8>> {
    hex::decode(hex).with_context(|| format!("invalid fixture hex: {}", hex))
}

/// Asset referenced by [`fixtures::TRANSFERS`]
pub fn fixture_asset_ref() -> AssetRef {
    AssetRef::new(300_000, 1234, [0xab, 0x12])
}

/// Genesis encoded as [`fixtures::GENESIS_DOMAIN`]
pub fn fixture_domain_genesis() -> GenesisRecord {
    GenesisRecord {
        qty_mantissa: 123,
        qty_exponent: 4,
        charge_flat_mantissa: 5,
        charge_flat_exponent: 1,
        charge_basis_points: 30,
        use_https: false,
        domain_name: "coinspark.org".to_string(),
        use_prefix: true,
        page_path: "gold".to_string(),
        asset_hash: (0u8..21).collect(),
    }
}

/// Genesis encoded as [`fixtures::GENESIS_IPV4`]
pub fn fixture_ipv4_genesis() -> GenesisRecord {
    GenesisRecord {
        qty_mantissa: 1,
        qty_exponent: 3,
        use_https: true,
        domain_name: "212.56.34.7".to_string(),
        use_prefix: false,
        asset_hash: (0xa0u8..0xbb).collect(),
        ..GenesisRecord::default()
    }
}

/// Transfers encoded as [`fixtures::TRANSFERS`], in list order
pub fn fixture_transfers() -> TransferList {
    let asset = fixture_asset_ref();
    TransferList::new(vec![
        TransferRecord::new(asset, IoRange::single(0), IoRange::single(0), 500),
        TransferRecord::new(asset, IoRange::single(0), IoRange::single(1), 250),
        TransferRecord::default_route(IoRange::new(0, 2), 2),
    ])
}

/// 10,000 units with a flat charge of 2 and 100 bps
pub fn charged_genesis() -> GenesisRecord {
    GenesisRecord {
        qty_mantissa: 1,
        qty_exponent: 4,
        charge_flat_mantissa: 2,
        charge_basis_points: 100,
        domain_name: "x.com".to_string(),
        asset_hash: vec![b'a'; 12],
        ..GenesisRecord::default()
    }
}

/// Pay-to-pubkey-hash script with a recognisable hash
pub fn p2pkh_script(seed: u8) -> ScriptBuf {
    let mut bytes = vec![0x76, 0xa9, 0x14];
    bytes.extend_from_slice(&[seed; 20]);
    bytes.extend_from_slice(&[0x88, 0xac]);
    ScriptBuf::from_bytes(bytes)
}

/// Transaction paying `satoshis` to P2PKH outputs, followed by an
/// OP_RETURN output carrying `metadata` when given
pub fn transaction(satoshis: &[u64], metadata: Option<&[u8]>, fee: u64) -> Result<TransactionOutputs> {
    let mut scripts: Vec<ScriptBuf> = (0..satoshis.len()).map(|i| p2pkh_script(i as u8)).collect();
    let mut values = satoshis.to_vec();

    if let Some(metadata) = metadata {
        scripts.push(metadata_to_script(metadata)?);
        values.push(0);
    }

    Ok(TransactionOutputs::new(scripts, values, fee))
}
