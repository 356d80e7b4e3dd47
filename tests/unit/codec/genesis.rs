use crate::common::{fixture_domain_genesis, fixture_ipv4_genesis, fixtures, hex_fixture};
use coinspark_metadata::errors::CodecError;
use coinspark_metadata::types::GenesisRecord;
use coinspark_metadata::utils::math::Rounding;

#[test]
fn test_domain_genesis_matches_reference() {
    let genesis = fixture_domain_genesis();
    assert_eq!(genesis.calc_hash_len(40), 21);

    let encoded = genesis.encode(40).unwrap();
    assert_eq!(hex::encode(&encoded), fixtures::GENESIS_DOMAIN);

    let decoded = GenesisRecord::decode(&encoded).unwrap();
    assert_eq!(decoded, genesis);
    assert_eq!(decoded.qty(), 1_230_000);
    assert_eq!(decoded.charge_flat(), 50);
}

#[test]
fn test_ipv4_genesis_matches_reference() {
    let genesis = fixture_ipv4_genesis();
    assert_eq!(genesis.calc_hash_len(40), 27);

    let encoded = genesis.encode(40).unwrap();
    assert_eq!(hex::encode(&encoded), fixtures::GENESIS_IPV4);

    let decoded = GenesisRecord::decode(&hex_fixture(fixtures::GENESIS_IPV4).unwrap()).unwrap();
    assert!(decoded.matches(&genesis, true));
    assert_eq!(decoded.domain_name, "212.56.34.7");
    assert!(decoded.use_https);
    assert!(!decoded.use_prefix);
}

#[test]
fn test_charges() {
    let genesis = fixture_domain_genesis();
    assert_eq!(genesis.calc_charge(1000), 53);
    assert_eq!(genesis.calc_net(1000), 947);
    assert_eq!(genesis.calc_gross(947), 1000);
    // charge never exceeds the gross quantity
    assert_eq!(genesis.calc_net(40), 0);
}

#[test]
fn test_asset_url() {
    let txid = "d5e8f8cbf4de23e1ab5b2be1fd6c0263e7ea2d2c9a0f6c1a3b31f2d9bb3d1c8d";

    let genesis = fixture_domain_genesis();
    assert_eq!(
        genesis.calc_asset_url(txid, 1).unwrap(),
        "http://coinspark.org/coinspark/gold/"
    );

    let ipv4 = fixture_ipv4_genesis();
    assert_eq!(
        ipv4.calc_asset_url(txid, 60).unwrap(),
        "https://212.56.34.7/1c8dd5e8f8cbf4de/"
    );
    assert!(ipv4.calc_asset_url("abc", 0).is_err());
}

#[test]
fn test_set_qty_rounding() {
    let mut genesis = fixture_domain_genesis();
    assert_eq!(genesis.set_qty(123_456, Rounding::Down), 123_000);
    assert_eq!(genesis.set_qty(123_456, Rounding::Up), 124_000);
    assert_eq!(genesis.set_qty(123_456, Rounding::Nearest), 123_000);
    assert_eq!((genesis.qty_mantissa, genesis.qty_exponent), (123, 3));
}

#[test]
fn test_hash_too_long_for_space() {
    let mut genesis = fixture_domain_genesis();
    genesis.asset_hash = vec![0; 22];
    assert!(matches!(
        genesis.encode(40),
        Err(CodecError::Capacity { needed: 41, available: 40 })
    ));
}

#[test]
fn test_decode_requires_genesis_tag() {
    let payment = hex_fixture(fixtures::PAYMENT_REF_123456789).unwrap();
    assert_eq!(
        GenesisRecord::decode(&payment),
        Err(CodecError::TagNotFound('g'))
    );
}
