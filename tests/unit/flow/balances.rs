use crate::common::{charged_genesis, fixture_asset_ref, fixture_ipv4_genesis, fixture_transfers};
use coinspark_metadata::flow::{apply_none, default_route_map};
use coinspark_metadata::types::{AssetRef, IoRange, TransferRecord, SATOSHI_QTY_MAX};

#[test]
fn test_genesis_min_fee_and_apply() {
    let genesis = fixture_ipv4_genesis();
    let regular = [true, true, false];

    assert_eq!(genesis.calc_min_fee(&[10_000, 10_000, 0], &regular), 1000);
    assert_eq!(genesis.apply(&regular), vec![1000, 0, 0]);
}

#[test]
fn test_transfer_min_fee() {
    let transfers = fixture_transfers();
    assert_eq!(
        transfers.calc_min_fee(2, &[5000, 3000, 800], &[true, true, true]),
        1600
    );
    assert_eq!(
        transfers.calc_min_fee(2, &[5000, 3000], &[true, true, true]),
        SATOSHI_QTY_MAX
    );
}

#[test]
fn test_apply_with_charges() {
    let transfers = fixture_transfers();
    let balances = transfers.apply(
        &fixture_asset_ref(),
        &charged_genesis(),
        &[800, 100],
        &[true, true, true],
    );
    // 500 and 250 less charges of 7 and 5, leftovers 50 + 100 by default route
    assert_eq!(balances, vec![493, 245, 150]);
}

#[test]
fn test_apply_none_ignores_default_routes() {
    let balances = apply_none(
        &fixture_asset_ref(),
        &charged_genesis(),
        &[800, 100],
        &[true, true, true],
    );
    assert_eq!(balances, vec![0, 0, 900]);
}

#[test]
fn test_default_outputs() {
    let transfers = fixture_transfers();
    assert_eq!(
        transfers.default_outputs(2, &[true, true, true]),
        vec![false, false, true]
    );
    // third input is not covered by the default route
    assert_eq!(
        transfers.default_outputs(3, &[true, true, true]),
        vec![false, false, true]
    );
}

#[test]
fn test_unrelated_asset_only_follows_default_routes() {
    let other = AssetRef::new(1, 2, [3, 4]);
    let balances = fixture_transfers().apply(
        &other,
        &charged_genesis(),
        &[800, 100],
        &[true, true, true],
    );
    assert_eq!(balances, vec![0, 0, 900]);
}

#[test]
fn test_route_map_without_regular_outputs() {
    let transfers = vec![TransferRecord::default_route(IoRange::new(0, 2), 0)];
    // output 0 exists even though it is not regular
    assert_eq!(
        default_route_map(&transfers, 2, &[false]),
        vec![Some(0), Some(0)]
    );
    assert_eq!(default_route_map(&[], 1, &[false]), vec![None]);
}
