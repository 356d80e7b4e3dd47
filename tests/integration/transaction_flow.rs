//! Follows asset units from a genesis transaction through a spending
//! transaction, with metadata carried in OP_RETURN outputs.

use crate::common::{
    charged_genesis, fixture_asset_ref, fixture_ipv4_genesis, fixture_transfers, transaction,
};
use coinspark_metadata::codec::append;
use coinspark_metadata::flow::{get_genesis_output_qty, get_transfer_output_qty};
use coinspark_metadata::types::{CodecLimits, PaymentRef, TransferList};

#[test]
fn test_genesis_issue_needs_fee() {
    let metadata = fixture_ipv4_genesis().encode(40).unwrap();

    let paid = transaction(&[10_000, 10_000], Some(&metadata), 1000).unwrap();
    assert_eq!(paid.count_outputs(), 3);
    assert_eq!(get_genesis_output_qty(&paid, 0), 1000);
    assert_eq!(get_genesis_output_qty(&paid, 1), 0);
    assert_eq!(get_genesis_output_qty(&paid, 2), 0);
    assert_eq!(get_genesis_output_qty(&paid, 9), 0);

    let underpaid = transaction(&[10_000, 10_000], Some(&metadata), 999).unwrap();
    assert_eq!(get_genesis_output_qty(&underpaid, 0), 0);

    let no_metadata = transaction(&[10_000, 10_000], None, 1000).unwrap();
    assert_eq!(get_genesis_output_qty(&no_metadata, 0), 0);
}

#[test]
fn test_transfer_with_sufficient_fee() {
    let genesis_tx = transaction(
        &[10_000, 10_000],
        Some(&charged_genesis().encode(40).unwrap()),
        1000,
    )
    .unwrap();
    assert_eq!(get_genesis_output_qty(&genesis_tx, 0), 10_000);

    let metadata = fixture_transfers()
        .encode(2, 4, &CodecLimits::default())
        .unwrap();
    let spend = transaction(&[5000, 3000, 800], Some(&metadata), 1600).unwrap();

    let asset = fixture_asset_ref();
    let balances: Vec<u64> = (0..4)
        .map(|i| get_transfer_output_qty(&genesis_tx, &asset, &[800, 100], &spend, i))
        .collect();
    assert_eq!(balances, vec![493, 245, 150, 0]);
}

#[test]
fn test_transfer_with_low_fee_uses_default_routes_only() {
    let genesis_tx = transaction(
        &[10_000, 10_000],
        Some(&charged_genesis().encode(40).unwrap()),
        1000,
    )
    .unwrap();

    let metadata = fixture_transfers()
        .encode(2, 4, &CodecLimits::default())
        .unwrap();
    let spend = transaction(&[5000, 3000, 800], Some(&metadata), 1599).unwrap();

    let asset = fixture_asset_ref();
    assert_eq!(get_transfer_output_qty(&genesis_tx, &asset, &[800, 100], &spend, 0), 0);
    assert_eq!(get_transfer_output_qty(&genesis_tx, &asset, &[800, 100], &spend, 2), 900);
}

#[test]
fn test_invalid_genesis_transaction_yields_nothing() {
    let underpaid_genesis = transaction(
        &[10_000, 10_000],
        Some(&charged_genesis().encode(40).unwrap()),
        10,
    )
    .unwrap();
    let spend = transaction(&[5000, 3000], None, 0).unwrap();

    assert_eq!(
        get_transfer_output_qty(&underpaid_genesis, &fixture_asset_ref(), &[800], &spend, 1),
        0
    );
}

#[test]
fn test_plain_spend_moves_everything_to_last_regular_output() {
    let genesis_tx = transaction(
        &[10_000, 10_000],
        Some(&fixture_ipv4_genesis().encode(40).unwrap()),
        1000,
    )
    .unwrap();

    let payment = PaymentRef(42).encode(40).unwrap();
    let spend = transaction(&[2000, 2000, 2000], Some(&payment), 0).unwrap();

    let asset = fixture_asset_ref();
    assert_eq!(get_transfer_output_qty(&genesis_tx, &asset, &[600, 400], &spend, 2), 1000);
    assert_eq!(get_transfer_output_qty(&genesis_tx, &asset, &[600, 400], &spend, 0), 0);
}

#[test]
fn test_transfers_alongside_payment_ref() {
    let genesis_tx = transaction(
        &[10_000, 10_000],
        Some(&charged_genesis().encode(40).unwrap()),
        1000,
    )
    .unwrap();

    let transfers = fixture_transfers()
        .encode(2, 4, &CodecLimits::default())
        .unwrap();
    let payment = PaymentRef(42).encode(40).unwrap();
    let metadata = append(&transfers, 40, &payment).unwrap();

    assert!(TransferList::decode(&metadata, 2, 4)
        .unwrap()
        .matches(&fixture_transfers(), false));

    let spend = transaction(&[5000, 3000, 800], Some(&metadata), 1600).unwrap();
    assert_eq!(
        get_transfer_output_qty(&genesis_tx, &fixture_asset_ref(), &[800, 100], &spend, 1),
        245
    );
}

#[test]
fn test_undecodable_transfers_are_ignored() {
    let genesis_tx = transaction(
        &[10_000, 10_000],
        Some(&charged_genesis().encode(40).unwrap()),
        1000,
    )
    .unwrap();

    let mut metadata = fixture_transfers()
        .encode(2, 4, &CodecLimits::default())
        .unwrap();
    metadata.pop();
    let spend = transaction(&[5000, 3000, 800], Some(&metadata), 5000).unwrap();

    let balances: Vec<u64> = (0..4)
        .map(|i| get_transfer_output_qty(&genesis_tx, &fixture_asset_ref(), &[800, 100], &spend, i))
        .collect();
    assert_eq!(balances, vec![0, 0, 900, 0]);
}
