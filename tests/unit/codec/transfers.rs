use crate::common::{fixture_asset_ref, fixture_transfers, fixtures, hex_fixture};
use coinspark_metadata::errors::CodecError;
use coinspark_metadata::types::{AssetRef, CodecLimits, IoRange, TransferList, TransferRecord};

#[test]
fn test_transfers_match_reference() {
    let transfers = fixture_transfers();
    let encoded = transfers.encode(2, 3, &CodecLimits::default()).unwrap();
    assert_eq!(hex::encode(&encoded), fixtures::TRANSFERS);
}

#[test]
fn test_decode_reference_transfers() {
    let metadata = hex_fixture(fixtures::TRANSFERS).unwrap();

    let decoded = TransferList::decode(&metadata, 2, 3).unwrap();
    assert_eq!(decoded.len(), 3);
    // decoded in encoding order, default route first
    assert!(decoded.transfers[0].is_default_route());
    assert_eq!(decoded.transfers[0].inputs, IoRange::new(0, 2));
    assert_eq!(decoded.transfers[0].outputs, IoRange::single(2));
    assert_eq!(decoded.transfers[1].qty_per_output, 500);
    assert_eq!(decoded.transfers[2].outputs, IoRange::single(1));

    assert!(decoded.matches(&fixture_transfers(), false));
    assert!(!decoded.matches(&fixture_transfers(), true));
    assert_eq!(TransferList::decode_count(&metadata).unwrap(), 3);
}

#[test]
fn test_decode_limited_reports_total() {
    let metadata = hex_fixture(fixtures::TRANSFERS).unwrap();
    let (first_two, total) = TransferList::decode_limited(&metadata, 2, 2, 3).unwrap();
    assert_eq!(first_two.len(), 2);
    assert_eq!(total, 3);
}

#[test]
fn test_transfer_all_and_float_quantities() {
    let asset = fixture_asset_ref();
    let transfers = TransferList::new(vec![
        TransferRecord::new(asset, IoRange::new(0, 4), IoRange::new(0, 6), TransferRecord::TRANSFER_ALL),
        TransferRecord::new(asset, IoRange::single(1), IoRange::single(6), 25_000_000),
        TransferRecord::new(asset, IoRange::single(2), IoRange::single(7), 1_234_567),
    ]);

    let encoded = transfers.encode(4, 8, &CodecLimits::default()).unwrap();
    let decoded = TransferList::decode(&encoded, 4, 8).unwrap();
    assert!(decoded.matches(&transfers, true));
    assert_eq!(decoded.transfers[0].qty_per_output, TransferRecord::TRANSFER_ALL);
}

#[test]
fn test_practical_cap() {
    let limits = CodecLimits {
        max_transfers: 2,
        ..CodecLimits::default()
    };
    assert_eq!(
        fixture_transfers().encode(2, 3, &limits),
        Err(CodecError::TooManyTransfers { count: 3, max: 2 })
    );
}

#[test]
fn test_capacity() {
    let transfers: Vec<TransferRecord> = (0..8u32)
        .map(|i| {
            TransferRecord::new(
                AssetRef::new(100_000 + i, 5000 + i, [i as u8, 0]),
                IoRange::single(i),
                IoRange::single(i),
                1_000 + u64::from(i),
            )
        })
        .collect();

    assert!(matches!(
        TransferList::new(transfers).encode(8, 8, &CodecLimits::default()),
        Err(CodecError::Capacity { available: 40, .. })
    ));
}

#[test]
fn test_truncated_transfer_fails_whole_list() {
    let metadata = hex_fixture(fixtures::TRANSFERS).unwrap();
    let truncated = &metadata[..metadata.len() - 1];
    assert!(TransferList::decode(truncated, 2, 3).is_err());
    assert!(TransferList::decode_count(truncated).is_err());
}
