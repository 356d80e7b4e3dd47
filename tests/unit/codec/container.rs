use crate::common::{fixture_transfers, fixtures, hex_fixture};
use coinspark_metadata::codec::{append, locate_range, max_append_len, record_tags};
use coinspark_metadata::errors::CodecError;
use coinspark_metadata::types::{GenesisRecord, PaymentRef, TransferList};

#[test]
fn test_payment_ref_matches_reference() {
    let encoded = PaymentRef(123_456_789).encode(40).unwrap();
    assert_eq!(hex::encode(&encoded), fixtures::PAYMENT_REF_123456789);
    assert_eq!(PaymentRef::decode(&encoded).unwrap(), PaymentRef(123_456_789));
}

#[test]
fn test_append_payment_ref_to_transfers() {
    let transfers = hex_fixture(fixtures::TRANSFERS).unwrap();
    let payment = hex_fixture(fixtures::PAYMENT_REF_123456789).unwrap();

    assert_eq!(max_append_len(&transfers, 40), 18);

    let combined = append(&transfers, 40, &payment).unwrap();
    assert_eq!(combined.len(), transfers.len() + payment.len() - 3 + 1);
    assert_eq!(&combined[..4], b"SPK\x15");
    assert_eq!(record_tags(&combined).unwrap(), b"tr".to_vec());

    let decoded = TransferList::decode(&combined, 2, 3).unwrap();
    assert!(decoded.matches(&fixture_transfers(), false));
    assert_eq!(PaymentRef::decode(&combined).unwrap(), PaymentRef(123_456_789));
    assert_eq!(locate_range(&combined, None).unwrap(), &payment[4..]);
}

#[test]
fn test_missing_and_duplicate_tags() {
    let transfers = hex_fixture(fixtures::TRANSFERS).unwrap();
    let payment = hex_fixture(fixtures::PAYMENT_REF_123456789).unwrap();

    assert_eq!(
        GenesisRecord::decode(&transfers),
        Err(CodecError::TagNotFound('g'))
    );

    let once = append(&transfers, 40, &payment).unwrap();
    let twice = append(&once, 40, &payment).unwrap();
    assert_eq!(PaymentRef::decode(&twice), Err(CodecError::AmbiguousTag('r')));
}

#[test]
fn test_append_respects_max_len() {
    let genesis = hex_fixture(fixtures::GENESIS_DOMAIN).unwrap();
    let payment = hex_fixture(fixtures::PAYMENT_REF_123456789).unwrap();

    assert_eq!(max_append_len(&genesis, 40), 2);
    assert!(matches!(
        append(&genesis, 40, &payment),
        Err(CodecError::Capacity { available: 40, .. })
    ));
    assert!(append(&genesis, 75, &payment).is_ok());
}

#[test]
fn test_rejects_foreign_identifier() {
    assert!(locate_range(b"XYZr\x01", Some(b'r')).is_err());
    assert!(locate_range(b"SP", None).is_err());
}
