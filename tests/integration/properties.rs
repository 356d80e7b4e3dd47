//! Property checks over generated records and transactions

use coinspark_metadata::address::CoinSparkAddress;
use coinspark_metadata::flow::{apply_transfers, default_route_map};
use coinspark_metadata::types::{
    AssetRef, CodecLimits, GenesisRecord, IoRange, MessageRecord, PaymentRef, TransferList,
    TransferRecord, PAYMENT_REF_MAX,
};
use proptest::prelude::*;

const BASE58: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const GENESIS_MAX_LEN: usize = 40;
const MESSAGE_MAX_LEN: usize = 80;
const MESSAGE_COUNT_OUTPUTS: usize = 400;

fn asset() -> AssetRef {
    AssetRef::new(250_000, 77, [0x10, 0x20])
}

fn genesis(charge_flat_mantissa: u8, charge_basis_points: u8) -> GenesisRecord {
    GenesisRecord {
        qty_mantissa: 1,
        qty_exponent: 6,
        charge_flat_mantissa,
        charge_basis_points,
        domain_name: "assets.example.com".to_string(),
        asset_hash: vec![0x42; 12],
        ..GenesisRecord::default()
    }
}

fn bitcoin_address() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(BASE58), 25..35)
        .prop_map(|chars| chars.into_iter().map(char::from).collect())
}

/// Explicit transfers of one asset, inside a transaction of the given size
fn transfers(count_inputs: u32, count_outputs: u32) -> impl Strategy<Value = Vec<TransferRecord>> {
    let transfer = (0..count_inputs, 1..=count_inputs, 0..count_outputs, 1..=count_outputs, 0u64..5000)
        .prop_map(move |(first_in, count_in, first_out, count_out, qty)| {
            TransferRecord::new(
                asset(),
                IoRange::new(first_in, count_in.min(count_inputs - first_in)),
                IoRange::new(first_out, count_out.min(count_outputs - first_out)),
                qty,
            )
        });
    prop::collection::vec(transfer, 0..6)
}

/// Copies of `encoded` with exactly one bit inverted
fn single_bit_flips(encoded: &[u8]) -> Vec<Vec<u8>> {
    (0..encoded.len() * 8)
        .map(|bit| {
            let mut mutated = encoded.to_vec();
            mutated[bit / 8] ^= 1 << (bit % 8);
            mutated
        })
        .collect()
}

/// 32 distinct bytes in random order, so a shifted hash never matches itself
fn hash_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::sample::subsequence((0u8..=255).collect::<Vec<u8>>(), 32).prop_shuffle()
}

/// IPv4 literals and dictionary domains in mixed case
fn domain_name() -> impl Strategy<Value = String> {
    let ipv4 = any::<[u8; 4]>().prop_map(|o| format!("{}.{}.{}.{}", o[0], o[1], o[2], o[3]));
    let dictionary = (
        prop::sample::select(vec!["", "www.", "WWW."]),
        "[a-zA-Z0-9][a-zA-Z0-9-]{0,9}",
        prop::sample::select(vec!["", ".com", ".COM", ".org", ".co.uk", ".Net", ".de"]),
    )
        .prop_map(|(prefix, label, suffix)| format!("{}{}{}", prefix, label, suffix));

    prop_oneof![ipv4, dictionary]
}

fn page_path() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9.-]{0,12}"
}

/// Quantity mantissa and exponent with no other encoding of the same value
fn canonical_qty() -> impl Strategy<Value = (u16, u8)> {
    (1u16..=1000, 0u8..=11).prop_filter("quantity has a single encoding", |(mantissa, exponent)| {
        mantissa % 10 != 0 && (*exponent == 0 || *mantissa > 100)
    })
}

fn flat_charge() -> impl Strategy<Value = (u8, u8)> {
    (1u8..=100, 0u8..=2).prop_filter("flat mantissa within limit", |(mantissa, exponent)| {
        *exponent < 2 || *mantissa <= 50
    })
}

/// Flat mantissa, flat exponent and basis points: none, flat, bps or both
fn charges() -> impl Strategy<Value = (u8, u8, u8)> {
    prop_oneof![
        Just((0u8, 0u8, 0u8)),
        flat_charge().prop_map(|(mantissa, exponent)| (mantissa, exponent, 0u8)),
        (1u8..=250).prop_map(|bps| (0u8, 0u8, bps)),
        (flat_charge(), 1u8..=250)
            .prop_map(|((mantissa, exponent), bps)| (mantissa, exponent, bps)),
    ]
}

/// Genesis whose hash takes every byte left in a 40-byte buffer
fn genesis_record() -> impl Strategy<Value = GenesisRecord> {
    (
        canonical_qty(),
        charges(),
        any::<bool>(),
        domain_name(),
        any::<bool>(),
        page_path(),
        hash_bytes(),
    )
        .prop_map(|(qty, charges, use_https, domain_name, use_prefix, page_path, hash)| {
            let ((qty_mantissa, qty_exponent), (flat_mantissa, flat_exponent, bps)) = (qty, charges);
            let mut genesis = GenesisRecord {
                qty_mantissa,
                qty_exponent,
                charge_flat_mantissa: flat_mantissa,
                charge_flat_exponent: flat_exponent,
                charge_basis_points: bps,
                use_https,
                domain_name,
                use_prefix,
                page_path,
                asset_hash: Vec::new(),
            };
            let hash_len = genesis.calc_hash_len(GENESIS_MAX_LEN);
            genesis.asset_hash = hash[..hash_len].to_vec();
            genesis
        })
}

/// Ascending output ranges with at least one uncovered output between them
fn output_ranges() -> impl Strategy<Value = Vec<IoRange>> {
    prop::collection::vec((1u32..40, 1u32..20), 0..5).prop_map(|spans| {
        let mut ranges = Vec::with_capacity(spans.len());
        let mut next_free = 0u32;
        for (index, (gap, count)) in spans.into_iter().enumerate() {
            let first = if index == 0 { gap - 1 } else { next_free + gap };
            ranges.push(IoRange::new(first, count));
            next_free = first + count;
        }
        ranges
    })
}

fn message_record() -> impl Strategy<Value = MessageRecord> {
    (
        any::<bool>(),
        domain_name(),
        any::<bool>(),
        page_path(),
        any::<bool>(),
        output_ranges(),
        hash_bytes(),
    )
        .prop_map(|(use_https, server_host, use_prefix, server_path, public, output_ranges, hash)| {
            let mut message = MessageRecord {
                use_https,
                server_host,
                use_prefix,
                server_path,
                is_public: public || output_ranges.is_empty(),
                output_ranges,
                hash: Vec::new(),
            };
            let hash_len = message.calc_hash_len(MESSAGE_COUNT_OUTPUTS, MESSAGE_MAX_LEN);
            message.hash = hash[..hash_len].to_vec();
            message
        })
}

proptest! {
    #[test]
    fn prop_payment_ref_round_trip(value in 0..=PAYMENT_REF_MAX) {
        let encoded = PaymentRef(value).encode(40).unwrap();
        prop_assert_eq!(PaymentRef::decode(&encoded).unwrap(), PaymentRef(value));
    }

    #[test]
    fn prop_address_round_trip(
        address in bitcoin_address(),
        flags in 0u32..=0x7F_FFFF,
        payment_ref in 0..=PAYMENT_REF_MAX,
    ) {
        let original = CoinSparkAddress::new(&address, flags, PaymentRef(payment_ref));
        let encoded = original.encode().unwrap();
        prop_assert_eq!(CoinSparkAddress::decode(&encoded).unwrap(), original);
    }

    #[test]
    fn prop_address_character_change_is_detected(
        address in bitcoin_address(),
        flags in 0u32..16,
        position_seed in any::<usize>(),
        replacement in prop::sample::select(BASE58),
    ) {
        let original = CoinSparkAddress::new(&address, flags, PaymentRef(0));
        let encoded = original.encode().unwrap();

        let mut changed = encoded.clone().into_bytes();
        let position = 1 + position_seed % (changed.len() - 1);
        prop_assume!(changed[position] != replacement);
        changed[position] = replacement;

        let changed = String::from_utf8(changed).unwrap();
        prop_assert_ne!(CoinSparkAddress::decode(&changed).ok(), Some(original));
    }

    #[test]
    fn prop_gross_covers_net(
        net in 0u64..1_000_000_000_000,
        flat in 0u8..=100,
        bps in 0u8..=250,
    ) {
        let genesis = genesis(flat, bps);
        let gross = genesis.calc_gross(net);
        prop_assert_eq!(genesis.calc_net(gross), net);
        prop_assert!(genesis.calc_charge(gross) <= gross);
    }

    #[test]
    fn prop_transfers_conserve_units(
        list in transfers(4, 5),
        balances in prop::collection::vec(0u64..10_000, 4),
    ) {
        let outputs = apply_transfers(&asset(), &genesis(0, 0), &list, &balances, &[true; 5]);
        prop_assert_eq!(outputs.iter().sum::<u64>(), balances.iter().sum::<u64>());
    }

    #[test]
    fn prop_charges_never_create_units(
        list in transfers(3, 4),
        balances in prop::collection::vec(0u64..10_000, 3),
        flat in 0u8..=100,
        bps in 0u8..=250,
    ) {
        let outputs = apply_transfers(&asset(), &genesis(flat, bps), &list, &balances, &[true; 4]);
        prop_assert!(outputs.iter().sum::<u64>() <= balances.iter().sum::<u64>());
    }

    #[test]
    fn prop_first_default_route_wins(
        first_output in 0u32..6,
        second_output in 0u32..6,
        count_inputs in 1usize..8,
    ) {
        let routes = vec![
            TransferRecord::default_route(IoRange::single(0), first_output),
            TransferRecord::default_route(IoRange::new(0, 8), second_output),
        ];
        let map = default_route_map(&routes, count_inputs, &[true; 6]);
        prop_assert_eq!(map[0], Some(first_output as usize));
        for entry in &map[1..] {
            prop_assert_eq!(*entry, Some(second_output as usize));
        }
    }

    #[test]
    fn prop_transfer_list_round_trip(list in transfers(6, 6)) {
        let list = TransferList::new(list);
        let limits = CodecLimits { metadata_max_len: 75, ..CodecLimits::default() };

        if let Ok(encoded) = list.encode(6, 6, &limits) {
            let decoded = TransferList::decode(&encoded, 6, 6).unwrap();
            prop_assert!(decoded.matches(&list, false));
        }
    }

    #[test]
    fn prop_genesis_round_trip(genesis in genesis_record()) {
        prop_assume!(genesis.asset_hash.len() >= 12);

        let encoded = genesis.encode(GENESIS_MAX_LEN).unwrap();
        prop_assert!(encoded.len() <= GENESIS_MAX_LEN);

        let decoded = GenesisRecord::decode(&encoded).unwrap();
        prop_assert!(decoded.matches(&genesis, true));
        prop_assert_eq!(decoded.domain_name, genesis.domain_name.to_lowercase());
        prop_assert_eq!(decoded.page_path, genesis.page_path.to_lowercase());
        prop_assert_eq!(decoded.asset_hash, genesis.asset_hash);
    }

    #[test]
    fn prop_message_round_trip(message in message_record()) {
        prop_assume!(message.hash.len() >= 12);

        let encoded = message.encode(MESSAGE_COUNT_OUTPUTS, MESSAGE_MAX_LEN).unwrap();
        let decoded = MessageRecord::decode(&encoded, MESSAGE_COUNT_OUTPUTS).unwrap();
        prop_assert!(decoded.matches(&message, true));
        prop_assert_eq!(decoded.server_host, message.server_host.to_lowercase());
        prop_assert_eq!(decoded.output_ranges, message.output_ranges);
        prop_assert_eq!(decoded.hash, message.hash);
    }
}

// A flipped bit must either break decoding or change the decoded record.
// The only exceptions are bits the decoder ignores, so a record that still
// matches has to encode back to the original bytes.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_genesis_bit_flips_are_detected(genesis in genesis_record()) {
        prop_assume!(genesis.asset_hash.len() >= 12);
        let encoded = genesis.encode(GENESIS_MAX_LEN).unwrap();

        for mutated in single_bit_flips(&encoded) {
            if let Ok(decoded) = GenesisRecord::decode(&mutated) {
                if decoded.matches(&genesis, false) {
                    prop_assert_eq!(decoded.encode(GENESIS_MAX_LEN).ok(), Some(encoded.clone()));
                }
            }
        }
    }

    #[test]
    fn prop_transfer_bit_flips_are_detected(list in transfers(6, 6)) {
        let list = TransferList::new(list);
        let limits = CodecLimits { metadata_max_len: 75, ..CodecLimits::default() };
        let encoded = match list.encode(6, 6, &limits) {
            Ok(encoded) => encoded,
            Err(_) => return Ok(()),
        };

        for mutated in single_bit_flips(&encoded) {
            if let Ok(decoded) = TransferList::decode(&mutated, 6, 6) {
                if decoded.matches(&list, false) {
                    prop_assert_eq!(decoded.encode(6, 6, &limits).ok(), Some(encoded.clone()));
                }
            }
        }
    }

    #[test]
    fn prop_message_bit_flips_are_detected(message in message_record()) {
        prop_assume!(message.hash.len() >= 12);
        let encoded = message.encode(MESSAGE_COUNT_OUTPUTS, MESSAGE_MAX_LEN).unwrap();

        for mutated in single_bit_flips(&encoded) {
            if let Ok(decoded) = MessageRecord::decode(&mutated, MESSAGE_COUNT_OUTPUTS) {
                if decoded.matches(&message, false) {
                    prop_assert_eq!(
                        decoded.encode(MESSAGE_COUNT_OUTPUTS, MESSAGE_MAX_LEN).ok(),
                        Some(encoded.clone())
                    );
                }
            }
        }
    }

    #[test]
    fn prop_payment_ref_bit_flips_are_detected(value in 1..=PAYMENT_REF_MAX) {
        let encoded = PaymentRef(value).encode(40).unwrap();

        for mutated in single_bit_flips(&encoded) {
            prop_assert_ne!(PaymentRef::decode(&mutated).ok(), Some(PaymentRef(value)));
        }
    }
}

#[test]
fn test_random_payment_ref_fits_address() {
    let payment_ref = PaymentRef::random();
    let address = CoinSparkAddress::new("1BoatSLRHtKNngkdXEeobR76b53LETtpyT", 3, payment_ref);
    let encoded = address.encode().unwrap();
    assert_eq!(CoinSparkAddress::decode(&encoded).unwrap().payment_ref, payment_ref);
}
