//! Property-based tests for pixkit-lib
//!
//! These tests use proptest to verify encoder invariants across a wide range
//! of inputs.

use pixkit_lib::crc::crc16;
use pixkit_lib::decode::{parse_payload, verify_checksum};
use pixkit_lib::normalize::normalize;
use pixkit_lib::payload::{PayloadBuilder, PaymentRequest};
use pixkit_lib::tlv::EmvField;
use pixkit_lib::PaymentAmount;
use proptest::prelude::*;

fn assert_lengths(fields: &[EmvField]) -> Result<(), TestCaseError> {
    for field in fields {
        let serialized = field.serialize();
        let prefix: usize = serialized[2..4].parse().unwrap();
        prop_assert_eq!(prefix, field.value().encode_utf16().count());
        prop_assert!(serialized.ends_with(field.value()));
        assert_lengths(field.children())?;
    }
    Ok(())
}

fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{11}",
        "[0-9]{14}",
        "\\+55[0-9]{10,11}",
        "[a-z]{1,20}@[a-z]{1,10}\\.com",
        "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
    ]
}

fn request_strategy() -> impl Strategy<Value = PaymentRequest> {
    (
        key_strategy(),
        0i64..10_000_000i64,
        "\\PC{0,60}",
        "\\PC{0,40}",
        proptest::option::of("[A-Za-z0-9*\\-]{0,40}"),
    )
        .prop_map(|(key, cents, name, city, txid)| {
            let mut request = PaymentRequest::new(key)
                .with_amount(PaymentAmount::from_cents(cents).unwrap())
                .with_merchant(name, city);
            request.transaction_id = txid;
            request
        })
}

proptest! {
    /// Every field's length prefix equals its value length
    #[test]
    fn field_lengths_match_prefixes(request in request_strategy()) {
        let payload = PayloadBuilder::default().build(&request).unwrap();
        assert_lengths(payload.fields())?;

        let parsed = parse_payload(payload.as_str()).unwrap();
        prop_assert_eq!(parsed.fields(), payload.fields());
    }

    /// Building twice yields byte-identical output
    #[test]
    fn build_is_idempotent(request in request_strategy()) {
        let builder = PayloadBuilder::default();
        let a = builder.build(&request).unwrap();
        let b = builder.build(&request).unwrap();
        prop_assert_eq!(a.as_str(), b.as_str());
    }

    /// The trailing checksum always verifies and covers the 6304 prefix
    #[test]
    fn checksum_covers_body(request in request_strategy()) {
        let payload = PayloadBuilder::default().build(&request).unwrap();
        let text = payload.as_str();
        prop_assert!(verify_checksum(text));
        let (body, crc) = text.split_at(text.len() - 4);
        prop_assert!(body.ends_with("6304"));
        prop_assert_eq!(crc, crc16(body));
    }

    /// Amount field present exactly when the amount is non-zero
    #[test]
    fn amount_field_presence(request in request_strategy()) {
        let payload = PayloadBuilder::default().build(&request).unwrap();
        match payload.field("54") {
            Some(field) => {
                prop_assert!(!request.amount.is_unspecified());
                let (_, fraction) = field.value().split_once('.').unwrap();
                prop_assert_eq!(fraction.len(), 2);
            }
            None => prop_assert!(request.amount.is_unspecified()),
        }
    }

    /// Normalizer output is uppercase alphanumeric/space and bounded
    #[test]
    fn normalizer_alphabet_and_length(text in "\\PC{0,80}", max_len in 0usize..40) {
        let out = normalize(&text, max_len);
        prop_assert!(out.chars().count() <= max_len);
        prop_assert!(out.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase() || c == ' '));
        prop_assert!(!out.starts_with(' '));
    }

    /// Normalizing twice changes nothing
    #[test]
    fn normalizer_is_idempotent(text in "\\PC{0,80}") {
        let once = normalize(&text, 25);
        prop_assert_eq!(normalize(&once, 25), once.trim_end().to_string());
    }
}
