//! Payload assertion helpers.

use crate::decode::parse_payload;
use crate::tlv::EmvField;

/// Assert every field's length prefix matches its value length, recursing
/// into composites.
///
/// # Panics
/// Panics on the first inconsistent field.
pub fn assert_field_lengths_consistent(fields: &[EmvField]) {
    for field in fields {
        let serialized = field.serialize();
        let prefix: usize = serialized[2..4]
            .parse()
            .unwrap_or_else(|_| panic!("field {} has a non-numeric length", field.tag()));
        assert_eq!(
            prefix,
            field.value().encode_utf16().count(),
            "field {} length prefix disagrees with its value",
            field.tag()
        );
        assert_field_lengths_consistent(field.children());
    }
}

/// Assert `text` parses, carries a valid CRC, and has consistent lengths.
///
/// # Panics
/// Panics if the payload is malformed.
pub fn assert_payload_well_formed(text: &str) {
    match parse_payload(text) {
        Ok(parsed) => assert_field_lengths_consistent(parsed.fields()),
        Err(e) => panic!("payload {:?} is malformed: {}", text, e),
    }
}
