//! Reader for copy-and-paste payment codes.
//!
//! Splits a payload string back into its fields and checks its CRC. Works on
//! the text only; scanning QR images is left to the caller.

use crate::amount::PaymentAmount;
use crate::crc::crc16;
use crate::payload::{
    SUB_TAG_DESCRIPTION, SUB_TAG_KEY, SUB_TAG_TXID, TAG_ADDITIONAL_DATA, TAG_AMOUNT,
    TAG_FORMAT_INDICATOR, TAG_MERCHANT_ACCOUNT, TAG_MERCHANT_CITY, TAG_MERCHANT_NAME,
};
use crate::tlv::{parse_fields, EmvField};
use crate::txid::TransactionId;
use crate::{PixError, Result};

const CRC_PREFIX: &str = "6304";
const COMPOSITE_TAGS: [&str; 2] = [TAG_MERCHANT_ACCOUNT, TAG_ADDITIONAL_DATA];

/// A payload split into fields with a verified checksum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedPayload {
    fields: Vec<EmvField>,
    checksum: String,
}

impl ParsedPayload {
    /// Top-level fields in payload order, excluding the CRC field.
    pub fn fields(&self) -> &[EmvField] {
        &self.fields
    }

    /// Find a top-level field by tag.
    pub fn field(&self, tag: &str) -> Option<&EmvField> {
        self.fields.iter().find(|f| f.tag() == tag)
    }

    /// The verified CRC, uppercase.
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// Formatted recipient key (`26/01`).
    pub fn recipient_key(&self) -> Option<&str> {
        self.sub_value(TAG_MERCHANT_ACCOUNT, SUB_TAG_KEY)
    }

    /// Description (`26/02`), when present.
    pub fn description(&self) -> Option<&str> {
        self.sub_value(TAG_MERCHANT_ACCOUNT, SUB_TAG_DESCRIPTION)
    }

    /// Amount (`54`); `None` when the payload leaves it to the payer.
    pub fn amount(&self) -> Option<PaymentAmount> {
        self.field(TAG_AMOUNT)
            .and_then(|f| f.value().parse::<PaymentAmount>().ok())
    }

    pub fn merchant_name(&self) -> Option<&str> {
        self.field(TAG_MERCHANT_NAME).map(EmvField::value)
    }

    pub fn merchant_city(&self) -> Option<&str> {
        self.field(TAG_MERCHANT_CITY).map(EmvField::value)
    }

    /// Transaction id (`62/05`).
    pub fn transaction_id(&self) -> Option<TransactionId> {
        self.sub_value(TAG_ADDITIONAL_DATA, SUB_TAG_TXID)
            .map(TransactionId::new)
    }

    fn sub_value(&self, tag: &str, sub_tag: &str) -> Option<&str> {
        self.field(tag)
            .and_then(|f| f.child(sub_tag))
            .map(EmvField::value)
    }
}

/// Split `text` into the body the CRC covers (ending in `6304`) and the
/// 4-character CRC.
fn split_checksum(text: &str) -> Result<(&str, &str)> {
    let at = text
        .char_indices()
        .rev()
        .nth(3)
        .map(|(i, _)| i)
        .ok_or_else(|| PixError::MalformedPayload("payload too short".into()))?;
    let (body, checksum) = text.split_at(at);
    if !body.ends_with(CRC_PREFIX) {
        return Err(PixError::MalformedPayload(
            "missing trailing CRC field 6304".into(),
        ));
    }
    Ok((body, checksum))
}

/// True when `text` ends in a `6304` CRC field matching its content.
///
/// ```rust
/// use pixkit_lib::decode::verify_checksum;
/// use pixkit_lib::payload::{build, PaymentRequest};
///
/// let code = build(&PaymentRequest::new("user@example.com")).unwrap();
/// assert!(verify_checksum(&code));
/// assert!(!verify_checksum(&code.replace("LOJA", "LOJB")));
/// ```
pub fn verify_checksum(text: &str) -> bool {
    match split_checksum(text.trim()) {
        Ok((body, checksum)) => crc16(body).eq_ignore_ascii_case(checksum),
        Err(_) => false,
    }
}

/// Parse and verify a payment code.
///
/// # Errors
///
/// - [`PixError::MalformedPayload`] if the text is not a TLV sequence ending
///   in a CRC field, or does not start with the format indicator.
/// - [`PixError::ChecksumMismatch`] if the CRC does not match.
pub fn parse_payload(text: &str) -> Result<ParsedPayload> {
    let text = text.trim();
    let (body, checksum) = split_checksum(text)?;

    let expected = crc16(body);
    if !expected.eq_ignore_ascii_case(checksum) {
        return Err(PixError::ChecksumMismatch {
            expected,
            actual: checksum.to_string(),
        });
    }

    let content = &body[..body.len() - CRC_PREFIX.len()];
    let fields = parse_fields(content)?
        .into_iter()
        .map(|field| {
            if COMPOSITE_TAGS.contains(&field.tag()) {
                EmvField::composite(field.tag(), parse_fields(field.value())?)
            } else {
                Ok(field)
            }
        })
        .collect::<Result<Vec<_>>>()?;

    match fields.first() {
        Some(first) if first.tag() == TAG_FORMAT_INDICATOR => {}
        _ => {
            return Err(PixError::MalformedPayload(
                "payload must start with the format indicator".into(),
            ))
        }
    }

    Ok(ParsedPayload {
        fields,
        checksum: checksum.to_ascii_uppercase(),
    })
}
