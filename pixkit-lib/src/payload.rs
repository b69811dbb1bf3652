//! BR Code payload builder.
//!
//! Produces the "copy-and-paste" payment code: a fixed, ordered sequence of
//! EMV fields followed by the CRC field. Field order is part of the external
//! contract because verifiers hash the literal text and scanners read it left
//! to right:
//!
//! | Tag | Content |
//! |-----|---------|
//! | `00` | payload format indicator `"01"` |
//! | `26` | merchant account info: `00` domain, `01` key, optional `02` description |
//! | `52` | merchant category code `"0000"` |
//! | `53` | currency `"986"` (BRL) |
//! | `54` | amount, only when non-zero |
//! | `58` | country code `"BR"` |
//! | `59` | merchant name, ≤ 25 chars |
//! | `60` | merchant city, ≤ 15 chars |
//! | `62` | additional data: `05` txid |
//! | `63` | CRC16 over everything before it, including `"6304"` |
//!
//! # Example
//!
//! ```rust
//! use pixkit_lib::payload::{build, PaymentRequest};
//!
//! let request = PaymentRequest::new("12345678901")
//!     .with_amount("49.90".parse().unwrap())
//!     .with_merchant("Restaurante Teste", "Sao Paulo")
//!     .with_transaction_id("TESTE123");
//!
//! let code = build(&request).unwrap();
//! assert!(code.starts_with("000201"));
//! assert!(code.contains("540549.90"));
//! ```

use crate::amount::PaymentAmount;
use crate::config::PixConfig;
use crate::crc::crc16;
use crate::key::RecipientKey;
use crate::normalize::{normalize, normalize_or};
use crate::tlv::{EmvField, MAX_VALUE_LEN};
use crate::txid::TransactionId;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum merchant name length (`59`).
pub const MAX_NAME_LEN: usize = 25;
/// Maximum merchant city length (`60`).
pub const MAX_CITY_LEN: usize = 15;
/// Maximum description length (`26/02`) before space constraints apply.
pub const MAX_DESCRIPTION_LEN: usize = 72;

pub const TAG_FORMAT_INDICATOR: &str = "00";
pub const TAG_MERCHANT_ACCOUNT: &str = "26";
pub const TAG_CATEGORY_CODE: &str = "52";
pub const TAG_CURRENCY: &str = "53";
pub const TAG_AMOUNT: &str = "54";
pub const TAG_COUNTRY: &str = "58";
pub const TAG_MERCHANT_NAME: &str = "59";
pub const TAG_MERCHANT_CITY: &str = "60";
pub const TAG_ADDITIONAL_DATA: &str = "62";
pub const TAG_CRC: &str = "63";

/// Sub-tags of `26`.
pub const SUB_TAG_DOMAIN: &str = "00";
pub const SUB_TAG_KEY: &str = "01";
pub const SUB_TAG_DESCRIPTION: &str = "02";
/// Sub-tag of `62`.
pub const SUB_TAG_TXID: &str = "05";

const FORMAT_INDICATOR: &str = "01";
const CATEGORY_CODE: &str = "0000";
const CURRENCY_BRL: &str = "986";
const COUNTRY_BR: &str = "BR";
/// Tag and length of the CRC field; the checksum covers this prefix.
const CRC_PREFIX: &str = "6304";

/// Caller input for a payment code, as handed over by a checkout screen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Recipient identifier as entered or stored.
    pub recipient_key: String,
    /// Amount; zero means "not specified".
    #[serde(default)]
    pub amount: PaymentAmount,
    #[serde(default)]
    pub merchant_name: String,
    #[serde(default)]
    pub merchant_city: String,
    /// Session lifetime; 0 uses the configured default.
    #[serde(default)]
    pub expiration_minutes: u32,
    /// External correlation id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// Free-text message shown to the payer (`26/02`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PaymentRequest {
    /// Create a request with an unspecified amount and default merchant data.
    pub fn new(recipient_key: impl Into<String>) -> Self {
        Self {
            recipient_key: recipient_key.into(),
            amount: PaymentAmount::zero(),
            merchant_name: String::new(),
            merchant_city: String::new(),
            expiration_minutes: 0,
            transaction_id: None,
            description: None,
        }
    }

    pub fn with_amount(mut self, amount: PaymentAmount) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_merchant(mut self, name: impl Into<String>, city: impl Into<String>) -> Self {
        self.merchant_name = name.into();
        self.merchant_city = city.into();
        self
    }

    pub fn with_expiration_minutes(mut self, minutes: u32) -> Self {
        self.expiration_minutes = minutes;
        self
    }

    pub fn with_transaction_id(mut self, id: impl Into<String>) -> Self {
        self.transaction_id = Some(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Normalized merchant name and city.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantInfo {
    name: String,
    city: String,
}

impl MerchantInfo {
    /// Normalize with the standard `"LOJA"` / `"CIDADE"` fallbacks.
    pub fn new(name: &str, city: &str) -> Self {
        let defaults = PixConfig::default();
        Self::with_defaults(
            name,
            city,
            &defaults.default_merchant_name,
            &defaults.default_merchant_city,
        )
    }

    /// Normalize with caller-chosen fallbacks.
    pub fn with_defaults(name: &str, city: &str, default_name: &str, default_city: &str) -> Self {
        Self {
            name: normalize_or(name, MAX_NAME_LEN, default_name),
            city: normalize_or(city, MAX_CITY_LEN, default_city),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn city(&self) -> &str {
        &self.city
    }
}

/// A finished payment code and the fields it was assembled from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payload {
    fields: Vec<EmvField>,
    checksum: String,
    text: String,
}

impl Payload {
    /// The copy-and-paste text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consume into the copy-and-paste text.
    pub fn into_string(self) -> String {
        self.text
    }

    /// Top-level fields in emission order, excluding the CRC field.
    pub fn fields(&self) -> &[EmvField] {
        &self.fields
    }

    /// Find a top-level field by tag.
    pub fn field(&self, tag: &str) -> Option<&EmvField> {
        self.fields.iter().find(|f| f.tag() == tag)
    }

    /// The 4-hex-digit CRC.
    pub fn checksum(&self) -> &str {
        &self.checksum
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for Payload {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Builds payloads under a given configuration. Stateless; `build` may be
/// called concurrently and is idempotent for identical input.
#[derive(Clone, Debug, Default)]
pub struct PayloadBuilder {
    config: PixConfig,
}

impl PayloadBuilder {
    pub fn new(config: PixConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PixConfig {
        &self.config
    }

    /// Build a payload using the request's transaction id, or `"***"` when it
    /// carries none.
    ///
    /// # Errors
    ///
    /// - [`crate::PixError::InvalidKey`] when the recipient key formats to nothing.
    /// - [`crate::PixError::FieldTooLong`] when a field exceeds 99 characters.
    pub fn build(&self, request: &PaymentRequest) -> Result<Payload> {
        let txid = TransactionId::new(request.transaction_id.as_deref().unwrap_or(""));
        self.build_with_txid(request, &txid)
    }

    /// Build a payload with an explicit transaction id, ignoring the one in
    /// `request`.
    ///
    /// # Errors
    ///
    /// Same as [`PayloadBuilder::build`].
    #[tracing::instrument(skip_all, fields(txid = %txid))]
    pub fn build_with_txid(
        &self,
        request: &PaymentRequest,
        txid: &TransactionId,
    ) -> Result<Payload> {
        let key = RecipientKey::parse(&request.recipient_key)?;
        let merchant = MerchantInfo::with_defaults(
            &request.merchant_name,
            &request.merchant_city,
            &self.config.default_merchant_name,
            &self.config.default_merchant_city,
        );

        let mut fields = Vec::with_capacity(9);
        fields.push(EmvField::new(TAG_FORMAT_INDICATOR, FORMAT_INDICATOR)?);
        fields.push(self.merchant_account(&key, request.description.as_deref())?);
        fields.push(EmvField::new(TAG_CATEGORY_CODE, CATEGORY_CODE)?);
        fields.push(EmvField::new(TAG_CURRENCY, CURRENCY_BRL)?);
        if let Some(amount) = request.amount.to_field_value() {
            fields.push(EmvField::new(TAG_AMOUNT, amount)?);
        }
        fields.push(EmvField::new(TAG_COUNTRY, COUNTRY_BR)?);
        fields.push(EmvField::new(TAG_MERCHANT_NAME, merchant.name())?);
        fields.push(EmvField::new(TAG_MERCHANT_CITY, merchant.city())?);
        fields.push(EmvField::composite(
            TAG_ADDITIONAL_DATA,
            vec![EmvField::new(SUB_TAG_TXID, txid.as_str())?],
        )?);

        let mut text = String::new();
        for field in &fields {
            field.write_to(&mut text);
        }
        text.push_str(CRC_PREFIX);
        let checksum = crc16(&text);
        text.push_str(&checksum);

        tracing::debug!(
            key_type = %key.key_type(),
            field_count = fields.len(),
            checksum = %checksum,
            "built payload"
        );

        Ok(Payload {
            fields,
            checksum,
            text,
        })
    }

    fn merchant_account(&self, key: &RecipientKey, description: Option<&str>) -> Result<EmvField> {
        let mut children = vec![
            EmvField::new(SUB_TAG_DOMAIN, self.config.key_domain.as_str())?,
            EmvField::new(SUB_TAG_KEY, key.formatted())?,
        ];

        if let Some(description) = description {
            let used: usize = children.iter().map(|c| 4 + c.len()).sum();
            let room = MAX_VALUE_LEN.saturating_sub(used + 4);
            let description = normalize(description, MAX_DESCRIPTION_LEN.min(room));
            if !description.is_empty() {
                children.push(EmvField::new(SUB_TAG_DESCRIPTION, description)?);
            }
        }

        EmvField::composite(TAG_MERCHANT_ACCOUNT, children)
    }
}

/// Build the copy-and-paste text for `request` under the default configuration.
///
/// # Errors
///
/// Same as [`PayloadBuilder::build`].
pub fn build(request: &PaymentRequest) -> Result<String> {
    PayloadBuilder::default().build(request).map(Payload::into_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PixError;

    fn scenario() -> PaymentRequest {
        PaymentRequest::new("12345678901")
            .with_amount("49.90".parse().unwrap())
            .with_merchant("Restaurante Teste", "Sao Paulo")
            .with_transaction_id("TESTE123")
    }

    #[test]
    fn test_merchant_info_falls_back_to_defaults() {
        let merchant = MerchantInfo::new("Padaria São João", "");
        assert_eq!(merchant.name(), "PADARIA SAO JOAO");
        assert_eq!(merchant.city(), "CIDADE");

        let merchant = MerchantInfo::new("***", "Ribeirão Preto");
        assert_eq!(merchant.name(), "LOJA");
        assert_eq!(merchant.city(), "RIBEIRAO PRETO");
    }

    #[test]
    fn test_field_order() {
        let payload = PayloadBuilder::default().build(&scenario()).unwrap();
        let tags: Vec<&str> = payload.fields().iter().map(EmvField::tag).collect();
        assert_eq!(
            tags,
            vec!["00", "26", "52", "53", "54", "58", "59", "60", "62"]
        );
    }

    #[test]
    fn test_scenario_exact_text() {
        let payload = PayloadBuilder::default().build(&scenario()).unwrap();
        let body = concat!(
            "000201",
            "26330014br.gov.bcb.pix011112345678901",
            "52040000",
            "5303986",
            "540549.90",
            "5802BR",
            "5917RESTAURANTE TESTE",
            "6009SAO PAULO",
            "62120508TESTE123",
            "6304"
        );
        assert_eq!(payload.as_str(), format!("{}{}", body, crc16(body)));
        assert_eq!(payload.checksum(), crc16(body));
    }

    #[test]
    fn test_amount_omitted_when_zero() {
        let request = scenario().with_amount(PaymentAmount::zero());
        let payload = PayloadBuilder::default().build(&request).unwrap();
        assert!(payload.field(TAG_AMOUNT).is_none());
        assert_eq!(payload.fields()[4].tag(), TAG_COUNTRY);
    }

    #[test]
    fn test_defaults_for_empty_merchant_and_txid() {
        let payload = PayloadBuilder::default()
            .build(&PaymentRequest::new("user@example.com"))
            .unwrap();
        assert_eq!(payload.field(TAG_MERCHANT_NAME).unwrap().value(), "LOJA");
        assert_eq!(payload.field(TAG_MERCHANT_CITY).unwrap().value(), "CIDADE");
        assert_eq!(
            payload
                .field(TAG_ADDITIONAL_DATA)
                .unwrap()
                .child(SUB_TAG_TXID)
                .unwrap()
                .value(),
            "***"
        );
    }

    #[test]
    fn test_invalid_key_prevents_payload() {
        let err = build(&PaymentRequest::new("   ")).unwrap_err();
        assert!(matches!(err, PixError::InvalidKey { .. }));
    }

    #[test]
    fn test_idempotent() {
        let a = build(&scenario()).unwrap();
        let b = build(&scenario()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_description_fits_merchant_account() {
        let request = scenario().with_description("Pedido nº 42 - Mesa 7");
        let payload = PayloadBuilder::default().build(&request).unwrap();
        let account = payload.field(TAG_MERCHANT_ACCOUNT).unwrap();
        assert_eq!(
            account.child(SUB_TAG_DESCRIPTION).unwrap().value(),
            "PEDIDO N 42  MESA 7"
        );

        // Long e-mail key leaves no room: description is squeezed to fit.
        let long_key = format!("{}@example.com", "a".repeat(60));
        let request = PaymentRequest::new(long_key).with_description("x".repeat(80));
        let payload = PayloadBuilder::default().build(&request).unwrap();
        let account = payload.field(TAG_MERCHANT_ACCOUNT).unwrap();
        assert!(account.len() <= MAX_VALUE_LEN);
    }

    #[test]
    fn test_custom_domain() {
        let config = PixConfig::default().with_key_domain("BR.GOV.BCB.PIX");
        let payload = PayloadBuilder::new(config).build(&scenario()).unwrap();
        assert!(payload.as_str().contains("0014BR.GOV.BCB.PIX"));
    }

    #[test]
    fn test_request_from_json() {
        let request: PaymentRequest = serde_json::from_str(
            r#"{
                "recipientKey": "12345678901",
                "amount": 49.90,
                "merchantName": "Restaurante Teste",
                "merchantCity": "Sao Paulo",
                "expirationMinutes": 5,
                "transactionId": "TESTE123"
            }"#,
        )
        .unwrap();
        assert_eq!(request, scenario().with_expiration_minutes(5));
    }
}
