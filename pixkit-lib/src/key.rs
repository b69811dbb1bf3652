//! Recipient key classification and canonical formatting.
//!
//! A Pix key is one of: an individual taxpayer number (CPF, 11 digits), a
//! company taxpayer number (CNPJ, 14 digits), a phone number, an e-mail
//! address, or a random UUID-shaped key (EVP). Classification runs an ordered
//! decision list: lexical markers (`@`, UUID shape, leading `+`) first, digit
//! counting last, because bare digit counts are ambiguous between CPF and
//! phone numbers.
//!
//! # Examples
//!
//! ```rust
//! use pixkit_lib::key::{classify, KeyType, RecipientKey};
//!
//! assert_eq!(classify("user@example.com"), KeyType::Email);
//! assert_eq!(classify("(11) 99999-8888"), KeyType::Phone);
//!
//! let key = RecipientKey::parse("123.456.789-01").unwrap();
//! assert_eq!(key.key_type(), KeyType::Cpf);
//! assert_eq!(key.formatted(), "12345678901");
//! ```

use crate::{PixError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

const COUNTRY_CODE: &str = "55";

/// Semantic type of a recipient identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// Individual taxpayer number, 11 digits.
    #[serde(rename = "CPF")]
    Cpf,
    /// Company taxpayer number, 14 digits.
    #[serde(rename = "CNPJ")]
    Cnpj,
    /// Phone number in `+55...` form.
    Phone,
    /// E-mail address.
    Email,
    /// UUID-shaped random key (EVP).
    RandomKey,
    /// Anything else; passed through as typed.
    Unknown,
}

impl KeyType {
    /// Human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpf => "CPF",
            Self::Cnpj => "CNPJ",
            Self::Phone => "Phone",
            Self::Email => "Email",
            Self::RandomKey => "RandomKey",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Determine the semantic type of a raw recipient identifier.
///
/// First match wins:
/// 1. contains `@` and `.` → [`KeyType::Email`]
/// 2. canonical `8-4-4-4-12` hex UUID → [`KeyType::RandomKey`]
/// 3. starts with `+` → [`KeyType::Phone`]
/// 4. by digit count: 14 → CNPJ; 11 → Phone if phone-shaped or `55`-prefixed,
///    else CPF; 10..=13 → Phone; anything else → Unknown.
pub fn classify(raw_key: &str) -> KeyType {
    let trimmed = raw_key.trim();

    if trimmed.contains('@') && trimmed.contains('.') {
        return KeyType::Email;
    }
    if is_uuid(trimmed) {
        return KeyType::RandomKey;
    }
    if trimmed.starts_with('+') {
        return KeyType::Phone;
    }

    let digits = digits_only(trimmed);
    match digits.len() {
        14 => KeyType::Cnpj,
        11 if is_phone_shaped(trimmed) || digits.starts_with(COUNTRY_CODE) => KeyType::Phone,
        11 => KeyType::Cpf,
        10..=13 => KeyType::Phone,
        _ => KeyType::Unknown,
    }
}

/// Rewrite `raw_key` into its canonical on-the-wire form for `key_type`.
///
/// # Errors
///
/// Returns [`PixError::InvalidKey`] when the formatted key is empty.
pub fn format(raw_key: &str, key_type: KeyType) -> Result<String> {
    let trimmed = raw_key.trim();

    let formatted = match key_type {
        KeyType::Email | KeyType::RandomKey => trimmed.to_lowercase(),
        KeyType::Cpf | KeyType::Cnpj => digits_only(trimmed),
        KeyType::Phone => format_phone(trimmed),
        KeyType::Unknown => trimmed.to_string(),
    };

    if formatted.is_empty() {
        return Err(PixError::invalid_key(format!(
            "{} key is empty after formatting",
            key_type
        )));
    }
    Ok(formatted)
}

fn format_phone(trimmed: &str) -> String {
    let digits = digits_only(trimmed);
    if digits.is_empty() {
        return String::new();
    }
    if trimmed.starts_with('+') || (digits.starts_with(COUNTRY_CODE) && digits.len() >= 12) {
        format!("+{}", digits)
    } else {
        format!("+{}{}", COUNTRY_CODE, digits)
    }
}

/// A classified, canonically formatted recipient key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientKey {
    raw: String,
    key_type: KeyType,
    formatted: String,
}

impl RecipientKey {
    /// Classify and format `raw`.
    ///
    /// # Errors
    ///
    /// Returns [`PixError::InvalidKey`] if the key formats to nothing.
    pub fn parse(raw: &str) -> Result<Self> {
        let key_type = classify(raw);
        let formatted = format(raw, key_type)?;
        tracing::debug!(key_type = %key_type, len = formatted.len(), "classified recipient key");
        Ok(Self {
            raw: raw.to_string(),
            key_type,
            formatted,
        })
    }

    /// The identifier as entered.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The classification result.
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// The canonical wire form.
    pub fn formatted(&self) -> &str {
        &self.formatted
    }
}

impl fmt::Display for RecipientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted)
    }
}

fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn is_uuid(s: &str) -> bool {
    // try_parse also accepts simple/braced/urn forms; only the hyphenated
    // 36-char form counts as a random key.
    s.len() == 36 && s.matches('-').count() == 4 && uuid::Uuid::try_parse(s).is_ok()
}

fn all_digits(s: &str, len: RangeInclusive<usize>) -> bool {
    len.contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

/// `DDDD-DDDD`, `DDDDD-DDDD`, or the same without the hyphen.
fn is_local_number(s: &str) -> bool {
    match s.split_once('-') {
        Some((head, tail)) => all_digits(head, 4..=5) && all_digits(tail, 4..=4),
        None => all_digits(s, 8..=9),
    }
}

fn strip_area_code(s: &str) -> Option<&str> {
    let area = s.get(..2)?;
    if all_digits(area, 2..=2) {
        s.get(2..)
    } else {
        None
    }
}

/// Known phone-formatting shapes: `(DD) DDDDD-DDDD`, `DD DDDDD-DDDD`, or a
/// `55`-prefixed 10-11 digit national number.
fn is_phone_shaped(s: &str) -> bool {
    if let Some(rest) = s.strip_prefix('(') {
        return strip_area_code(rest)
            .and_then(|r| r.strip_prefix(')'))
            .map(|r| is_local_number(r.strip_prefix(' ').unwrap_or(r)))
            .unwrap_or(false);
    }

    if let Some(rest) = strip_area_code(s).and_then(|r| r.strip_prefix(' ')) {
        return is_local_number(rest);
    }

    s.strip_prefix(COUNTRY_CODE)
        .map(|national| all_digits(national, 10..=11))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_lexical_markers() {
        assert_eq!(classify("user@example.com"), KeyType::Email);
        assert_eq!(
            classify("123e4567-e89b-12d3-a456-426614174000"),
            KeyType::RandomKey
        );
        assert_eq!(
            classify("123E4567-E89B-12D3-A456-426614174000"),
            KeyType::RandomKey
        );
        assert_eq!(classify("+5511999998888"), KeyType::Phone);
        assert_eq!(classify("+1 (555) 010-9999"), KeyType::Phone);
    }

    #[test]
    fn test_classify_by_digit_count() {
        assert_eq!(classify("12345678000190"), KeyType::Cnpj);
        assert_eq!(classify("12.345.678/0001-90"), KeyType::Cnpj);
        assert_eq!(classify("12345678901"), KeyType::Cpf);
        assert_eq!(classify("123.456.789-01"), KeyType::Cpf);
        assert_eq!(classify("1199998888"), KeyType::Phone);
        assert_eq!(classify("551199998888"), KeyType::Phone);
        assert_eq!(classify("5511999998888"), KeyType::Phone);
        assert_eq!(classify("123456789"), KeyType::Unknown);
        assert_eq!(classify("123456789012345"), KeyType::Unknown);
        assert_eq!(classify(""), KeyType::Unknown);
    }

    #[test]
    fn test_eleven_digit_disambiguation() {
        assert_eq!(classify("(11) 99999-8888"), KeyType::Phone);
        assert_eq!(classify("(11)99999-8888"), KeyType::Phone);
        assert_eq!(classify("11 99999-8888"), KeyType::Phone);
        assert_eq!(classify("11 999998888"), KeyType::Phone);
        // country-code prefix wins over CPF
        assert_eq!(classify("55123456789"), KeyType::Phone);
        assert_eq!(classify("11999998888"), KeyType::Cpf);
    }

    #[test]
    fn test_uuid_shape_is_strict() {
        assert!(is_uuid("123e4567-e89b-12d3-a456-426614174000"));
        assert!(!is_uuid("123e4567e89b12d3a456426614174000"));
        assert!(!is_uuid("{123e4567-e89b-12d3-a456-426614174000}"));
        assert!(!is_uuid("123e4567-e89b-12d3-a456-42661417400g"));
    }

    #[test]
    fn test_format_rules() {
        assert_eq!(
            format("  User@Example.COM ", KeyType::Email).unwrap(),
            "user@example.com"
        );
        assert_eq!(
            format(
                "123E4567-E89B-12D3-A456-426614174000",
                KeyType::RandomKey
            )
            .unwrap(),
            "123e4567-e89b-12d3-a456-426614174000"
        );
        assert_eq!(
            format("123.456.789-01", KeyType::Cpf).unwrap(),
            "12345678901"
        );
        assert_eq!(
            format("12.345.678/0001-90", KeyType::Cnpj).unwrap(),
            "12345678000190"
        );
        assert_eq!(format("  weird-key ", KeyType::Unknown).unwrap(), "weird-key");
    }

    #[test]
    fn test_format_phone() {
        assert_eq!(
            format("+55 (11) 99999-8888", KeyType::Phone).unwrap(),
            "+5511999998888"
        );
        assert_eq!(
            format("5511999998888", KeyType::Phone).unwrap(),
            "+5511999998888"
        );
        assert_eq!(
            format("(11) 99999-8888", KeyType::Phone).unwrap(),
            "+5511999998888"
        );
        // 55 prefix but too short to carry a country code
        assert_eq!(
            format("55123456789", KeyType::Phone).unwrap(),
            "+5555123456789"
        );
    }

    #[test]
    fn test_format_empty_is_invalid_key() {
        assert!(matches!(
            format("   ", KeyType::Unknown),
            Err(PixError::InvalidKey { .. })
        ));
        assert!(matches!(
            format("+", KeyType::Phone),
            Err(PixError::InvalidKey { .. })
        ));
        assert!(matches!(
            format("abc", KeyType::Cpf),
            Err(PixError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_recipient_key_parse() {
        let key = RecipientKey::parse("12345678901").unwrap();
        assert_eq!(key.key_type(), KeyType::Cpf);
        assert_eq!(key.formatted(), "12345678901");
        assert_eq!(key.raw(), "12345678901");
        assert_eq!(key.to_string(), "12345678901");

        assert!(RecipientKey::parse("").is_err());
    }
}
