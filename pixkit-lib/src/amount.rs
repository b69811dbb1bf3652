//! Payment amount in BRL with exactly two fractional digits.
//!
//! Uses `rust_decimal` fixed-point arithmetic; a zero amount means "amount not
//! specified" and suppresses the `54` field of the payload.

use crate::{PixError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Non-negative amount rounded to cents.
///
/// # Examples
///
/// ```rust
/// use pixkit_lib::PaymentAmount;
///
/// let amt: PaymentAmount = "49.9".parse().unwrap();
/// assert_eq!(amt.to_string(), "49.90");
/// assert!(PaymentAmount::zero().is_unspecified());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct PaymentAmount {
    value: Decimal,
}

impl PaymentAmount {
    /// Create from a decimal value, rounding half away from zero to cents.
    ///
    /// # Errors
    ///
    /// Returns [`PixError::InvalidAmount`] for negative values.
    pub fn new(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(PixError::InvalidAmount(format!(
                "{} is negative",
                value
            )));
        }
        let mut value = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        value.rescale(2);
        Ok(Self { value })
    }

    /// Create from an integer number of cents.
    ///
    /// # Errors
    ///
    /// Returns [`PixError::InvalidAmount`] for negative values.
    pub fn from_cents(cents: i64) -> Result<Self> {
        Self::new(Decimal::new(cents, 2))
    }

    /// Parse a decimal string such as `"49.90"`. A comma decimal separator
    /// (`"49,90"`) is accepted as typed at a Brazilian checkout.
    ///
    /// # Errors
    ///
    /// Returns [`PixError::InvalidAmount`] if the string is not a non-negative
    /// decimal.
    pub fn from_str_checked(s: &str) -> Result<Self> {
        let s = s.trim();
        let normalized = if s.contains(',') && !s.contains('.') {
            s.replace(',', ".")
        } else {
            s.to_string()
        };
        let value = Decimal::from_str(&normalized)
            .map_err(|e| PixError::InvalidAmount(format!("{:?}: {}", s, e)))?;
        Self::new(value)
    }

    /// The "amount not specified" value.
    pub fn zero() -> Self {
        Self {
            value: Decimal::new(0, 2),
        }
    }

    /// True when no amount should be encoded.
    pub fn is_unspecified(&self) -> bool {
        self.value.is_zero()
    }

    /// Get the internal Decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    /// Wire form with exactly two fractional digits, or `None` when the
    /// amount is unspecified.
    pub fn to_field_value(&self) -> Option<String> {
        if self.is_unspecified() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl fmt::Display for PaymentAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.value)
    }
}

impl FromStr for PaymentAmount {
    type Err = PixError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_str_checked(s)
    }
}

impl TryFrom<Decimal> for PaymentAmount {
    type Error = PixError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for PaymentAmount {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Accept both JSON numbers and strings; route through the same
        // validation as the public constructors.
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_two_fraction_digits() {
        assert_eq!(PaymentAmount::new(dec!(49.9)).unwrap().to_string(), "49.90");
        assert_eq!(PaymentAmount::new(dec!(10)).unwrap().to_string(), "10.00");
        assert_eq!(PaymentAmount::new(dec!(0.005)).unwrap().to_string(), "0.01");
        assert_eq!(PaymentAmount::new(dec!(1.234)).unwrap().to_string(), "1.23");
        assert_eq!(PaymentAmount::from_cents(4990).unwrap().to_string(), "49.90");
    }

    #[test]
    fn test_zero_is_unspecified() {
        assert!(PaymentAmount::zero().is_unspecified());
        assert!(PaymentAmount::default().is_unspecified());
        assert_eq!(PaymentAmount::zero().to_field_value(), None);
        assert!(PaymentAmount::new(dec!(0.001)).unwrap().is_unspecified());
        assert_eq!(
            PaymentAmount::new(dec!(49.90)).unwrap().to_field_value(),
            Some("49.90".to_string())
        );
    }

    #[test]
    fn test_negative_rejected() {
        assert!(matches!(
            PaymentAmount::new(dec!(-1)),
            Err(PixError::InvalidAmount(_))
        ));
        assert!(PaymentAmount::from_cents(-1).is_err());
        assert!("-0.50".parse::<PaymentAmount>().is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            "49.90".parse::<PaymentAmount>().unwrap(),
            PaymentAmount::from_cents(4990).unwrap()
        );
        assert_eq!(
            "49,90".parse::<PaymentAmount>().unwrap().to_string(),
            "49.90"
        );
        assert!("abc".parse::<PaymentAmount>().is_err());
        assert!("".parse::<PaymentAmount>().is_err());
    }

    #[test]
    fn test_serde() {
        let amt: PaymentAmount = serde_json::from_str("49.9").unwrap();
        assert_eq!(amt.to_string(), "49.90");
        let amt: PaymentAmount = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(amt.to_string(), "12.50");
        assert!(serde_json::from_str::<PaymentAmount>("-3").is_err());

        let request: crate::PaymentRequest =
            serde_json::from_str(r#"{"recipientKey": "12345678901", "amount": 0.1}"#).unwrap();
        assert_eq!(request.amount.to_string(), "0.10");
    }
}
