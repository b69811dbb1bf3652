//! Configuration for payload building and QR sessions.

use crate::normalize::normalize;
use crate::payload::{MAX_CITY_LEN, MAX_NAME_LEN};
use crate::session::MAX_EXPIRATION_MINUTES;
use crate::{PixError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Globally unique identifier of the Pix arrangement, placed in `26/00`.
pub const PIX_DOMAIN: &str = "br.gov.bcb.pix";

/// Encoder and session settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixConfig {
    /// Domain identifier literal for the merchant account info field.
    #[serde(default = "default_key_domain")]
    pub key_domain: String,

    /// Merchant name used when the request's name normalizes to nothing.
    #[serde(default = "default_merchant_name")]
    pub default_merchant_name: String,

    /// Merchant city used when the request's city normalizes to nothing.
    #[serde(default = "default_merchant_city")]
    pub default_merchant_city: String,

    /// Session lifetime used when a request asks for 0 minutes.
    #[serde(default = "default_expiration_minutes")]
    pub default_expiration_minutes: u32,

    /// Countdown tick period in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_key_domain() -> String {
    PIX_DOMAIN.to_string()
}

fn default_merchant_name() -> String {
    "LOJA".to_string()
}

fn default_merchant_city() -> String {
    "CIDADE".to_string()
}

fn default_expiration_minutes() -> u32 {
    5
}

fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for PixConfig {
    fn default() -> Self {
        Self {
            key_domain: default_key_domain(),
            default_merchant_name: default_merchant_name(),
            default_merchant_city: default_merchant_city(),
            default_expiration_minutes: default_expiration_minutes(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl PixConfig {
    /// Load from a JSON document; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a serialization error for malformed JSON and a config error if
    /// [`PixConfig::validate`] rejects the result.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the merchant account domain literal.
    pub fn with_key_domain(mut self, domain: impl Into<String>) -> Self {
        self.key_domain = domain.into();
        self
    }

    /// Set the fallback merchant name and city.
    pub fn with_merchant_defaults(
        mut self,
        name: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        self.default_merchant_name = name.into();
        self.default_merchant_city = city.into();
        self
    }

    /// Set the default session lifetime.
    pub fn with_expiration_minutes(mut self, minutes: u32) -> Self {
        self.default_expiration_minutes = minutes;
        self
    }

    /// Set the countdown tick period.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Countdown tick period.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Check the configuration for values that would yield unusable payloads.
    ///
    /// # Errors
    ///
    /// Returns [`PixError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.key_domain.trim().is_empty() {
            return Err(PixError::Config("keyDomain must not be empty".into()));
        }
        if normalize(&self.default_merchant_name, MAX_NAME_LEN).is_empty() {
            return Err(PixError::Config(
                "defaultMerchantName normalizes to nothing".into(),
            ));
        }
        if normalize(&self.default_merchant_city, MAX_CITY_LEN).is_empty() {
            return Err(PixError::Config(
                "defaultMerchantCity normalizes to nothing".into(),
            ));
        }
        if self.default_expiration_minutes == 0
            || self.default_expiration_minutes > MAX_EXPIRATION_MINUTES
        {
            return Err(PixError::Config(format!(
                "defaultExpirationMinutes must be between 1 and {}",
                MAX_EXPIRATION_MINUTES
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(PixError::Config("tickIntervalMs must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PixConfig::default();
        assert_eq!(config.key_domain, "br.gov.bcb.pix");
        assert_eq!(config.default_merchant_name, "LOJA");
        assert_eq!(config.default_merchant_city, "CIDADE");
        assert_eq!(config.default_expiration_minutes, 5);
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = PixConfig::from_json(r#"{"defaultExpirationMinutes": 10}"#).unwrap();
        assert_eq!(config.default_expiration_minutes, 10);
        assert_eq!(config.key_domain, PIX_DOMAIN);
    }

    #[test]
    fn test_validate_rejects() {
        assert!(PixConfig::default().with_key_domain(" ").validate().is_err());
        assert!(PixConfig::default()
            .with_merchant_defaults("!!!", "CIDADE")
            .validate()
            .is_err());
        assert!(PixConfig::default()
            .with_expiration_minutes(0)
            .validate()
            .is_err());
        assert!(PixConfig::default()
            .with_expiration_minutes(MAX_EXPIRATION_MINUTES + 1)
            .validate()
            .is_err());
        assert!(PixConfig::default()
            .with_tick_interval(Duration::ZERO)
            .validate()
            .is_err());
        assert!(matches!(
            PixConfig::from_json(r#"{"tickIntervalMs": 0}"#),
            Err(PixError::Config(_))
        ));
        assert!(matches!(
            PixConfig::from_json("not json"),
            Err(PixError::Serialization(_))
        ));
    }
}
