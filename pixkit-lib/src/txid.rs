//! Transaction identifier (`62/05`, "txid").

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum txid length inside the additional data field.
pub const MAX_TXID_LEN: usize = 25;

/// Placeholder used when no transaction id is set.
pub const UNSET_TXID: &str = "***";

const GENERATED_LEN: usize = 20;

/// A sanitized transaction id: `[A-Za-z0-9*]`, at most 25 characters, never
/// empty (`"***"` when unset).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Sanitize an externally supplied id. Characters outside `[A-Za-z0-9*]`
    /// are dropped and the result truncated; an empty result becomes `"***"`.
    ///
    /// ```rust
    /// use pixkit_lib::TransactionId;
    ///
    /// assert_eq!(TransactionId::new("pedido-42/mesa 7").as_str(), "pedido42mesa7");
    /// assert_eq!(TransactionId::new("").as_str(), "***");
    /// ```
    pub fn new(raw: &str) -> Self {
        let sanitized: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '*')
            .take(MAX_TXID_LEN)
            .collect();

        if sanitized.is_empty() {
            Self::unset()
        } else {
            Self(sanitized)
        }
    }

    /// The `"***"` placeholder.
    pub fn unset() -> Self {
        Self(UNSET_TXID.to_string())
    }

    /// Sanitize `raw` when present, otherwise generate a fresh id.
    pub fn from_optional(raw: Option<&str>) -> Self {
        match raw {
            Some(raw) => Self::new(raw),
            None => Self::generate(),
        }
    }

    /// Generate a fresh uppercase alphanumeric id.
    pub fn generate() -> Self {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_LEN)
            .map(|b| char::from(b).to_ascii_uppercase())
            .collect();
        Self(id)
    }

    /// Generate a fresh id guaranteed to differ from `previous`.
    pub fn generate_distinct_from(previous: &TransactionId) -> Self {
        loop {
            let candidate = Self::generate();
            if &candidate != previous {
                return candidate;
            }
        }
    }

    /// True for the `"***"` placeholder.
    pub fn is_unset(&self) -> bool {
        self.0 == UNSET_TXID
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::unset()
    }
}

impl From<&str> for TransactionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for TransactionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
