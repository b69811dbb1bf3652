//! Error types for pixkit operations.
//!
//! Encoding failures (`InvalidKey`, `FieldTooLong`, ...) are fatal for the
//! payload being built: no partial payload is ever returned. Collaborator
//! failures (`Clipboard`, `Render`) are reported upward as notifications and
//! never invalidate a running session.

use std::fmt;

/// Stable numeric codes, grouped by the layer that raised the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum PixErrorCode {
    /// Recipient key formatted to nothing
    InvalidKey = 1000,
    /// TLV value longer than a 2-digit length prefix can describe
    FieldTooLong = 1001,
    /// TLV tag is not two ASCII digits
    InvalidTag = 1002,
    /// Negative or unparsable amount
    InvalidAmount = 2000,
    /// Request field outside its accepted range
    InvalidData = 2001,
    /// Payload text could not be split into fields
    MalformedPayload = 3000,
    /// Trailing CRC does not match the payload
    ChecksumMismatch = 3001,
    /// Session countdown reached zero
    SessionExpired = 4000,
    /// Controller used before a session was started
    NoActiveSession = 4001,
    /// Clipboard collaborator failed
    Clipboard = 5000,
    /// QR renderer collaborator failed
    Render = 5001,
    /// Configuration error
    Config = 6000,
    /// Serialization error
    Serialization = 6001,
}

/// Comprehensive error type for pixkit operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixError {
    /// The recipient key is empty once formatted.
    InvalidKey {
        /// Why the key was rejected
        reason: String,
    },

    /// A TLV value does not fit the 2-digit length prefix.
    FieldTooLong {
        /// Tag of the offending field
        tag: String,
        /// Actual value length in characters
        length: usize,
    },

    /// A TLV tag that is not exactly two ASCII digits.
    InvalidTag(String),

    /// Negative or unparsable amount.
    InvalidAmount(String),

    /// A request field is outside its accepted range.
    InvalidData {
        /// Field or parameter name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Payload text is not a well-formed TLV sequence.
    MalformedPayload(String),

    /// Payload CRC does not match its content.
    ChecksumMismatch {
        /// CRC computed over the payload
        expected: String,
        /// CRC carried by the payload
        actual: String,
    },

    /// The session expired; its payload is stale.
    SessionExpired {
        /// Transaction id of the stale session
        transaction_id: String,
    },

    /// No session has been started yet.
    NoActiveSession,

    /// Clipboard collaborator failed.
    Clipboard(String),

    /// QR renderer collaborator failed.
    Render(String),

    /// Configuration rejected.
    Config(String),

    /// Serialization/deserialization error.
    Serialization(String),
}

impl PixError {
    /// Numeric code for this error.
    pub fn code(&self) -> PixErrorCode {
        match self {
            Self::InvalidKey { .. } => PixErrorCode::InvalidKey,
            Self::FieldTooLong { .. } => PixErrorCode::FieldTooLong,
            Self::InvalidTag(_) => PixErrorCode::InvalidTag,
            Self::InvalidAmount(_) => PixErrorCode::InvalidAmount,
            Self::InvalidData { .. } => PixErrorCode::InvalidData,
            Self::MalformedPayload(_) => PixErrorCode::MalformedPayload,
            Self::ChecksumMismatch { .. } => PixErrorCode::ChecksumMismatch,
            Self::SessionExpired { .. } => PixErrorCode::SessionExpired,
            Self::NoActiveSession => PixErrorCode::NoActiveSession,
            Self::Clipboard(_) => PixErrorCode::Clipboard,
            Self::Render(_) => PixErrorCode::Render,
            Self::Config(_) => PixErrorCode::Config,
            Self::Serialization(_) => PixErrorCode::Serialization,
        }
    }

    /// Returns false for collaborator failures that the UI should surface as a
    /// notification while keeping the session alive.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::Clipboard(_) | Self::Render(_) | Self::SessionExpired { .. }
        )
    }

    /// Create an invalid key error.
    pub fn invalid_key(reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            reason: reason.into(),
        }
    }

    /// Create an invalid data error.
    pub fn invalid_data(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKey { reason } => write!(f, "invalid recipient key: {}", reason),
            Self::FieldTooLong { tag, length } => {
                write!(
                    f,
                    "field {} is {} characters long, at most 99 fit the length prefix",
                    tag, length
                )
            }
            Self::InvalidTag(tag) => write!(f, "invalid field tag {:?}: expected two digits", tag),
            Self::InvalidAmount(msg) => write!(f, "invalid amount: {}", msg),
            Self::InvalidData { field, reason } => write!(f, "invalid {}: {}", field, reason),
            Self::MalformedPayload(msg) => write!(f, "malformed payload: {}", msg),
            Self::ChecksumMismatch { expected, actual } => {
                write!(
                    f,
                    "checksum mismatch: payload carries {}, content hashes to {}",
                    actual, expected
                )
            }
            Self::SessionExpired { transaction_id } => {
                write!(f, "payment code {} expired, refresh it", transaction_id)
            }
            Self::NoActiveSession => write!(f, "no active payment session"),
            Self::Clipboard(msg) => write!(f, "clipboard error: {}", msg),
            Self::Render(msg) => write!(f, "render error: {}", msg),
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Serialization(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for PixError {}

impl From<serde_json::Error> for PixError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
