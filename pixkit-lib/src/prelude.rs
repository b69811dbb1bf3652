//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use pixkit_lib::prelude::*;
//! ```

// Encoding
pub use crate::amount::PaymentAmount;
pub use crate::key::{classify, KeyType, RecipientKey};
pub use crate::payload::{build, MerchantInfo, Payload, PayloadBuilder, PaymentRequest};
pub use crate::tlv::EmvField;
pub use crate::txid::TransactionId;

// Reading
pub use crate::decode::{parse_payload, verify_checksum, ParsedPayload};

// Sessions and ports
pub use crate::session::{
    ClipboardPort, ClockPort, QrSession, QrSessionController, SessionSnapshot, SessionState,
    SystemClock, TickOutcome,
};

// Configuration and errors
pub use crate::config::PixConfig;
pub use crate::errors::{PixError, PixErrorCode};
pub use crate::Result;
