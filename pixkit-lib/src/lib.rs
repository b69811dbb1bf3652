//! pixkit library.
//!
//! Builds BR Code "copy-and-paste" instant-payment codes: an EMV-style
//! tag-length-value payload with a CRC16 checksum, generated from a recipient
//! key, an amount and merchant metadata. Also manages the short-lived
//! display lifecycle (countdown, expiration, refresh) of a rendered code.
//!
//! Encoding is pure and synchronous. All I/O (QR rendering, clipboard, the
//! clock) is delegated to callers through the ports in [`session::ports`].
//!
//! # Example
//!
//! ```
//! use pixkit_lib::{build, decode::parse_payload, PaymentRequest};
//!
//! let request = PaymentRequest::new("12345678901")
//!     .with_amount("49.90".parse().unwrap())
//!     .with_merchant("Restaurante Teste", "Sao Paulo")
//!     .with_transaction_id("TESTE123");
//!
//! let code = build(&request).unwrap();
//! let parsed = parse_payload(&code).unwrap();
//! assert_eq!(parsed.merchant_name(), Some("RESTAURANTE TESTE"));
//! ```

pub mod amount;
pub mod config;
pub mod crc;
pub mod decode;
pub mod errors;
pub mod key;
pub mod normalize;
pub mod payload;
pub mod prelude;
pub mod session;
pub mod tlv;
pub mod txid;

/// Test utilities for payload and session testing.
///
/// This module is only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use amount::PaymentAmount;
pub use config::PixConfig;
pub use errors::{PixError, PixErrorCode};
pub use key::{KeyType, RecipientKey};
pub use payload::{build, MerchantInfo, Payload, PayloadBuilder, PaymentRequest};
pub use session::{QrSession, QrSessionController, SessionSnapshot, SessionState};
pub use txid::TransactionId;

/// Common result alias for pixkit operations.
pub type Result<T> = std::result::Result<T, PixError>;
