//! Test utilities for pixkit.
//!
//! This module provides:
//! - Fixtures for common recipient keys and checkout requests
//! - Collaborator doubles (a clipboard that always fails)
//! - Assertion helpers for payload structure
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pixkit_lib::test_utils::{assert_payload_well_formed, TestFixtures};
//! use pixkit_lib::payload::build;
//!
//! let code = build(&TestFixtures::checkout_request()).unwrap();
//! assert_payload_well_formed(&code);
//! ```

mod assertions;
mod doubles;
mod fixtures;

pub use assertions::{assert_field_lengths_consistent, assert_payload_well_formed};
pub use doubles::FailingClipboard;
pub use fixtures::TestFixtures;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{classify, KeyType};
    use crate::payload::{build, PaymentRequest};

    #[test]
    fn test_fixture_keys_cover_every_known_type() {
        let types: Vec<KeyType> = TestFixtures::RAW_KEYS.iter().map(|k| classify(k)).collect();
        for expected in [
            KeyType::Cpf,
            KeyType::Cnpj,
            KeyType::Phone,
            KeyType::Email,
            KeyType::RandomKey,
        ] {
            assert!(types.contains(&expected), "no fixture for {}", expected);
        }
    }

    #[test]
    fn test_every_fixture_builds_well_formed_payloads() {
        for request in TestFixtures::requests_for_all_key_types() {
            assert_payload_well_formed(&build(&request).unwrap());
        }

        for name in TestFixtures::MERCHANT_NAMES {
            for city in TestFixtures::MERCHANT_CITIES {
                let request = PaymentRequest::new("12345678901").with_merchant(*name, *city);
                assert_payload_well_formed(&build(&request).unwrap());
            }
        }
    }

    #[test]
    #[should_panic(expected = "malformed")]
    fn test_assertion_rejects_tampered_payload() {
        let code = build(&TestFixtures::checkout_request()).unwrap();
        assert_payload_well_formed(&code.replace("TESTE123", "TESTE124"));
    }
}
