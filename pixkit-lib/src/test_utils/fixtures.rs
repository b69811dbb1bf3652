//! Test fixtures.

use crate::payload::PaymentRequest;

/// Collection of commonly used test fixtures.
pub struct TestFixtures;

impl TestFixtures {
    /// One raw key per classification, as a user would type it.
    pub const RAW_KEYS: &'static [&'static str] = &[
        "123.456.789-01",
        "12.345.678/0001-90",
        "(11) 99999-8888",
        "+5511999998888",
        "Contato@Restaurante.com.br",
        "123e4567-e89b-12d3-a456-426614174000",
    ];

    /// Merchant names with accents and punctuation.
    pub const MERCHANT_NAMES: &'static [&'static str] = &[
        "Restaurante Teste",
        "Açaí & Cia.",
        "Churrascaria Gaúcha do Sul - Unidade Centro",
        "",
    ];

    /// Cities with accents.
    pub const MERCHANT_CITIES: &'static [&'static str] =
        &["São Paulo", "Florianópolis", "Ribeirão Preto", ""];

    /// The reference checkout: CPF key, R$ 49,90, explicit txid.
    pub fn checkout_request() -> PaymentRequest {
        PaymentRequest::new("12345678901")
            .with_amount(crate::PaymentAmount::from_cents(4990).unwrap_or_default())
            .with_merchant("Restaurante Teste", "Sao Paulo")
            .with_expiration_minutes(5)
            .with_transaction_id("TESTE123")
    }

    /// A request for each raw key, otherwise identical to `checkout_request`.
    pub fn requests_for_all_key_types() -> Vec<PaymentRequest> {
        Self::RAW_KEYS
            .iter()
            .map(|key| PaymentRequest {
                recipient_key: key.to_string(),
                ..Self::checkout_request()
            })
            .collect()
    }
}
