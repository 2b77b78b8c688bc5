//! Authenticity check for gateway notifications.
//!
//! `signature_key = hex(SHA-512(order_id + status_code + gross_amount + server_key))`

use crate::payments::utils::secure_eq;
use sha2::{Digest, Sha512};

/// Lowercase hex SHA-512 over the concatenated fields, no separators.
pub fn notification_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    secret: &str,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// True only when `provided` is exactly the expected digest.
pub fn verify_notification_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    provided: &str,
    secret: &str,
) -> bool {
    let expected = notification_signature(order_id, status_code, gross_amount, secret);
    secure_eq(expected.as_bytes(), provided.as_bytes())
}

/// Verifier bound to the server key it was constructed with.
#[derive(Clone)]
pub struct SignatureVerifier {
    server_key: String,
}

impl SignatureVerifier {
    pub fn new(server_key: impl Into<String>) -> Self {
        Self {
            server_key: server_key.into(),
        }
    }

    pub fn verify(
        &self,
        order_id: &str,
        status_code: &str,
        gross_amount: &str,
        provided: &str,
    ) -> bool {
        verify_notification_signature(
            order_id,
            status_code,
            gross_amount,
            provided,
            &self.server_key,
        )
    }

    pub fn sign(&self, order_id: &str, status_code: &str, gross_amount: &str) -> String {
        notification_signature(order_id, status_code, gross_amount, &self.server_key)
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("server_key", &"<redacted>")
            .finish()
    }
}
