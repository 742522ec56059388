//! Merchant callback signature verification.
//!
//! Coinbase signs merchant callback (webhook) payloads with an RSA key:
//! the `X-Signature` header carries a base64-encoded PKCS#1 v1.5 SHA-256
//! signature over the raw request body. Verification is independent of the
//! request flow and needs no credentials, only the bundled public key.

use std::sync::OnceLock;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use rsa::RsaPublicKey;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::sha2::Sha256;
use rsa::signature::Verifier;

/// The bundled Coinbase callback public key (PEM, SPKI format).
const CALLBACK_PUBLIC_KEY_PEM: &str = include_str!("coinbase-callback.pub");

fn callback_public_key() -> &'static RsaPublicKey {
    static KEY: OnceLock<RsaPublicKey> = OnceLock::new();
    KEY.get_or_init(|| {
        RsaPublicKey::from_public_key_pem(CALLBACK_PUBLIC_KEY_PEM)
            .expect("bundled callback public key is valid PEM")
    })
}

/// Verify a merchant callback body against its base64-encoded signature,
/// using the bundled Coinbase public key.
///
/// Returns `false` for any invalid input (undecodable base64, malformed
/// signature, or signature mismatch) — a callback handler wants a yes/no
/// answer, not an error to propagate.
///
/// # Example
///
/// ```rust,no_run
/// use coinbase_api_client::auth::verify_callback;
///
/// let body = br#"{"order":{"id":"A7C52JQT"}}"#;
/// let signature = "6yQRl17CNj5Y...";
/// if verify_callback(body, signature) {
///     // process the callback
/// }
/// ```
pub fn verify_callback(body: &[u8], signature_base64: &str) -> bool {
    verify_callback_with_key(callback_public_key(), body, signature_base64)
}

/// Verify a callback body against a caller-supplied RSA public key.
///
/// Useful for sandbox environments that sign with a different key.
pub fn verify_callback_with_key(key: &RsaPublicKey, body: &[u8], signature_base64: &str) -> bool {
    let Ok(signature_bytes) = BASE64.decode(signature_base64) else {
        return false;
    };
    let Ok(signature) = Signature::try_from(signature_bytes.as_slice()) else {
        return false;
    };

    let verifying_key = VerifyingKey::<Sha256>::new(key.clone());
    verifying_key.verify(body, &signature).is_ok()
}
