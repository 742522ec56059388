//! HMAC-SHA256 signature generation for Coinbase API authentication.
//!
//! Two historical signing schemes exist:
//!
//! ```text
//! v2 (Wallet API): hex(HMAC-SHA256(secret, timestamp + METHOD + path + body))
//! v1 (legacy):     hex(HMAC-SHA256(secret, nonce + url + body))
//! ```
//!
//! The v2 signature goes in the `CB-ACCESS-SIGN` header with the timestamp
//! in `CB-ACCESS-TIMESTAMP`; the v1 signature goes in `ACCESS_SIGNATURE`
//! with the nonce in `ACCESS_NONCE`. Both are lowercase hex digests, not
//! base64. Signing is a pure function of its inputs: the timestamp/nonce
//! is part of the signed message, so no two requests with distinct fresh
//! values produce the same signature.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::CoinbaseError;

type HmacSha256 = Hmac<Sha256>;

/// Sign a request for the v2 Wallet API.
///
/// # Arguments
///
/// * `secret` - The API secret
/// * `timestamp` - Whole-second Unix time for this request
/// * `method` - Uppercase HTTP method (e.g., "GET")
/// * `path` - The request path including any query string (e.g., "/v2/accounts?limit=5")
/// * `body` - The JSON body, or the empty string for GET/DELETE
///
/// # Returns
///
/// Lowercase hex HMAC-SHA256 signature for the `CB-ACCESS-SIGN` header.
///
/// # Example
///
/// ```rust
/// use coinbase_api_client::auth::sign_request;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let signature = sign_request(
///     "api_secret",
///     1424382000,
///     "GET",
///     "/v2/accounts",
///     "",
/// )?;
/// assert_eq!(signature.len(), 64);
/// # Ok(())
/// # }
/// ```
pub fn sign_request(
    secret: &str,
    timestamp: u64,
    method: &str,
    path: &str,
    body: &str,
) -> Result<String, CoinbaseError> {
    let mut hmac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CoinbaseError::Auth(format!("Invalid HMAC key: {e}")))?;
    hmac.update(timestamp.to_string().as_bytes());
    hmac.update(method.as_bytes());
    hmac.update(path.as_bytes());
    hmac.update(body.as_bytes());

    Ok(hex::encode(hmac.finalize().into_bytes()))
}

/// Sign a request for the legacy v1 API.
///
/// The v1 scheme signs the full request URL rather than the path, and uses
/// a strictly-increasing microsecond nonce instead of a second-resolution
/// timestamp.
///
/// # Arguments
///
/// * `secret` - The API secret
/// * `nonce` - The strictly-increasing nonce for this request
/// * `url` - The full request URL (e.g., "https://coinbase.com/api/v1/account/balance")
/// * `body` - The JSON body, or the empty string
///
/// # Returns
///
/// Lowercase hex HMAC-SHA256 signature for the `ACCESS_SIGNATURE` header.
pub fn sign_legacy_request(
    secret: &str,
    nonce: u64,
    url: &str,
    body: &str,
) -> Result<String, CoinbaseError> {
    let mut hmac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CoinbaseError::Auth(format!("Invalid HMAC key: {e}")))?;
    hmac.update(nonce.to_string().as_bytes());
    hmac.update(url.as_bytes());
    hmac.update(body.as_bytes());

    Ok(hex::encode(hmac.finalize().into_bytes()))
}
