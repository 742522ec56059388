//! Authentication module for the Coinbase API.
//!
//! This module provides:
//! - Credential management with secure secret storage
//! - Nonce/timestamp generation for replay attack prevention
//! - HMAC-SHA256 signature generation for both historical signing schemes
//! - RSA verification of merchant callback payloads

mod callback;
mod credentials;
mod nonce;
mod signature;

pub use callback::{verify_callback, verify_callback_with_key};
pub use credentials::Credentials;
pub use nonce::{IncreasingNonce, NonceProvider, UnixTimestamp};
pub use signature::{sign_legacy_request, sign_request};
