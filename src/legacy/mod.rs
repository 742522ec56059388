//! Deprecated v1 Coinbase API client.
//!
//! Kept for integrations that still talk to the v1 endpoints; new code
//! should use [`crate::wallet`].

mod client;

pub use client::{LEGACY_BASE_URL, LegacyClient, LegacyClientBuilder};
