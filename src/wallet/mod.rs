//! Coinbase v2 Wallet API.
//!
//! This module provides the [`rest`] clients for the v2 Wallet API. For
//! the deprecated v1 API see [`crate::legacy`].

pub mod rest;

pub use rest::{OAuthClient, WalletClient};
