//! # Coinbase Client
//!
//! An async Rust client library for the Coinbase REST API.
//!
//! ## Features
//!
//! - v2 Wallet API with HMAC (`CB-ACCESS-*`) and OAuth2 bearer authentication
//! - Transparent OAuth token refresh with single-flight serialization
//! - Typed error classification for every documented API error
//! - Generic lazily-coerced response objects (decimal amounts, timestamps,
//!   nested resources) with self-referencing operations
//! - Cursor pagination (`fetch_all`) and two-factor header injection
//! - Certificate pinning against a bundled CA set
//! - Legacy v1 client for the deprecated nonce-signed API
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use coinbase_api_client::wallet::rest::{WalletApi, WalletClient, params};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = WalletClient::new("api_key", "api_secret")?;
//!
//!     let account = client.primary_account().await?;
//!     println!("balance: {:?}", account.get_money("balance"));
//!
//!     let buy = client
//!         .buy(
//!             account.id().unwrap_or_default(),
//!             params([("amount", json!("10")), ("currency", json!("BTC"))]),
//!         )
//!         .await?;
//!     println!("buy status: {:?}", buy.get_str("status"));
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod error;
pub mod legacy;
pub mod types;
pub mod wallet;

pub(crate) mod transport;

// Re-export commonly used types at crate root
pub use auth::{verify_callback, verify_callback_with_key};
pub use error::{ApiError, CoinbaseError, ErrorKind};
pub use types::Money;
pub use wallet::rest::{ApiObject, FieldValue, OAuthClient, WalletApi, WalletClient};

/// Result type alias using CoinbaseError
pub type Result<T> = std::result::Result<T, CoinbaseError>;
