//! Coinbase v2 Wallet REST API clients.
//!
//! Two client variants share one interface:
//!
//! - [`WalletClient`] — HMAC-signed with an API key and secret
//! - [`OAuthClient`] — OAuth2 bearer tokens with transparent refresh
//!
//! # Trait-based API
//!
//! The [`ApiClient`] trait abstracts the verb primitives, and [`WalletApi`]
//! layers the endpoint surface on top, so code can be written against
//! either variant (or a mock):
//!
//! ```rust,ignore
//! use coinbase_api_client::wallet::rest::{ApiClient, WalletApi};
//!
//! async fn balance_report<C: WalletApi>(client: &C) -> coinbase_api_client::Result<()> {
//!     for account in client.accounts().await? {
//!         println!("{:?}: {:?}", account.get_str("name"), account.get_money("balance"));
//!     }
//!     Ok(())
//! }
//! ```

mod api;
mod client;
mod endpoints;
mod models;
mod oauth;
mod object;
mod response;
mod status;
mod traits;

pub use api::WalletApi;
pub use client::{WalletClient, WalletClientBuilder};
pub use endpoints::*;
pub use models::{
    Account, Checkout, CurrentUser, MoneyRequest, Order, Transaction, Transfer, User,
};
pub use oauth::{OAuthClient, OAuthClientBuilder, TokenManager};
pub use object::{ApiObject, FieldValue};
pub use response::{ApiResponse, ErrorEntry, Pagination};
pub use status::check_response_status;
pub use traits::{ApiClient, Params, TWO_FACTOR_HEADER, params};
