//! HMAC-signed Wallet API client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest_middleware::ClientWithMiddleware;
use url::Url;

use crate::auth::{Credentials, NonceProvider, UnixTimestamp, sign_request};
use crate::error::CoinbaseError;
use crate::transport;
use crate::wallet::rest::endpoints::{API_VERSION, BASE_API_URL};
use crate::wallet::rest::response::ApiResponse;
use crate::wallet::rest::status::check_response_status;
use crate::wallet::rest::traits::ApiClient;

const ACCESS_KEY: HeaderName = HeaderName::from_static("cb-access-key");
const ACCESS_SIGN: HeaderName = HeaderName::from_static("cb-access-sign");
const ACCESS_TIMESTAMP: HeaderName = HeaderName::from_static("cb-access-timestamp");
const VERSION: HeaderName = HeaderName::from_static("cb-version");

/// The HMAC-signed Coinbase Wallet API client.
///
/// Every request is signed with the API secret over
/// `timestamp + method + path + body`, so the client needs both an API key
/// and secret at construction. For OAuth2 access tokens use
/// [`OAuthClient`](crate::wallet::rest::OAuthClient) instead.
///
/// # Example
///
/// ```rust,no_run
/// use coinbase_api_client::wallet::rest::{WalletApi, WalletClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = WalletClient::new("api_key", "api_secret")?;
///     let accounts = client.accounts().await?;
///     for account in &accounts {
///         println!("{:?}: {:?}", account.get_str("name"), account.get_money("balance"));
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct WalletClient {
    http: ClientWithMiddleware,
    base_url: String,
    credentials: Credentials,
    timestamps: Arc<UnixTimestamp>,
}

impl WalletClient {
    /// Create a client with default settings.
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Result<Self, CoinbaseError> {
        Self::builder()
            .credentials(Credentials::new(api_key, api_secret))
            .build()
    }

    /// Create a new client builder.
    pub fn builder() -> WalletClientBuilder {
        WalletClientBuilder::new()
    }

    /// The base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl std::fmt::Debug for WalletClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ApiClient for WalletClient {
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        extra_headers: HeaderMap,
    ) -> Result<ApiResponse, CoinbaseError> {
        let timestamp = self.timestamps.next_nonce();
        let body_str = body.as_deref().unwrap_or("");
        let signature = sign_request(
            self.credentials.expose_secret(),
            timestamp,
            method.as_str(),
            path,
            body_str,
        )?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_KEY, header_value(&self.credentials.api_key)?);
        headers.insert(ACCESS_SIGN, header_value(&signature)?);
        headers.insert(ACCESS_TIMESTAMP, header_value(&timestamp.to_string())?);
        headers.insert(VERSION, HeaderValue::from_static(API_VERSION));
        headers.extend(extra_headers);

        let response =
            transport::send_request(&self.http, &self.base_url, method, path, body, headers)
                .await?;
        check_response_status(&response)?;
        Ok(response)
    }
}

fn header_value(value: &str) -> Result<HeaderValue, CoinbaseError> {
    HeaderValue::from_str(value)
        .map_err(|_| CoinbaseError::Auth(format!("header value not ASCII: {value:?}")))
}

/// Builder for [`WalletClient`].
pub struct WalletClientBuilder {
    base_url: String,
    credentials: Option<Credentials>,
    user_agent: Option<String>,
    max_retries: u32,
    timeout: Option<Duration>,
}

impl WalletClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: BASE_API_URL.to_string(),
            credentials: None,
            user_agent: None,
            max_retries: 3,
            timeout: None,
        }
    }

    /// Set the base URL (useful for testing with a mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the signing credentials.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the maximum number of retries for transient failures.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set a request timeout on the underlying HTTP engine.
    ///
    /// The client itself imposes no deadline; callers relying on bounded
    /// latency should set one here.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    ///
    /// Fails if no credentials were supplied or the base URL is invalid.
    pub fn build(self) -> Result<WalletClient, CoinbaseError> {
        let credentials = self.credentials.ok_or(CoinbaseError::MissingCredentials)?;
        Url::parse(&self.base_url)?;

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("coinbase-api-client/{}", env!("CARGO_PKG_VERSION")));
        let http = transport::build_http_client(&user_agent, self.max_retries, self.timeout)?;

        Ok(WalletClient {
            http,
            base_url: self.base_url,
            credentials,
            timestamps: Arc::new(UnixTimestamp::new()),
        })
    }
}

impl Default for WalletClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
