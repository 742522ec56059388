//! Legacy v1 API client implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest_middleware::ClientWithMiddleware;
use url::Url;

use crate::auth::{Credentials, IncreasingNonce, NonceProvider, sign_legacy_request};
use crate::error::CoinbaseError;
use crate::transport;
use crate::wallet::rest::{ApiClient, ApiResponse, check_response_status};

/// Base URL for the legacy v1 API.
pub const LEGACY_BASE_URL: &str = "https://coinbase.com/api/v1";

const ACCESS_KEY: HeaderName = HeaderName::from_static("access_key");
const ACCESS_SIGNATURE: HeaderName = HeaderName::from_static("access_signature");
const ACCESS_NONCE: HeaderName = HeaderName::from_static("access_nonce");

/// The legacy v1 Coinbase API client.
///
/// The v1 scheme signs `nonce + url + body` with a strictly-increasing
/// microsecond nonce, and sends `ACCESS_KEY` / `ACCESS_SIGNATURE` /
/// `ACCESS_NONCE` headers. Unlike v2, the *full URL* is part of the signed
/// message. v1 responses have no `data` envelope, so this client is used
/// with the verb primitives directly rather than the Wallet endpoint
/// wrappers.
///
/// # Example
///
/// ```rust,no_run
/// use coinbase_api_client::legacy::LegacyClient;
/// use coinbase_api_client::wallet::rest::{ApiClient, Params};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = LegacyClient::new("api_key", "api_secret")?;
///     let response = client.get("/account/balance", &Params::new()).await?;
///     println!("{}", response.body());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct LegacyClient {
    http: ClientWithMiddleware,
    base_url: String,
    credentials: Credentials,
    nonce_provider: Arc<IncreasingNonce>,
}

impl LegacyClient {
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
    pub fn builder() -> LegacyClientBuilder {
        LegacyClientBuilder::new()
    }
}

impl std::fmt::Debug for LegacyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacyClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ApiClient for LegacyClient {
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        extra_headers: HeaderMap,
    ) -> Result<ApiResponse, CoinbaseError> {
        let nonce = self.nonce_provider.next_nonce();
        let url = format!("{}{}", self.base_url, path);
        let body_str = body.as_deref().unwrap_or("");
        let signature = sign_legacy_request(
            self.credentials.expose_secret(),
            nonce,
            &url,
            body_str,
        )?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_KEY, header_value(&self.credentials.api_key)?);
        headers.insert(ACCESS_SIGNATURE, header_value(&signature)?);
        headers.insert(ACCESS_NONCE, header_value(&nonce.to_string())?);
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

/// Builder for [`LegacyClient`].
pub struct LegacyClientBuilder {
    base_url: String,
    credentials: Option<Credentials>,
    user_agent: Option<String>,
    max_retries: u32,
    timeout: Option<Duration>,
}

impl LegacyClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: LEGACY_BASE_URL.to_string(),
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
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<LegacyClient, CoinbaseError> {
        let credentials = self.credentials.ok_or(CoinbaseError::MissingCredentials)?;
        Url::parse(&self.base_url)?;

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("coinbase-api-client/{}", env!("CARGO_PKG_VERSION")));
        let http = transport::build_http_client(&user_agent, self.max_retries, self.timeout)?;

        Ok(LegacyClient {
            http,
            base_url: self.base_url,
            credentials,
            nonce_provider: Arc::new(IncreasingNonce::new()),
        })
    }
}

impl Default for LegacyClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
