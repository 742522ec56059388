//! OAuth2 Wallet API client and token lifecycle.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest_middleware::ClientWithMiddleware;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use crate::error::CoinbaseError;
use crate::transport;
use crate::wallet::rest::endpoints::{API_VERSION, BASE_API_URL, paths};
use crate::wallet::rest::response::ApiResponse;
use crate::wallet::rest::status::check_response_status;
use crate::wallet::rest::traits::ApiClient;

const VERSION: HeaderName = HeaderName::from_static("cb-version");

/// Tokens are refreshed this long before their reported expiry, so a
/// request signed right at the boundary doesn't lose to clock skew.
const REFRESH_MARGIN: Duration = Duration::from_secs(120);

/// The OAuth2 Coinbase Wallet API client.
///
/// Requests carry `Authorization: Bearer <access_token>`; the access token
/// is refreshed transparently before use once it nears expiry, using the
/// refresh token. Refreshes are serialized: concurrent calls that observe
/// an expired token perform exactly one refresh between them.
///
/// # Example
///
/// ```rust,no_run
/// use coinbase_api_client::wallet::rest::{OAuthClient, WalletApi};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = OAuthClient::builder()
///         .access_token("access")
///         .refresh_token("refresh")
///         .build()?;
///     let user = client.current_user().await?;
///     println!("{:?}", user.get_str("name"));
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct OAuthClient {
    http: ClientWithMiddleware,
    base_url: String,
    tokens: Arc<TokenManager>,
}

impl OAuthClient {
    /// Create a new client builder.
    pub fn builder() -> OAuthClientBuilder {
        OAuthClientBuilder::new()
    }

    /// Create a client from an access token with default settings.
    pub fn new(access_token: impl Into<String>) -> Result<Self, CoinbaseError> {
        Self::builder().access_token(access_token).build()
    }

    /// The token manager backing this client.
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Force a token refresh now.
    pub async fn refresh(&self) -> Result<(), CoinbaseError> {
        self.tokens.refresh().await
    }

    /// Revoke the current access token.
    pub async fn revoke(&self) -> Result<(), CoinbaseError> {
        self.tokens.revoke().await
    }
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ApiClient for OAuthClient {
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        extra_headers: HeaderMap,
    ) -> Result<ApiResponse, CoinbaseError> {
        let token = self.tokens.access_token().await?;

        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| CoinbaseError::Auth("access token not ASCII".into()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(VERSION, HeaderValue::from_static(API_VERSION));
        headers.extend(extra_headers);

        let response =
            transport::send_request(&self.http, &self.base_url, method, path, body, headers)
                .await?;
        check_response_status(&response)?;
        Ok(response)
    }
}

/// Builder for [`OAuthClient`].
pub struct OAuthClientBuilder {
    base_url: String,
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<OffsetDateTime>,
    user_agent: Option<String>,
    max_retries: u32,
    timeout: Option<Duration>,
}

impl OAuthClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: BASE_API_URL.to_string(),
            access_token: None,
            refresh_token: None,
            expires_at: None,
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

    /// Set the access token (required).
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the refresh token, enabling transparent refresh.
    pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    /// Set the access token's known expiry.
    ///
    /// Without one the token is used as-is until the caller refreshes.
    pub fn expires_at(mut self, at: OffsetDateTime) -> Self {
        self.expires_at = Some(at);
        self
    }

    /// Set the access token's expiry relative to now.
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.expires_at = Some(OffsetDateTime::now_utc() + Duration::from_secs(seconds.max(0) as u64));
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
    ///
    /// Fails if no access token was supplied or the base URL is invalid.
    pub fn build(self) -> Result<OAuthClient, CoinbaseError> {
        let access_token = self.access_token.ok_or(CoinbaseError::MissingCredentials)?;
        Url::parse(&self.base_url)?;

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("coinbase-api-client/{}", env!("CARGO_PKG_VERSION")));
        let http = transport::build_http_client(&user_agent, self.max_retries, self.timeout)?;

        let tokens = TokenManager::new(
            http.clone(),
            self.base_url.clone(),
            TokenSet {
                access_token: SecretString::from(access_token),
                refresh_token: self.refresh_token.map(SecretString::from),
                expires_at: self.expires_at,
            },
        );

        Ok(OAuthClient {
            http,
            base_url: self.base_url,
            tokens: Arc::new(tokens),
        })
    }
}

impl Default for OAuthClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The current OAuth token triple.
struct TokenSet {
    access_token: SecretString,
    refresh_token: Option<SecretString>,
    expires_at: Option<OffsetDateTime>,
}

impl TokenSet {
    /// Expired means within the refresh margin of the known expiry.
    /// Unknown expiry counts as valid.
    fn is_expired(&self, now: OffsetDateTime) -> bool {
        match self.expires_at {
            Some(expires_at) => now + REFRESH_MARGIN >= expires_at,
            None => false,
        }
    }
}

/// Response from the token endpoint (flat JSON, no `data` envelope).
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

/// Holds the access/refresh token pair and refreshes it before use.
///
/// The token triple is shared mutable state across concurrent calls on the
/// same client; the async mutex is held for the whole refresh so at most
/// one refresh is in flight, and every waiter observes the resulting
/// tokens. On refresh failure the error propagates and the stale state
/// stays in place (no silent retry with a dead token).
pub struct TokenManager {
    http: ClientWithMiddleware,
    base_url: String,
    state: Mutex<TokenSet>,
}

impl TokenManager {
    fn new(http: ClientWithMiddleware, base_url: String, initial: TokenSet) -> Self {
        Self {
            http,
            base_url,
            state: Mutex::new(initial),
        }
    }

    /// The access token to use for the next request, refreshing first if
    /// it is within the margin of expiry.
    pub async fn access_token(&self) -> Result<String, CoinbaseError> {
        let mut state = self.state.lock().await;
        if state.is_expired(OffsetDateTime::now_utc()) {
            self.refresh_locked(&mut state).await?;
        }
        Ok(state.access_token.expose_secret().to_owned())
    }

    /// Force a refresh regardless of expiry.
    pub async fn refresh(&self) -> Result<(), CoinbaseError> {
        let mut state = self.state.lock().await;
        self.refresh_locked(&mut state).await
    }

    /// Revoke the current access token server-side.
    pub async fn revoke(&self) -> Result<(), CoinbaseError> {
        let state = self.state.lock().await;
        let body = json!({"token": state.access_token.expose_secret()}).to_string();
        let response = transport::send_request(
            &self.http,
            &self.base_url,
            Method::POST,
            paths::OAUTH_REVOKE,
            Some(body),
            HeaderMap::new(),
        )
        .await?;
        check_response_status(&response)?;
        Ok(())
    }

    /// Whether the manager currently considers the token expired.
    pub async fn is_expired(&self) -> bool {
        self.state.lock().await.is_expired(OffsetDateTime::now_utc())
    }

    async fn refresh_locked(&self, state: &mut TokenSet) -> Result<(), CoinbaseError> {
        let refresh_token = state
            .refresh_token
            .as_ref()
            .ok_or(CoinbaseError::MissingCredentials)?;

        debug!(target: "coinbase_api_client", "refreshing OAuth access token");

        let body = json!({
            "grant_type": "refresh_token",
            "refresh_token": refresh_token.expose_secret(),
        })
        .to_string();

        let response = transport::send_request(
            &self.http,
            &self.base_url,
            Method::POST,
            paths::OAUTH_TOKEN,
            Some(body),
            HeaderMap::new(),
        )
        .await?;
        check_response_status(&response)?;

        let parsed: TokenResponse = serde_json::from_value(response.body().clone())?;

        // Replace all three atomically: the lock is held, so readers never
        // see a new access token with a stale expiry.
        let expires_at = parsed
            .expires_in
            .map(|secs| OffsetDateTime::now_utc() + Duration::from_secs(secs.max(0) as u64));
        state.access_token = SecretString::from(parsed.access_token);
        if let Some(refresh) = parsed.refresh_token {
            state.refresh_token = Some(SecretString::from(refresh));
        }
        state.expires_at = expires_at;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_build_requires_access_token() {
        let result = OAuthClient::builder().build();
        assert!(matches!(result, Err(CoinbaseError::MissingCredentials)));
    }

    #[test]
    fn test_token_set_expiry() {
        let now = datetime!(2020-01-01 00:00:00 UTC);
        let set = TokenSet {
            access_token: SecretString::from("a"),
            refresh_token: None,
            expires_at: Some(now + Duration::from_secs(3600)),
        };
        assert!(!set.is_expired(now));
        // Inside the refresh margin counts as expired.
        assert!(set.is_expired(now + Duration::from_secs(3600 - 60)));
        assert!(set.is_expired(now + Duration::from_secs(7200)));
    }

    #[test]
    fn test_unknown_expiry_is_valid() {
        let set = TokenSet {
            access_token: SecretString::from("a"),
            refresh_token: None,
            expires_at: None,
        };
        assert!(!set.is_expired(OffsetDateTime::now_utc()));
    }
}
