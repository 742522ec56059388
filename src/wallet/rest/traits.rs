//! The shared client interface.
//!
//! [`ApiClient`] abstracts one concern per implementor: turning a request
//! into an authenticated [`ApiResponse`]. The HTTP verbs, two-factor header
//! injection, and pagination are provided on top of the single required
//! `execute` method, so the HMAC, OAuth, and legacy clients share them.
//!
//! The trait is dyn-compatible: [`ApiObject`](crate::wallet::rest::ApiObject)
//! holds an `Arc<dyn ApiClient>` back-reference for its self-referencing
//! operations (refresh, update, delete, commit, ...).

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::error::CoinbaseError;
use crate::wallet::rest::response::ApiResponse;

/// Request parameters: a JSON object of key/value pairs.
///
/// For GET/DELETE the scalar values are URL-encoded into the query string;
/// for PUT/POST the map is serialized as the JSON body.
pub type Params = serde_json::Map<String, Value>;

/// Header carrying a two-factor authentication code.
pub const TWO_FACTOR_HEADER: &str = "CB-2FA-TOKEN";

/// Parameter key recognized (and stripped) by every verb.
const TWO_FACTOR_PARAM: &str = "two_factor_token";

/// The interface shared by all Coinbase client variants.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Execute one authenticated request.
    ///
    /// `path` includes the query string. Implementations sign the request,
    /// send it through the transport, and run the status check before
    /// returning the response.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        headers: HeaderMap,
    ) -> Result<ApiResponse, CoinbaseError>;

    /// GET with URL-encoded query parameters.
    async fn get(&self, path: &str, params: &Params) -> Result<ApiResponse, CoinbaseError> {
        let (params, headers) = split_two_factor(params.clone());
        let uri = append_query(path, &params)?;
        self.execute(Method::GET, &uri, None, headers).await
    }

    /// DELETE with URL-encoded query parameters.
    async fn delete(&self, path: &str, params: &Params) -> Result<ApiResponse, CoinbaseError> {
        let (params, headers) = split_two_factor(params.clone());
        let uri = append_query(path, &params)?;
        self.execute(Method::DELETE, &uri, None, headers).await
    }

    /// POST with a JSON body.
    async fn post(&self, path: &str, params: &Params) -> Result<ApiResponse, CoinbaseError> {
        let (params, headers) = split_two_factor(params.clone());
        let body = serde_json::to_string(&params)?;
        self.execute(Method::POST, path, Some(body), headers).await
    }

    /// PUT with a JSON body.
    async fn put(&self, path: &str, params: &Params) -> Result<ApiResponse, CoinbaseError> {
        let (params, headers) = split_two_factor(params.clone());
        let body = serde_json::to_string(&params)?;
        self.execute(Method::PUT, path, Some(body), headers).await
    }

    /// GET every page of a collection, concatenating the `data` arrays.
    ///
    /// Follows `pagination.next_uri` by deriving a `starting_after` cursor
    /// from the last item's `id`, until the server reports no next page.
    /// The result is finite (bounded by the server-reported pages) and in
    /// server order.
    async fn fetch_all(&self, path: &str, params: &Params) -> Result<Vec<Value>, CoinbaseError> {
        let mut params = params.clone();
        let mut items: Vec<Value> = Vec::new();

        loop {
            let response = self.get(path, &params).await?;
            let page = response
                .data()
                .as_array()
                .cloned()
                .unwrap_or_default();
            let has_more = response.has_more();
            let cursor = page
                .last()
                .and_then(|item| item.get("id"))
                .and_then(Value::as_str)
                .map(str::to_owned);

            items.extend(page);

            match (has_more, cursor) {
                (true, Some(id)) => {
                    params.insert("starting_after".to_owned(), Value::String(id));
                }
                _ => break,
            }
        }

        Ok(items)
    }
}

/// Pull a `two_factor_token` out of the params and into its header.
fn split_two_factor(mut params: Params) -> (Params, HeaderMap) {
    let mut headers = HeaderMap::new();
    if let Some(token) = params.remove(TWO_FACTOR_PARAM) {
        let token = match &token {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if let Ok(value) = HeaderValue::from_str(&token) {
            headers.insert(HeaderName::from_static("cb-2fa-token"), value);
        }
    }
    (params, headers)
}

/// URL-encode params into `path?key=value&...` (scalars only; nulls skipped).
fn append_query(path: &str, params: &Params) -> Result<String, CoinbaseError> {
    if params.is_empty() {
        return Ok(path.to_owned());
    }

    let pairs: Vec<(String, String)> = params
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect();

    if pairs.is_empty() {
        return Ok(path.to_owned());
    }

    let query = serde_urlencoded::to_string(&pairs)
        .map_err(|e| CoinbaseError::InvalidResponse(e.to_string()))?;
    Ok(format!("{path}?{query}"))
}

/// Build a [`Params`] map from key/value pairs.
///
/// # Example
///
/// ```rust
/// use coinbase_api_client::wallet::rest::params;
/// use serde_json::json;
///
/// let p = params([("amount", json!("10")), ("currency", json!("BTC"))]);
/// assert_eq!(p.len(), 2);
/// ```
pub fn params<I>(pairs: I) -> Params
where
    I: IntoIterator<Item = (&'static str, Value)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect()
}
