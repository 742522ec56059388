//! HTTP transport for the Coinbase API clients.
//!
//! Builds the middleware HTTP client shared by all client variants and
//! executes individual requests, normalizing the result into an
//! [`ApiResponse`](crate::wallet::rest::ApiResponse) regardless of outcome
//! shape.
//!
//! TLS does not use the system trust store: the bundled `ca-coinbase.pem`
//! is parsed once into a pinned root set, so a compromised public CA
//! cannot mint an acceptable certificate for this API.

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Certificate, Method};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use reqwest_tracing::TracingMiddleware;
use serde_json::Value;

use crate::error::{ApiError, CoinbaseError, ErrorKind};
use crate::wallet::rest::ApiResponse;

/// The bundled CA roots used instead of the system trust store.
const CA_BUNDLE_PEM: &str = include_str!("ca-coinbase.pem");

const PEM_FOOTER: &str = "-----END CERTIFICATE-----";

/// Parse the bundled PEM into certificates, once per process.
fn pinned_roots() -> &'static [Certificate] {
    static ROOTS: OnceLock<Vec<Certificate>> = OnceLock::new();
    ROOTS.get_or_init(|| {
        let mut roots = Vec::new();
        for block in CA_BUNDLE_PEM.split_inclusive(PEM_FOOTER) {
            let block = block.trim();
            if block.is_empty() {
                continue;
            }
            let cert = Certificate::from_pem(block.as_bytes())
                .expect("bundled CA certificate is valid PEM");
            roots.push(cert);
        }
        assert!(!roots.is_empty(), "bundled CA file contains no certificates");
        roots
    })
}

/// Build the middleware HTTP client used by every client variant.
///
/// Default headers carry the user agent; tracing and transient-retry
/// middleware match the request pipeline the rest of the crate expects.
pub(crate) fn build_http_client(
    user_agent: &str,
    max_retries: u32,
    timeout: Option<Duration>,
) -> Result<ClientWithMiddleware, CoinbaseError> {
    let mut headers = HeaderMap::new();
    let header_value = HeaderValue::from_str(user_agent)
        .unwrap_or_else(|_| HeaderValue::from_static("coinbase-api-client"));
    headers.insert(USER_AGENT, header_value);

    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .tls_certs_only(pinned_roots().iter().cloned());
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    let reqwest_client = builder.build()?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

    Ok(ClientBuilder::new(reqwest_client)
        .with(TracingMiddleware::default())
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// Execute one request and normalize the response.
///
/// `path` already includes the query string; `body`, when present, is a
/// JSON document. Transport failures are mapped before returning: timeouts
/// become [`CoinbaseError::Timeout`], everything else propagates as the
/// underlying error. Non-JSON bodies on an error status are folded into a
/// generic [`ApiError`] carrying the raw text; on a success status they are
/// [`CoinbaseError::InvalidResponse`].
pub(crate) async fn send_request(
    http: &ClientWithMiddleware,
    base_url: &str,
    method: Method,
    path: &str,
    body: Option<String>,
    headers: HeaderMap,
) -> Result<ApiResponse, CoinbaseError> {
    let url = format!("{base_url}{path}");

    let mut request = http
        .request(method, &url)
        .header(CONTENT_TYPE, "application/json")
        .headers(headers);
    if let Some(body) = body {
        request = request.body(body);
    }

    let response = request.send().await.map_err(classify_middleware_error)?;

    let status = response.status().as_u16();
    let response_headers = response.headers().clone();
    let text = response.text().await.map_err(classify_reqwest_error)?;

    let body = match serde_json::from_str::<Value>(&text) {
        Ok(value) => value,
        Err(_) if status > 400 => {
            return Err(ApiError::new(ErrorKind::Generic, status, text.trim()).into());
        }
        Err(e) => {
            return Err(CoinbaseError::InvalidResponse(format!(
                "failed to parse response body: {e}"
            )));
        }
    };

    Ok(ApiResponse::new(status, response_headers, body))
}

fn classify_middleware_error(error: reqwest_middleware::Error) -> CoinbaseError {
    match error {
        reqwest_middleware::Error::Reqwest(e) => classify_reqwest_error(e),
        other => CoinbaseError::HttpMiddleware(other),
    }
}

fn classify_reqwest_error(error: reqwest::Error) -> CoinbaseError {
    if error.is_timeout() {
        CoinbaseError::Timeout
    } else {
        CoinbaseError::Http(error)
    }
}
