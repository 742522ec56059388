//! Error types for the Coinbase client library.

use thiserror::Error;

/// The main error type for all Coinbase client operations.
#[derive(Error, Debug)]
pub enum CoinbaseError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP request with middleware failed
    #[error("HTTP request failed: {0}")]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Coinbase API returned an error
    #[error("Coinbase API error: {0}")]
    Api(ApiError),

    /// Request timed out (connect timeout, read timeout, or gateway timeout)
    #[error("Request timed out")]
    Timeout,

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Invalid response from the API
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Missing required credentials
    #[error("Missing credentials: access token or API key and secret required")]
    MissingCredentials,

    /// A required request parameter was absent (detected before any network call)
    #[error("Missing parameter: {0}")]
    MissingParam(&'static str),
}

impl CoinbaseError {
    /// Return the classified API error, if this is one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            CoinbaseError::Api(e) => Some(e),
            _ => None,
        }
    }

    /// Whether a caller may reasonably retry the failed request.
    pub fn is_retriable(&self) -> bool {
        match self {
            CoinbaseError::Timeout => true,
            CoinbaseError::Api(e) => e.kind.is_retriable(),
            _ => false,
        }
    }
}

/// A classified error returned by the Coinbase API.
///
/// Carries the original HTTP status and a human-readable message alongside
/// the classified [`ErrorKind`], so callers can pattern-match on the kind
/// for targeted retry/backoff while still logging the server's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The classified error category
    pub kind: ErrorKind,
    /// The HTTP status of the response that produced this error
    pub status: u16,
    /// Human-readable message from the error envelope (or the raw body)
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Create a new API error.
    pub fn new(kind: ErrorKind, status: u16, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }
}

impl From<ApiError> for CoinbaseError {
    fn from(e: ApiError) -> Self {
        CoinbaseError::Api(e)
    }
}

/// The closed set of classified API error categories.
///
/// Derived from the HTTP status and/or the server-supplied error `id`
/// string in the `errors` array of the response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Status 400 with no more specific id
    BadRequest,
    /// `param_required`: a required parameter was missing
    ParamRequired,
    /// `invalid_request`
    InvalidRequest,
    /// `personal_details_required`
    PersonalDetailsRequired,
    /// Status 401 / `authentication_error`
    Authentication,
    /// `unverified_email`
    UnverifiedEmail,
    /// `invalid_token`
    InvalidToken,
    /// `revoked_token`
    RevokedToken,
    /// `expired_token`
    ExpiredToken,
    /// Status 402: the request needs a `CB-2FA-TOKEN` header
    TwoFactorRequired,
    /// Status 403: the OAuth token lacks the required scope
    InvalidScope,
    /// Status 404
    NotFound,
    /// Status 422
    Validation,
    /// Status 429
    RateLimit,
    /// Status 500
    InternalServer,
    /// Status 503
    ServiceUnavailable,
    /// Status 504 or a transport-level timeout
    Timeout,
    /// Anything without a more specific classification
    Generic,
}

impl ErrorKind {
    /// Look up the kind for a structured error `id` (statuses 400-401).
    pub fn from_error_id(id: &str) -> Option<Self> {
        match id {
            "param_required" => Some(ErrorKind::ParamRequired),
            "invalid_request" => Some(ErrorKind::InvalidRequest),
            "personal_details_required" => Some(ErrorKind::PersonalDetailsRequired),
            "authentication_error" => Some(ErrorKind::Authentication),
            "unverified_email" => Some(ErrorKind::UnverifiedEmail),
            "invalid_token" => Some(ErrorKind::InvalidToken),
            "revoked_token" => Some(ErrorKind::RevokedToken),
            "expired_token" => Some(ErrorKind::ExpiredToken),
            _ => None,
        }
    }

    /// Look up the kind for an HTTP status code.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            400 => Some(ErrorKind::BadRequest),
            401 => Some(ErrorKind::Authentication),
            402 => Some(ErrorKind::TwoFactorRequired),
            403 => Some(ErrorKind::InvalidScope),
            404 => Some(ErrorKind::NotFound),
            422 => Some(ErrorKind::Validation),
            429 => Some(ErrorKind::RateLimit),
            500 => Some(ErrorKind::InternalServer),
            503 => Some(ErrorKind::ServiceUnavailable),
            504 => Some(ErrorKind::Timeout),
            _ => None,
        }
    }

    /// Whether errors of this kind are typically transient.
    ///
    /// Callers implementing backoff should retry these and nothing else:
    /// a `Validation` or `NotFound` will not succeed on a second attempt.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout | ErrorKind::RateLimit | ErrorKind::ServiceUnavailable
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let error = ApiError::new(ErrorKind::NotFound, 404, "test");
        assert_eq!(error.to_string(), "[404] test");
    }

    #[test]
    fn test_error_id_table() {
        assert_eq!(
            ErrorKind::from_error_id("param_required"),
            Some(ErrorKind::ParamRequired)
        );
        assert_eq!(
            ErrorKind::from_error_id("invalid_token"),
            Some(ErrorKind::InvalidToken)
        );
        assert_eq!(
            ErrorKind::from_error_id("expired_token"),
            Some(ErrorKind::ExpiredToken)
        );
        assert_eq!(ErrorKind::from_error_id("no_such_id"), None);
    }

    #[test]
    fn test_status_table() {
        assert_eq!(ErrorKind::from_status(402), Some(ErrorKind::TwoFactorRequired));
        assert_eq!(ErrorKind::from_status(403), Some(ErrorKind::InvalidScope));
        assert_eq!(ErrorKind::from_status(404), Some(ErrorKind::NotFound));
        assert_eq!(ErrorKind::from_status(422), Some(ErrorKind::Validation));
        assert_eq!(ErrorKind::from_status(429), Some(ErrorKind::RateLimit));
        assert_eq!(ErrorKind::from_status(500), Some(ErrorKind::InternalServer));
        assert_eq!(ErrorKind::from_status(503), Some(ErrorKind::ServiceUnavailable));
        assert_eq!(ErrorKind::from_status(504), Some(ErrorKind::Timeout));
        assert_eq!(ErrorKind::from_status(418), None);
    }

    #[test]
    fn test_retriable_kinds() {
        assert!(ErrorKind::Timeout.is_retriable());
        assert!(ErrorKind::RateLimit.is_retriable());
        assert!(ErrorKind::ServiceUnavailable.is_retriable());
        assert!(!ErrorKind::Validation.is_retriable());
        assert!(!ErrorKind::NotFound.is_retriable());
    }

    #[test]
    fn test_retriable_coinbase_error() {
        assert!(CoinbaseError::Timeout.is_retriable());
        let e = CoinbaseError::Api(ApiError::new(ErrorKind::RateLimit, 429, "slow down"));
        assert!(e.is_retriable());
        let e = CoinbaseError::Api(ApiError::new(ErrorKind::NotFound, 404, "missing"));
        assert!(!e.is_retriable());
    }
}
