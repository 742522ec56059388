//! Response status handling.
//!
//! Inspects a decoded response, emits any server warnings to the log, and
//! classifies error responses into the most specific [`ErrorKind`]
//! available. Warnings are logged before classification so operators see
//! them even when the same response raises.

use serde_json::Value;
use tracing::warn;

use crate::error::{ApiError, CoinbaseError, ErrorKind};
use crate::wallet::rest::response::ApiResponse;

/// Check a response, logging warnings and raising on errors.
///
/// Classification order (first match wins):
/// 1. OAuth-style `{"error", "error_description"}` body with status >= 400.
/// 2. Non-empty `errors` array: for 400/401 the first error's `id` decides,
///    falling back to the status table; other 4xx/5xx use the status table
///    directly; unmapped statuses classify as `Generic`.
/// 3. Bare status > 400 with no structured errors: `Generic` with the raw
///    body as message.
pub fn check_response_status(response: &ApiResponse) -> Result<(), CoinbaseError> {
    log_warnings(response);
    check_oauth_error(response)?;
    check_structured_errors(response)?;
    check_bare_status(response)?;
    Ok(())
}

fn log_warnings(response: &ApiResponse) {
    for warning in response.warnings() {
        warn!(target: "coinbase_api_client", "WARNING: {}", warning.render());
    }
}

fn check_oauth_error(response: &ApiResponse) -> Result<(), CoinbaseError> {
    let status = response.status();
    if status >= 400 {
        if let Some(error) = response.body().get("error") {
            let message = response
                .body()
                .get("error_description")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| error.to_string());
            return Err(ApiError::new(ErrorKind::Generic, status, message).into());
        }
    }
    Ok(())
}

fn check_structured_errors(response: &ApiResponse) -> Result<(), CoinbaseError> {
    let errors = response.errors();
    let Some(first) = errors.first() else {
        return Ok(());
    };

    let status = response.status();
    let kind = match status {
        400..=401 => first
            .id
            .as_deref()
            .and_then(ErrorKind::from_error_id)
            .or_else(|| ErrorKind::from_status(status))
            .unwrap_or(ErrorKind::Generic),
        402..=599 => ErrorKind::from_status(status).unwrap_or(ErrorKind::Generic),
        _ => ErrorKind::Generic,
    };

    Err(ApiError::new(kind, status, error_message(response)).into())
}

fn check_bare_status(response: &ApiResponse) -> Result<(), CoinbaseError> {
    let status = response.status();
    if status > 400 {
        return Err(ApiError::new(ErrorKind::Generic, status, error_message(response)).into());
    }
    Ok(())
}

/// The message for a raised error: the first structured error (falling back
/// to the first warning), or the compact body when neither exists.
fn error_message(response: &ApiResponse) -> String {
    response
        .errors()
        .into_iter()
        .chain(response.warnings())
        .next()
        .map(|entry| entry.render())
        .unwrap_or_else(|| response.body().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;
    use serde_json::json;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    fn response(status: u16, body: Value) -> ApiResponse {
        ApiResponse::new(status, HeaderMap::new(), body)
    }

    fn kind_of(result: Result<(), CoinbaseError>) -> ErrorKind {
        match result {
            Err(CoinbaseError::Api(e)) => e.kind,
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[test]
    fn test_success_passes() {
        let resp = response(200, json!({"data": {"id": "x"}}));
        assert!(check_response_status(&resp).is_ok());
    }

    #[test]
    fn test_id_table_wins_for_401() {
        let resp = response(
            401,
            json!({"errors": [{"id": "expired_token", "message": "expired"}]}),
        );
        assert_eq!(kind_of(check_response_status(&resp)), ErrorKind::ExpiredToken);
    }

    #[test]
    fn test_unmapped_id_falls_back_to_status() {
        let resp = response(
            401,
            json!({"errors": [{"id": "something_new", "message": "huh"}]}),
        );
        assert_eq!(
            kind_of(check_response_status(&resp)),
            ErrorKind::Authentication
        );
    }

    #[test]
    fn test_status_table_for_other_4xx() {
        for (status, kind) in [
            (402, ErrorKind::TwoFactorRequired),
            (403, ErrorKind::InvalidScope),
            (404, ErrorKind::NotFound),
            (422, ErrorKind::Validation),
            (429, ErrorKind::RateLimit),
            (500, ErrorKind::InternalServer),
            (503, ErrorKind::ServiceUnavailable),
            (504, ErrorKind::Timeout),
        ] {
            let resp = response(status, json!({"errors": [{"id": "x", "message": "m"}]}));
            assert_eq!(kind_of(check_response_status(&resp)), kind, "status {status}");
        }
    }

    #[test]
    fn test_unmapped_status_is_generic() {
        let resp = response(418, json!({"errors": [{"id": "x", "message": "m"}]}));
        assert_eq!(kind_of(check_response_status(&resp)), ErrorKind::Generic);
    }

    #[test]
    fn test_message_format() {
        let resp = response(404, json!({"errors": [{"id": "404", "message": "test"}]}));
        match check_response_status(&resp) {
            Err(CoinbaseError::Api(e)) => {
                assert_eq!(e.to_string(), "[404] test");
                assert_eq!(e.status, 404);
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[test]
    fn test_message_includes_url() {
        let resp = response(
            400,
            json!({"errors": [{"id": "x", "message": "bad", "url": "https://docs"}]}),
        );
        match check_response_status(&resp) {
            Err(CoinbaseError::Api(e)) => assert_eq!(e.to_string(), "[400] bad (https://docs)"),
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[test]
    fn test_oauth_error_body() {
        let resp = response(
            401,
            json!({"error": "invalid_grant", "error_description": "refresh token revoked"}),
        );
        match check_response_status(&resp) {
            Err(CoinbaseError::Api(e)) => {
                assert_eq!(e.kind, ErrorKind::Generic);
                assert_eq!(e.to_string(), "[401] refresh token revoked");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_error_status_uses_body() {
        let resp = response(502, json!({"unexpected": true}));
        match check_response_status(&resp) {
            Err(CoinbaseError::Api(e)) => {
                assert_eq!(e.kind, ErrorKind::Generic);
                assert!(e.message.contains("unexpected"));
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_400_passes() {
        // The bare-status fallback is strictly greater-than 400; a 400 with
        // no structured errors does not raise.
        let resp = response(400, json!({"data": null}));
        assert!(check_response_status(&resp).is_ok());
    }

    #[test]
    fn test_errors_with_success_status_still_raise() {
        let resp = response(200, json!({"errors": [{"id": "x", "message": "m"}]}));
        assert_eq!(kind_of(check_response_status(&resp)), ErrorKind::Generic);
    }

    #[derive(Clone, Default)]
    struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CaptureWriter {
        type Writer = CaptureWriter;
        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_warnings_logged_even_on_error() {
        let writer = CaptureWriter::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer.clone())
            .with_ansi(false)
            .finish();

        let resp = response(
            404,
            json!({
                "warnings": [{"message": "this version is deprecated", "url": "https://docs"}],
                "errors": [{"id": "404", "message": "test"}]
            }),
        );

        let result = tracing::subscriber::with_default(subscriber, || check_response_status(&resp));
        assert!(result.is_err());

        let logged = String::from_utf8(writer.0.lock().unwrap().clone()).unwrap();
        assert!(
            logged.contains("this version is deprecated (https://docs)"),
            "warning missing from log output: {logged}"
        );
    }

    #[test]
    fn test_warnings_logged_on_success() {
        let writer = CaptureWriter::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer.clone())
            .with_ansi(false)
            .finish();

        let resp = response(
            200,
            json!({"data": {}, "warnings": [{"message": "heads up"}]}),
        );

        let result = tracing::subscriber::with_default(subscriber, || check_response_status(&resp));
        assert!(result.is_ok());

        let logged = String::from_utf8(writer.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("heads up"));
    }
}
