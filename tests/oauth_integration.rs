use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use coinbase_api_client::error::{CoinbaseError, ErrorKind};
use coinbase_api_client::wallet::rest::{OAuthClient, WalletApi};

fn user_response() -> serde_json::Value {
    json!({"data": {"id": "u-1", "name": "Satoshi"}})
}

#[tokio::test]
async fn test_bearer_header_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/user"))
        .and(header("Authorization", "Bearer access_1"))
        .and(header("CB-VERSION", "2015-06-16"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_response()))
        .expect(1)
        .mount(&server)
        .await;

    let client = OAuthClient::builder()
        .base_url(server.uri())
        .access_token("access_1")
        .build()
        .unwrap();

    let user = client.current_user().await.unwrap();
    assert_eq!(user.get_str("name"), Some("Satoshi"));
}

#[tokio::test]
async fn test_expired_token_refreshes_once_then_proceeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_partial_json(json!({
            "grant_type": "refresh_token",
            "refresh_token": "refresh_1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access_2",
            "refresh_token": "refresh_2",
            "expires_in": 7200,
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/user"))
        .and(header("Authorization", "Bearer access_2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_response()))
        .expect(2)
        .mount(&server)
        .await;

    let client = OAuthClient::builder()
        .base_url(server.uri())
        .access_token("access_1")
        .refresh_token("refresh_1")
        .expires_in(0)
        .build()
        .unwrap();

    // First call refreshes, then proceeds with the new token.
    client.current_user().await.unwrap();
    // Second call is inside the new expiry: zero further refreshes
    // (the token mock's expect(1) is verified on server shutdown).
    client.current_user().await.unwrap();
    assert!(!client.tokens().is_expired().await);
}

#[tokio::test]
async fn test_concurrent_calls_share_one_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(100))
                .set_body_json(json!({
                    "access_token": "access_2",
                    "refresh_token": "refresh_2",
                    "expires_in": 7200
                })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/user"))
        .and(header("Authorization", "Bearer access_2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_response()))
        .expect(3)
        .mount(&server)
        .await;

    let client = OAuthClient::builder()
        .base_url(server.uri())
        .access_token("access_1")
        .refresh_token("refresh_1")
        .expires_in(0)
        .build()
        .unwrap();

    // Three concurrent callers all observe the expired token; exactly one
    // refresh happens and every caller proceeds with the new token.
    let (a, b, c) = tokio::join!(
        client.current_user(),
        client.current_user(),
        client.current_user()
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();
}

#[tokio::test]
async fn test_refresh_failure_surfaces_and_state_stays_expired() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "refresh token revoked"
        })))
        .mount(&server)
        .await;

    let client = OAuthClient::builder()
        .base_url(server.uri())
        .access_token("access_1")
        .refresh_token("refresh_1")
        .expires_in(0)
        .build()
        .unwrap();

    let err = client.current_user().await.unwrap_err();
    let api_error = err.api_error().expect("expected an API error");
    assert_eq!(api_error.kind, ErrorKind::Generic);
    assert_eq!(api_error.to_string(), "[401] refresh token revoked");

    // The stale token was not silently reused and the state is still expired.
    assert!(client.tokens().is_expired().await);
    assert!(server.received_requests().await.unwrap().iter().all(|r| {
        r.url.path() == "/oauth/token"
    }));
}

#[tokio::test]
async fn test_expired_without_refresh_token_errors() {
    let server = MockServer::start().await;

    let client = OAuthClient::builder()
        .base_url(server.uri())
        .access_token("access_1")
        .expires_in(0)
        .build()
        .unwrap();

    let err = client.current_user().await.unwrap_err();
    assert!(matches!(err, CoinbaseError::MissingCredentials));
}

#[tokio::test]
async fn test_forced_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access_2",
            "refresh_token": "refresh_2",
            "expires_in": 7200
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OAuthClient::builder()
        .base_url(server.uri())
        .access_token("access_1")
        .refresh_token("refresh_1")
        .build()
        .unwrap();

    // Not expired, but the caller asked for a refresh explicitly.
    client.refresh().await.unwrap();
    assert_eq!(client.tokens().access_token().await.unwrap(), "access_2");
}

#[tokio::test]
async fn test_revoke_posts_current_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/revoke"))
        .and(body_partial_json(json!({"token": "access_1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = OAuthClient::builder()
        .base_url(server.uri())
        .access_token("access_1")
        .build()
        .unwrap();

    client.revoke().await.unwrap();
}

#[test]
fn test_missing_access_token_fails_at_build() {
    let result = OAuthClient::builder().refresh_token("refresh_1").build();
    assert!(matches!(result, Err(CoinbaseError::MissingCredentials)));
}
