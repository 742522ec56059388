//! Generic lazily-coerced response objects.
//!
//! The Wallet API surface is large and evolves server-side, so responses
//! are not pre-declared as per-endpoint structs. [`ApiObject`] wraps the
//! decoded JSON object and coerces fields on access: nested objects wrap
//! recursively, `_at` timestamps parse to [`OffsetDateTime`], and `amount`
//! strings parse to [`Decimal`]. Coercion is opportunistic and fails soft:
//! a malformed amount string comes back as the raw string.
//!
//! Objects keep a back-reference to the client that produced them, so the
//! self-referencing operations (`refresh`, `update`, `delete`, `commit`,
//! `refund`, `resend`, `cancel`) can follow the server-assigned
//! `resource_path`.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::CoinbaseError;
use crate::types::Money;
use crate::wallet::rest::traits::{ApiClient, Params};

/// A decoded API resource with typed field access.
#[derive(Clone)]
pub struct ApiObject {
    client: Arc<dyn ApiClient>,
    fields: serde_json::Map<String, Value>,
}

/// A coerced field value.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// JSON null or absent key
    Null,
    /// JSON boolean
    Bool(bool),
    /// JSON number, left as-is
    Number(serde_json::Number),
    /// An `amount` field coerced to arbitrary precision
    Decimal(Decimal),
    /// JSON string without a recognized coercion
    String(String),
    /// An `_at` field parsed as RFC 3339
    Timestamp(OffsetDateTime),
    /// Nested JSON object, wrapped recursively
    Object(ApiObject),
    /// JSON array, coerced element-wise
    Array(Vec<FieldValue>),
}

impl ApiObject {
    /// Wrap a decoded JSON value. Non-object values produce an empty map.
    pub fn new(client: Arc<dyn ApiClient>, data: &Value) -> Self {
        let fields = match data {
            Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        };
        Self { client, fields }
    }

    /// Wrap each element of a JSON array independently.
    pub fn collection(client: &Arc<dyn ApiClient>, data: &Value) -> Vec<Self> {
        data.as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|item| Self::new(client.clone(), item))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn client(&self) -> &Arc<dyn ApiClient> {
        &self.client
    }

    /// Read a field by name, applying type coercion.
    pub fn get(&self, key: &str) -> FieldValue {
        match self.fields.get(key) {
            Some(value) => coerce(&self.client, key, value),
            None => FieldValue::Null,
        }
    }

    /// The raw, uncoerced JSON value of a field.
    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Whether the object has a field with this name.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Field names present on the object.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    // Typed convenience accessors.

    /// A string field, uncoerced.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// A boolean field.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.fields.get(key).and_then(Value::as_bool)
    }

    /// A decimal field: coerced amounts, plain numbers, or numeric strings.
    pub fn get_decimal(&self, key: &str) -> Option<Decimal> {
        match self.get(key) {
            FieldValue::Decimal(d) => Some(d),
            FieldValue::Number(n) => n.to_string().parse().ok(),
            FieldValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// A timestamp field: coerced `_at` values or any RFC 3339 string.
    pub fn get_timestamp(&self, key: &str) -> Option<OffsetDateTime> {
        match self.get(key) {
            FieldValue::Timestamp(t) => Some(t),
            FieldValue::String(s) => OffsetDateTime::parse(&s, &Rfc3339).ok(),
            _ => None,
        }
    }

    /// A nested object field.
    pub fn get_object(&self, key: &str) -> Option<ApiObject> {
        match self.get(key) {
            FieldValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// A `{amount, currency}` field decoded as [`Money`].
    pub fn get_money(&self, key: &str) -> Option<Money> {
        self.fields
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    // High-traffic fields.

    /// The resource id.
    pub fn id(&self) -> Option<&str> {
        self.get_str("id")
    }

    /// The resource type name (e.g. `account`).
    pub fn resource(&self) -> Option<&str> {
        self.get_str("resource")
    }

    /// The server-assigned path for self-referencing operations.
    pub fn resource_path(&self) -> Option<&str> {
        self.get_str("resource_path")
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> Option<OffsetDateTime> {
        self.get_timestamp("created_at")
    }

    /// Last-update timestamp.
    pub fn updated_at(&self) -> Option<OffsetDateTime> {
        self.get_timestamp("updated_at")
    }

    /// The `amount` field as a decimal.
    pub fn amount(&self) -> Option<Decimal> {
        self.get_decimal("amount")
    }

    /// The `currency` field.
    pub fn currency(&self) -> Option<&str> {
        self.get_str("currency")
    }

    // Self-referencing operations.

    /// Re-fetch this resource and replace the field mapping in place.
    ///
    /// The object's identity is preserved; only its fields change.
    pub async fn refresh(&mut self, params: &Params) -> Result<(), CoinbaseError> {
        let path = self.require_resource_path()?;
        let response = self.client.get(&path, params).await?;
        self.replace(response.data());
        Ok(())
    }

    /// PUT changed fields to this resource and merge the result.
    pub async fn update(&mut self, params: &Params) -> Result<(), CoinbaseError> {
        let path = self.require_resource_path()?;
        let response = self.client.put(&path, params).await?;
        self.merge(response.data());
        Ok(())
    }

    /// DELETE this resource.
    pub async fn delete(&mut self, params: &Params) -> Result<(), CoinbaseError> {
        let path = self.require_resource_path()?;
        self.client.delete(&path, params).await?;
        Ok(())
    }

    /// POST to `<resource_path>/commit` (buys, sells, deposits, withdrawals).
    pub async fn commit(&mut self, params: &Params) -> Result<(), CoinbaseError> {
        self.post_suffix("/commit", params).await
    }

    /// POST to `<resource_path>/refund` (orders).
    pub async fn refund(&mut self, params: &Params) -> Result<(), CoinbaseError> {
        self.post_suffix("/refund", params).await
    }

    /// POST to `<resource_path>/resend` (money requests).
    pub async fn resend(&mut self, params: &Params) -> Result<(), CoinbaseError> {
        self.post_suffix("/resend", params).await
    }

    /// DELETE this resource (cancel a money request).
    pub async fn cancel(&mut self, params: &Params) -> Result<(), CoinbaseError> {
        self.delete(params).await
    }

    async fn post_suffix(&mut self, suffix: &str, params: &Params) -> Result<(), CoinbaseError> {
        let path = self.require_resource_path()?;
        let response = self.client.post(&format!("{path}{suffix}"), params).await?;
        self.merge(response.data());
        Ok(())
    }

    fn require_resource_path(&self) -> Result<String, CoinbaseError> {
        self.resource_path()
            .map(str::to_owned)
            .ok_or_else(|| CoinbaseError::InvalidResponse("object has no resource_path".into()))
    }

    /// Merge new fields over the existing mapping.
    pub(crate) fn merge(&mut self, data: &Value) {
        if let Value::Object(map) = data {
            for (key, value) in map {
                self.fields.insert(key.clone(), value.clone());
            }
        }
    }

    /// Replace the field mapping wholesale.
    pub(crate) fn replace(&mut self, data: &Value) {
        if let Value::Object(map) = data {
            self.fields = map.clone();
        }
    }
}

impl std::fmt::Debug for ApiObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiObject")
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ApiObject {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

fn coerce(client: &Arc<dyn ApiClient>, key: &str, value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Bool(b) => FieldValue::Bool(*b),
        Value::Number(n) => FieldValue::Number(n.clone()),
        Value::Object(_) => FieldValue::Object(ApiObject::new(client.clone(), value)),
        Value::Array(items) => FieldValue::Array(
            items
                .iter()
                .map(|item| coerce(client, key, item))
                .collect(),
        ),
        Value::String(s) => coerce_string(key, s),
    }
}

fn coerce_string(key: &str, s: &str) -> FieldValue {
    if key.ends_with("_at") {
        if let Ok(ts) = OffsetDateTime::parse(s, &Rfc3339) {
            return FieldValue::Timestamp(ts);
        }
    } else if key == "amount" && looks_like_amount(s) {
        // Strip currency symbols and thousands separators before parsing.
        let cleaned: String = s
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        if let Ok(amount) = cleaned.parse::<Decimal>() {
            return FieldValue::Decimal(amount);
        }
        // Malformed amount: fall through to the raw string.
    }
    FieldValue::String(s.to_owned())
}

/// Whether a string is shaped like a money amount: an optional single
/// leading symbol, optional whitespace, digits/commas, at most one dot.
fn looks_like_amount(s: &str) -> bool {
    fn tail(s: &str) -> bool {
        let s = s.trim_start();
        let s = s.trim_start_matches(|c: char| c.is_ascii_digit() || c == ',');
        let s = s.strip_prefix('.').unwrap_or(s);
        s.chars().all(|c| c.is_ascii_digit())
    }

    if tail(s) {
        return true;
    }
    let mut chars = s.chars();
    chars.next();
    tail(chars.as_str())
}

impl FieldValue {
    /// The string value, if this is an uncoerced string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The decimal value, if this field coerced to one.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// The timestamp, if this field coerced to one.
    pub fn as_timestamp(&self) -> Option<OffsetDateTime> {
        match self {
            FieldValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// The nested object, if this field is one.
    pub fn as_object(&self) -> Option<&ApiObject> {
        match self {
            FieldValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Whether the field is null or absent.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::Method;
    use reqwest::header::HeaderMap;
    use serde_json::json;
    use std::sync::Mutex;
    use time::macros::datetime;

    use crate::wallet::rest::response::ApiResponse;

    /// Stub client that replays canned responses and records requests.
    struct StubClient {
        responses: Mutex<Vec<ApiResponse>>,
        requests: Mutex<Vec<(Method, String)>>,
    }

    impl StubClient {
        fn new(bodies: Vec<Value>) -> Arc<Self> {
            let responses = bodies
                .into_iter()
                .map(|body| ApiResponse::new(200, HeaderMap::new(), body))
                .collect();
            Arc::new(Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ApiClient for StubClient {
        async fn execute(
            &self,
            method: Method,
            path: &str,
            _body: Option<String>,
            _headers: HeaderMap,
        ) -> Result<ApiResponse, CoinbaseError> {
            self.requests.lock().unwrap().push((method, path.to_owned()));
            Ok(self.responses.lock().unwrap().remove(0))
        }
    }

    fn object(data: Value) -> ApiObject {
        let client: Arc<dyn ApiClient> = StubClient::new(vec![]);
        ApiObject::new(client, &data)
    }

    fn account_data() -> Value {
        json!({
            "id": "2bbf394c-193b-5b2a-9155-3b4732659ede",
            "name": "My Wallet",
            "primary": true,
            "type": "wallet",
            "currency": "BTC",
            "balance": {"amount": "39.59000000", "currency": "BTC"},
            "native_balance": {"amount": "395.90", "currency": "USD"},
            "created_at": "2015-01-31T20:49:02Z",
            "updated_at": "2015-01-31T20:49:02Z",
            "resource": "account",
            "resource_path": "/v2/accounts/2bbf394c-193b-5b2a-9155-3b4732659ede"
        })
    }

    #[test]
    fn test_attribute_access() {
        let obj = object(account_data());
        assert_eq!(obj.id(), Some("2bbf394c-193b-5b2a-9155-3b4732659ede"));
        assert_eq!(obj.get_str("name"), Some("My Wallet"));
        assert_eq!(obj.get_bool("primary"), Some(true));
    }

    #[test]
    fn test_nested_objects_wrap_recursively() {
        let obj = object(account_data());
        let balance = obj.get_object("balance").unwrap();
        assert_eq!(balance.currency(), Some("BTC"));
        assert_eq!(balance.amount(), Some("39.59".parse().unwrap()));
    }

    #[test]
    fn test_amount_coerces_to_decimal() {
        let obj = object(json!({"amount": "1.23450000"}));
        match obj.get("amount") {
            FieldValue::Decimal(d) => assert_eq!(d, "1.2345".parse::<Decimal>().unwrap()),
            other => panic!("expected decimal, got {other:?}"),
        }
    }

    #[test]
    fn test_amount_strips_symbols_and_commas() {
        let obj = object(json!({"amount": "$1,234.56"}));
        assert_eq!(obj.amount(), Some("1234.56".parse().unwrap()));
    }

    #[test]
    fn test_malformed_amount_falls_back_to_string() {
        let obj = object(json!({"amount": "not a number"}));
        match obj.get("amount") {
            FieldValue::String(s) => assert_eq!(s, "not a number"),
            other => panic!("expected raw string, got {other:?}"),
        }
    }

    #[test]
    fn test_non_amount_numeric_string_stays_raw() {
        let obj = object(json!({"code": "1234"}));
        match obj.get("code") {
            FieldValue::String(s) => assert_eq!(s, "1234"),
            other => panic!("expected raw string, got {other:?}"),
        }
    }

    #[test]
    fn test_timestamp_coercion() {
        let obj = object(account_data());
        assert_eq!(
            obj.created_at(),
            Some(datetime!(2015-01-31 20:49:02 UTC))
        );
    }

    #[test]
    fn test_non_timestamp_at_field_stays_raw() {
        let obj = object(json!({"expires_at": "soonish"}));
        match obj.get("expires_at") {
            FieldValue::String(s) => assert_eq!(s, "soonish"),
            other => panic!("expected raw string, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_key_is_null() {
        let obj = object(json!({}));
        assert!(obj.get("anything").is_null());
        assert_eq!(obj.id(), None);
    }

    #[test]
    fn test_get_money() {
        let obj = object(account_data());
        let balance = obj.get_money("balance").unwrap();
        assert_eq!(balance.amount, "39.59".parse().unwrap());
        assert_eq!(balance.currency, "BTC");
    }

    #[test]
    fn test_collection_wraps_elements() {
        let client: Arc<dyn ApiClient> = StubClient::new(vec![]);
        let data = json!([{"id": "a"}, {"id": "b"}]);
        let items = ApiObject::collection(&client, &data);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id(), Some("a"));
        assert_eq!(items[1].id(), Some("b"));
    }

    #[tokio::test]
    async fn test_refresh_replaces_fields_in_place() {
        let stub = StubClient::new(vec![json!({
            "data": {"id": "new_id", "resource_path": "/v2/accounts/new_id"}
        })]);
        let client: Arc<dyn ApiClient> = stub.clone();
        let mut obj = ApiObject::new(client, &account_data());

        obj.refresh(&Params::new()).await.unwrap();
        assert_eq!(obj.id(), Some("new_id"));
        // The stale name is gone: refresh replaces, not merges.
        assert!(!obj.contains_key("name"));

        let requests = stub.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, Method::GET);
        assert_eq!(
            requests[0].1,
            "/v2/accounts/2bbf394c-193b-5b2a-9155-3b4732659ede"
        );
    }

    #[tokio::test]
    async fn test_commit_posts_to_suffix() {
        let stub = StubClient::new(vec![json!({"data": {"status": "completed"}})]);
        let client: Arc<dyn ApiClient> = stub.clone();
        let mut obj = ApiObject::new(
            client,
            &json!({"resource_path": "/v2/accounts/a/buys/b", "status": "created"}),
        );

        obj.commit(&Params::new()).await.unwrap();
        assert_eq!(obj.get_str("status"), Some("completed"));

        let requests = stub.requests.lock().unwrap();
        assert_eq!(requests[0].0, Method::POST);
        assert_eq!(requests[0].1, "/v2/accounts/a/buys/b/commit");
    }

    #[tokio::test]
    async fn test_refresh_without_resource_path_errors() {
        let stub = StubClient::new(vec![]);
        let client: Arc<dyn ApiClient> = stub;
        let mut obj = ApiObject::new(client, &json!({"id": "x"}));

        let err = obj.refresh(&Params::new()).await.unwrap_err();
        assert!(matches!(err, CoinbaseError::InvalidResponse(_)));
    }
}
