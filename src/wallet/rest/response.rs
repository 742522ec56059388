//! Normalized API response envelope.
//!
//! The v2 Wallet API wraps payloads as
//! `{"data": ..., "pagination": {...}, "errors": [...], "warnings": [...]}`.
//! [`ApiResponse`] keeps the whole decoded body plus the transport-level
//! status and headers, and exposes typed views of the envelope fields.

use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::Value;

/// A decoded API response: status, case-normalized headers, JSON body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    headers: HeaderMap,
    body: Value,
}

impl ApiResponse {
    pub(crate) fn new(status: u16, headers: HeaderMap, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// The HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The response headers (header names are lowercase-normalized).
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The full decoded body.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// The `data` payload of the envelope (`Null` when absent).
    pub fn data(&self) -> &Value {
        self.body.get("data").unwrap_or(&Value::Null)
    }

    /// The pagination block, if the envelope carries one.
    pub fn pagination(&self) -> Option<Pagination> {
        self.body
            .get("pagination")
            .and_then(|p| serde_json::from_value(p.clone()).ok())
    }

    /// Whether more pages follow this one.
    pub fn has_more(&self) -> bool {
        self.pagination()
            .is_some_and(|p| p.next_uri.is_some())
    }

    /// Structured errors from the envelope.
    pub fn errors(&self) -> Vec<ErrorEntry> {
        self.entries("errors")
    }

    /// Structured warnings from the envelope.
    pub fn warnings(&self) -> Vec<ErrorEntry> {
        self.entries("warnings")
    }

    fn entries(&self, key: &str) -> Vec<ErrorEntry> {
        self.body
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One entry of the `errors` or `warnings` array.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEntry {
    /// Machine-readable identifier (e.g. `param_required`)
    pub id: Option<String>,
    /// Human-readable message
    pub message: Option<String>,
    /// Documentation URL, when the server provides one
    pub url: Option<String>,
}

impl ErrorEntry {
    /// Render the entry the way error messages quote it:
    /// the message, with ` (<url>)` appended when a url is present.
    pub fn render(&self) -> String {
        let mut out = self.message.clone().unwrap_or_default();
        if let Some(url) = &self.url {
            out.push_str(&format!(" ({url})"));
        }
        out
    }
}

/// The pagination block of a collection response.
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    /// Cursor for the page before this one
    pub ending_before: Option<String>,
    /// Cursor for the page after this one
    pub starting_after: Option<String>,
    /// Page size limit
    pub limit: Option<u32>,
    /// Sort order (`asc`/`desc`)
    pub order: Option<String>,
    /// URI of the previous page, if any
    pub previous_uri: Option<String>,
    /// URI of the next page; `None` on the last page
    pub next_uri: Option<String>,
}
