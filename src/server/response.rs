use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use super::request::HeaderVec;

/// Canonical reason phrase for the statuses this crate produces.
#[must_use]
pub fn status_reason(status: u16) -> &'static str {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}

/// Response data written by a [`Handler`](crate::Handler).
///
/// Starts out as `200` with no headers and an empty body; handlers set the
/// status and headers and then write the body.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 405, etc.)
    pub status: u16,
    /// HTTP response headers
    pub headers: HeaderVec,
    /// Response body bytes
    pub body: Vec<u8>,
}

impl Default for HandlerResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerResponse {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: HeaderVec::new(),
            body: Vec::new(),
        }
    }

    /// Get a header by name
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header
    pub fn set_header(&mut self, name: &str, value: String) {
        // Remove existing header with same name (case-insensitive)
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    /// Set `Content-Type: application/json` and the status, then encode
    /// `value` as the body.
    ///
    /// The status line and headers count as committed once this is called;
    /// an encoding failure is logged and leaves the body empty.
    pub fn write_json<T: Serialize + ?Sized>(&mut self, status: u16, value: &T) {
        self.set_header(http::header::CONTENT_TYPE.as_str(), "application/json".to_string());
        self.status = status;
        match serde_json::to_vec(value) {
            Ok(bytes) => self.body = bytes,
            Err(e) => {
                error!(status = status, error = %e, "Failed to encode JSON response body");
                self.body.clear();
            }
        }
    }

    /// Set `Content-Type: text/plain`, the status, and the body text.
    pub fn write_text(&mut self, status: u16, text: &str) {
        self.set_header(http::header::CONTENT_TYPE.as_str(), "text/plain".to_string());
        self.status = status;
        self.body = text.as_bytes().to_vec();
    }

    /// Body as UTF-8 text, lossily.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
