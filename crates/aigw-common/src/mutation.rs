use bytes::Bytes;

use crate::headers::{CONTENT_LENGTH, Headers, PATH, header_set};
use crate::usage::LlmTokenUsage;

/// Header and body rewrites applied to the outbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMutation {
    pub headers: Headers,
    pub body: Option<Bytes>,
}

impl RequestMutation {
    /// Sets `:path` when `path` is non-empty, and replaces the body together
    /// with its `content-length` when `body` is non-empty.
    pub fn build(path: &str, body: Option<Bytes>) -> Self {
        let mut headers = Headers::new();
        if !path.is_empty() {
            header_set(&mut headers, PATH, path);
        }
        let body = body.filter(|b| !b.is_empty());
        if let Some(body) = &body {
            header_set(&mut headers, CONTENT_LENGTH, body.len().to_string());
        }
        Self { headers, body }
    }
}

/// Header mutation accompanying a replaced response or error body.
pub fn content_length_headers(body: &[u8]) -> Headers {
    vec![(CONTENT_LENGTH.to_string(), body.len().to_string())]
}

/// Result of translating one upstream response body (or one streamed slice of it).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMutation {
    /// `None` leaves the response headers untouched.
    pub headers: Option<Headers>,
    pub body: Option<Bytes>,
    pub usage: LlmTokenUsage,
    /// Model name reported for accounting; the resolved request model.
    pub response_model: String,
}
