use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Google RPC error envelope returned by Vertex AI on non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcpErrorResponse {
    pub error: GcpError,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcpError {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    /// Kept verbatim so it can be echoed into the translated message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Box<RawValue>>,
}
