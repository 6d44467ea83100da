use serde::{Deserialize, Serialize};

/// OpenAI-compatible error envelope written back to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiErrorResponse {
    #[serde(rename = "type")]
    pub r#type: OpenAiErrorEnvelopeType,
    pub error: OpenAiError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpenAiErrorEnvelopeType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiError {
    #[serde(rename = "type")]
    pub r#type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl OpenAiErrorResponse {
    pub fn new(r#type: impl Into<String>, message: impl Into<String>, code: Option<String>) -> Self {
        Self {
            r#type: OpenAiErrorEnvelopeType::Error,
            error: OpenAiError {
                r#type: r#type.into(),
                message: message.into(),
                code,
            },
        }
    }
}
