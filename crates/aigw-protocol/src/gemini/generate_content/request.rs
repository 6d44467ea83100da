use serde::{Deserialize, Serialize};

use crate::gemini::types::{Content, GenerationConfig, SafetySetting, Tool, ToolConfig};

/// Body of a Vertex AI `generateContent` / `streamGenerateContent` call.
///
/// Top-level keys use the snake_case spelling Vertex accepts; `safetySettings`
/// keeps the camelCase one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateContentRequestBody {
    /// Required. The content of the current conversation with the model.
    #[serde(default)]
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
    #[serde(default)]
    pub generation_config: GenerationConfig,
    /// System instruction (text-only Content, no role).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(rename = "safetySettings", skip_serializing_if = "Option::is_none")]
    pub safety_settings: Option<Vec<SafetySetting>>,
}

/// Builds the Vertex AI resource path for a publisher model.
pub fn generate_content_path(publisher: &str, model: &str, stream: bool) -> String {
    if stream {
        format!("publishers/{publisher}/models/{model}:streamGenerateContent?alt=sse")
    } else {
        format!("publishers/{publisher}/models/{model}:generateContent")
    }
}
