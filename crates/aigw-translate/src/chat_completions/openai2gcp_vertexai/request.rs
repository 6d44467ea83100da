use aigw_protocol::gemini::generate_content::request::GenerateContentRequestBody;
use aigw_protocol::openai::chat_completions::request::CreateChatCompletionRequestBody;

use super::config::{
    ResponseMode, map_generation_config, map_tool_choice, map_tools, supports_json_schema,
};
use super::messages::map_messages;
use crate::error::TranslateError;

/// Builds the Vertex AI `generateContent` body for an OpenAI chat request.
///
/// `model` is the already-resolved target model; it drives the JSON Schema
/// capability check.
pub fn map_request(
    request: &CreateChatCompletionRequestBody,
    model: &str,
) -> Result<(GenerateContentRequestBody, ResponseMode), TranslateError> {
    let messages = map_messages(&request.messages)?;
    let json_schema_supported = supports_json_schema(model);
    let tools = map_tools(request.tools.as_deref(), json_schema_supported)?;
    let tool_config = map_tool_choice(request.tool_choice.as_ref())?;
    let (generation_config, mode) = map_generation_config(request, model)?;

    let body = GenerateContentRequestBody {
        contents: messages.contents,
        tools,
        tool_config,
        generation_config,
        system_instruction: messages.system_instruction,
        safety_settings: request.gcp_vertex_ai.safety_settings.clone(),
    };
    Ok((body, mode))
}
