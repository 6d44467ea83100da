use aigw_protocol::gemini::types::{
    FunctionCallingConfig, FunctionCallingMode, FunctionDeclaration, GenerationConfig, JsonValue,
    Schema, Tool, ToolConfig, Type,
};
use aigw_protocol::openai::chat_completions::request::CreateChatCompletionRequestBody;
use aigw_protocol::openai::chat_completions::types::{
    ChatCompletionResponseFormat, ChatCompletionToolChoiceOption, ChatCompletionToolDefinition,
    FunctionObject,
};

use crate::error::TranslateError;
use crate::schema::json_schema_to_gemini;

pub const MIME_TEXT_PLAIN: &str = "text/plain";
pub const MIME_APPLICATION_JSON: &str = "application/json";
pub const MIME_TEXT_ENUM: &str = "text/x.enum";

/// How the upstream was asked to shape its output; decides post-processing
/// of response text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseMode {
    #[default]
    None,
    Text,
    Json,
    Enum,
    /// Emulated through a string schema, so responses arrive JSON-quoted.
    Regex,
}

/// Native JSON Schema fields are only honored by Gemini 2.5 models.
pub fn supports_json_schema(model: &str) -> bool {
    model.contains("gemini") && model.contains("2.5")
}

/// All function tools become declarations inside a single Gemini tool.
pub(crate) fn map_tools(
    tools: Option<&[ChatCompletionToolDefinition]>,
    json_schema_supported: bool,
) -> Result<Option<Vec<Tool>>, TranslateError> {
    let mut declarations = Vec::new();
    for tool in tools.unwrap_or_default() {
        match tool {
            ChatCompletionToolDefinition::Function { function } => {
                declarations.push(map_function(function, json_schema_supported)?);
            }
            ChatCompletionToolDefinition::ImageGeneration(_) => {
                return Err(TranslateError::ImageGenerationTool);
            }
            other => return Err(TranslateError::UnsupportedToolType(other.type_name())),
        }
    }
    if declarations.is_empty() {
        return Ok(None);
    }
    Ok(Some(vec![Tool {
        function_declarations: Some(declarations),
    }]))
}

fn map_function(
    function: &FunctionObject,
    json_schema_supported: bool,
) -> Result<FunctionDeclaration, TranslateError> {
    let mut declaration = FunctionDeclaration {
        name: function.name.clone(),
        description: function.description.clone().unwrap_or_default(),
        ..FunctionDeclaration::default()
    };

    if json_schema_supported {
        declaration.parameters_json_schema = function.parameters.clone();
        return Ok(declaration);
    }

    match &function.parameters {
        None | Some(JsonValue::Null) => {}
        Some(JsonValue::Object(params)) if params.is_empty() => {}
        Some(JsonValue::Object(params)) => {
            let schema =
                json_schema_to_gemini(params).map_err(|source| TranslateError::ToolParameters {
                    tool: function.name.clone(),
                    source,
                })?;
            declaration.parameters = Some(schema);
        }
        Some(other) => {
            return Err(TranslateError::ToolParametersNotObject {
                tool: function.name.clone(),
                found: json_type_name(other),
            });
        }
    }
    Ok(declaration)
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

pub(crate) fn map_tool_choice(
    tool_choice: Option<&ChatCompletionToolChoiceOption>,
) -> Result<Option<ToolConfig>, TranslateError> {
    let config = match tool_choice {
        None => return Ok(None),
        Some(ChatCompletionToolChoiceOption::Mode(mode)) => {
            let mode = match mode.as_str() {
                "auto" => FunctionCallingMode::Auto,
                "none" => FunctionCallingMode::None,
                "required" => FunctionCallingMode::Any,
                other => return Err(TranslateError::UnsupportedToolChoice(other.to_string())),
            };
            FunctionCallingConfig {
                mode: Some(mode),
                allowed_function_names: None,
            }
        }
        Some(ChatCompletionToolChoiceOption::NamedTool(named)) => FunctionCallingConfig {
            mode: Some(FunctionCallingMode::Any),
            allowed_function_names: Some(vec![named.function.name.clone()]),
        },
    };
    Ok(Some(ToolConfig {
        function_calling_config: Some(config),
    }))
}

fn has_schema(config: &GenerationConfig) -> bool {
    config.response_schema.is_some() || config.response_json_schema.is_some()
}

fn string_schema() -> Schema {
    Schema {
        r#type: Some(Type::String),
        ..Schema::default()
    }
}

pub(crate) fn map_generation_config(
    request: &CreateChatCompletionRequestBody,
    model: &str,
) -> Result<(GenerationConfig, ResponseMode), TranslateError> {
    let mut config = GenerationConfig {
        temperature: request.temperature.map(|v| v as f32),
        top_p: request.top_p.map(|v| v as f32),
        seed: request.seed.map(|v| v as i32),
        logprobs: request.top_logprobs.map(|v| v as i32),
        response_logprobs: request.logprobs,
        ..GenerationConfig::default()
    };
    let mut mode = ResponseMode::None;
    let mut specifiers = 0usize;

    if let Some(format) = &request.response_format {
        specifiers += 1;
        match format {
            ChatCompletionResponseFormat::Text => {
                mode = ResponseMode::Text;
                config.response_mime_type = Some(MIME_TEXT_PLAIN.to_string());
            }
            ChatCompletionResponseFormat::JsonObject => {
                mode = ResponseMode::Json;
                config.response_mime_type = Some(MIME_APPLICATION_JSON.to_string());
            }
            ChatCompletionResponseFormat::JsonSchema { json_schema } => {
                config.response_mime_type = Some(MIME_APPLICATION_JSON.to_string());
                let Some(JsonValue::Object(schema)) = &json_schema.schema else {
                    return Err(TranslateError::ResponseSchema(format!(
                        "schema for '{}' must be a JSON object",
                        json_schema.name
                    )));
                };
                mode = ResponseMode::Json;
                if supports_json_schema(model) {
                    config.response_json_schema = Some(JsonValue::Object(schema.clone()));
                } else {
                    let converted = json_schema_to_gemini(schema)
                        .map_err(|err| TranslateError::ResponseSchema(err.to_string()))?;
                    config.response_schema = Some(converted);
                }
            }
        }
    }

    if let Some(choices) = &request.guided_choice {
        specifiers += 1;
        if has_schema(&config) {
            return Err(TranslateError::DuplicateSchema);
        }
        mode = ResponseMode::Enum;
        config.response_mime_type = Some(MIME_TEXT_ENUM.to_string());
        config.response_schema = Some(Schema {
            enum_values: Some(choices.clone()),
            ..string_schema()
        });
    }

    if let Some(pattern) = request.guided_regex.as_deref().filter(|p| !p.is_empty()) {
        specifiers += 1;
        if has_schema(&config) {
            return Err(TranslateError::DuplicateSchema);
        }
        mode = ResponseMode::Regex;
        config.response_mime_type = Some(MIME_APPLICATION_JSON.to_string());
        config.response_schema = Some(Schema {
            pattern: Some(pattern.to_string()),
            ..string_schema()
        });
    }

    if let Some(schema) = &request.guided_json {
        specifiers += 1;
        if has_schema(&config) {
            return Err(TranslateError::DuplicateSchema);
        }
        mode = ResponseMode::Json;
        config.response_mime_type = Some(MIME_APPLICATION_JSON.to_string());
        config.response_json_schema = Some(schema.clone());
    }

    if specifiers > 1 {
        return Err(TranslateError::MultipleFormatSpecifiers);
    }

    config.candidate_count = request.n.map(|v| v as i32);
    config.max_output_tokens = request.max_tokens.map(|v| v as i32);
    config.presence_penalty = request.presence_penalty;
    config.frequency_penalty = request.frequency_penalty;
    config.stop_sequences = request.stop.clone().map(|stop| stop.into_sequences());

    if let Some(thinking) = request
        .gcp_vertex_ai
        .generation_config
        .as_ref()
        .and_then(|vendor| vendor.thinking_config.clone())
    {
        config.thinking_config = Some(thinking);
    }

    Ok((config, mode))
}
