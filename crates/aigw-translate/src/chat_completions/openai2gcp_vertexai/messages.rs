use std::collections::HashMap;

use aigw_protocol::gemini::types::{Content, ContentRole, JsonObject, JsonValue, Part};
use aigw_protocol::openai::chat_completions::types::{
    ChatCompletionAssistantContent, ChatCompletionAssistantContentPart,
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestDeveloperMessage,
    ChatCompletionRequestMessage, ChatCompletionRequestToolMessage,
    ChatCompletionRequestUserMessage, ChatCompletionTextContent, ChatCompletionTextContentPart,
    ChatCompletionUserContent, ChatCompletionUserContentPart,
};

use crate::data_uri::{guess_image_mime, is_data_uri, parse_data_uri};
use crate::error::TranslateError;

/// Tool-call id to function name, filled from assistant turns so later tool
/// results can be attributed.
pub(crate) type ToolCallRegistry = HashMap<String, String>;

#[derive(Debug, Default)]
pub(crate) struct MappedMessages {
    pub contents: Vec<Content>,
    pub system_instruction: Option<Content>,
}

/// Folds OpenAI messages into alternating Gemini contents.
///
/// User and tool parts accumulate into one pending `user` content that is
/// flushed before each assistant turn and at the end.
pub(crate) fn map_messages(
    messages: &[ChatCompletionRequestMessage],
) -> Result<MappedMessages, TranslateError> {
    let mut mapped = MappedMessages::default();
    let mut registry = ToolCallRegistry::new();
    let mut pending: Vec<Part> = Vec::new();

    for message in messages {
        match message {
            ChatCompletionRequestMessage::Developer(developer) => {
                push_system_parts(&mut mapped.system_instruction, map_developer_message(developer));
            }
            ChatCompletionRequestMessage::System(system) => {
                let developer = ChatCompletionRequestDeveloperMessage::from(system.clone());
                push_system_parts(&mut mapped.system_instruction, map_developer_message(&developer));
            }
            ChatCompletionRequestMessage::User(user) => {
                pending.extend(map_user_message(user).map_err(|err| err.in_message("user"))?);
            }
            ChatCompletionRequestMessage::Tool(tool) => {
                pending.push(map_tool_message(tool, &registry));
            }
            ChatCompletionRequestMessage::Assistant(assistant) => {
                if !pending.is_empty() {
                    mapped
                        .contents
                        .push(Content::new(ContentRole::User, std::mem::take(&mut pending)));
                }
                let parts = map_assistant_message(assistant, &mut registry)
                    .map_err(|err| err.in_message("assistant"))?;
                mapped.contents.push(Content::new(ContentRole::Model, parts));
            }
            ChatCompletionRequestMessage::Function(_) => {
                return Err(TranslateError::InvalidRole(message.role()));
            }
        }
    }

    if !pending.is_empty() {
        mapped.contents.push(Content::new(ContentRole::User, pending));
    }
    Ok(mapped)
}

fn push_system_parts(system_instruction: &mut Option<Content>, parts: Vec<Part>) {
    if parts.is_empty() {
        return;
    }
    system_instruction
        .get_or_insert_with(Content::default)
        .parts
        .extend(parts);
}

fn map_developer_message(message: &ChatCompletionRequestDeveloperMessage) -> Vec<Part> {
    match &message.content {
        ChatCompletionTextContent::Text(text) if text.is_empty() => Vec::new(),
        ChatCompletionTextContent::Text(text) => vec![Part::from_text(text.as_str())],
        ChatCompletionTextContent::Parts(items) => items
            .iter()
            .filter_map(|ChatCompletionTextContentPart::Text { text }| {
                (!text.is_empty()).then(|| Part::from_text(text.as_str()))
            })
            .collect(),
    }
}

fn map_user_message(message: &ChatCompletionRequestUserMessage) -> Result<Vec<Part>, TranslateError> {
    let items = match &message.content {
        ChatCompletionUserContent::Text(text) if text.is_empty() => return Ok(Vec::new()),
        ChatCompletionUserContent::Text(text) => return Ok(vec![Part::from_text(text.as_str())]),
        ChatCompletionUserContent::Parts(items) => items,
    };

    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        match item {
            ChatCompletionUserContentPart::Text { text } => {
                parts.push(Part::from_text(text.as_str()));
            }
            ChatCompletionUserContentPart::ImageUrl { image_url } => {
                if let Some(part) = map_image_url(&image_url.url)? {
                    parts.push(part);
                }
            }
            ChatCompletionUserContentPart::InputAudio { .. } => {
                return Err(TranslateError::AudioNotSupported);
            }
            ChatCompletionUserContentPart::File { .. } => {
                return Err(TranslateError::FileNotSupported);
            }
        }
    }
    Ok(parts)
}

fn map_image_url(url: &str) -> Result<Option<Part>, TranslateError> {
    if url.is_empty() {
        return Ok(None);
    }
    if is_data_uri(url) {
        let (mime_type, data) = parse_data_uri(url)?;
        return Ok(Some(Part::from_bytes(data, mime_type)));
    }
    Ok(Some(Part::from_uri(url, guess_image_mime(url))))
}

fn map_tool_message(message: &ChatCompletionRequestToolMessage, registry: &ToolCallRegistry) -> Part {
    let name = registry
        .get(&message.tool_call_id)
        .cloned()
        .unwrap_or_default();
    let output = match &message.content {
        ChatCompletionTextContent::Text(text) => text.clone(),
        ChatCompletionTextContent::Parts(items) => items
            .iter()
            .map(|ChatCompletionTextContentPart::Text { text }| text.as_str())
            .collect(),
    };
    let mut response = JsonObject::new();
    response.insert("output".to_string(), JsonValue::String(output));
    Part::from_function_response(name, response)
}

fn map_assistant_message(
    message: &ChatCompletionRequestAssistantMessage,
    registry: &mut ToolCallRegistry,
) -> Result<Vec<Part>, TranslateError> {
    let mut parts = Vec::new();

    for call in message.tool_calls.iter().flatten() {
        registry.insert(call.id.clone(), call.function.name.clone());
        let args: Option<JsonObject> = serde_json::from_str(&call.function.arguments)
            .map_err(|err| TranslateError::FunctionArguments(err.to_string()))?;
        parts.push(Part::from_function_call(call.function.name.as_str(), args));
    }

    match &message.content {
        None => {}
        Some(ChatCompletionAssistantContent::Text(text)) => {
            if !text.is_empty() {
                parts.push(Part::from_text(text.as_str()));
            }
        }
        Some(ChatCompletionAssistantContent::Parts(items)) => {
            for item in items {
                match item {
                    ChatCompletionAssistantContentPart::Text { text } if !text.is_empty() => {
                        parts.push(Part::from_text(text.as_str()));
                    }
                    // Refusals have no Gemini counterpart.
                    ChatCompletionAssistantContentPart::Text { .. }
                    | ChatCompletionAssistantContentPart::Refusal { .. } => {}
                }
            }
        }
    }

    Ok(parts)
}
