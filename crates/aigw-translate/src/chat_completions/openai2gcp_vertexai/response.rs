use aigw_common::LlmTokenUsage;
use aigw_protocol::gemini::generate_content::response::{
    Candidate, FinishReason, GenerateContentResponse, LogprobsResult, UsageMetadata,
};
use aigw_protocol::gemini::types::{JsonValue, Part};
use aigw_protocol::openai::chat_completions::response::{
    ChatCompletionChoice, ChatCompletionObjectType, CreateChatCompletionResponse,
};
use aigw_protocol::openai::chat_completions::types::{
    ChatCompletionChoiceLogprobs, ChatCompletionFinishReason, ChatCompletionMessageToolCall,
    ChatCompletionMessageToolCallFunction, ChatCompletionResponseMessage,
    ChatCompletionResponseRole, ChatCompletionTokenLogprob, ChatCompletionToolCallType,
    ChatCompletionTopLogprob, CompletionTokensDetails, CompletionUsage, PromptTokensDetails,
};

use super::config::ResponseMode;
use crate::error::TranslateError;

pub fn map_response(
    response: GenerateContentResponse,
    mode: ResponseMode,
) -> Result<CreateChatCompletionResponse, TranslateError> {
    let choices = response
        .candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| map_candidate(index, candidate, mode))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CreateChatCompletionResponse {
        choices,
        id: response.response_id,
        created: None,
        model: response.model_version,
        object: ChatCompletionObjectType::ChatCompletion,
        usage: response.usage_metadata.as_ref().map(map_usage),
    })
}

fn map_candidate(
    index: usize,
    candidate: &Candidate,
    mode: ResponseMode,
) -> Result<ChatCompletionChoice, TranslateError> {
    let mut message = ChatCompletionResponseMessage {
        role: ChatCompletionResponseRole::Assistant,
        ..ChatCompletionResponseMessage::default()
    };
    let mut has_tool_calls = false;

    if let Some(content) = &candidate.content {
        let text = extract_text(&content.parts, mode);
        let tool_calls = extract_tool_calls(&content.parts)?;
        has_tool_calls = !tool_calls.is_empty();
        if !text.is_empty() || !has_tool_calls {
            message.content = Some(text);
        }
        if has_tool_calls {
            message.tool_calls = Some(tool_calls);
        }
    }
    if !candidate.safety_ratings.is_empty() {
        message.safety_ratings = Some(candidate.safety_ratings.clone());
    }

    Ok(ChatCompletionChoice {
        index: index as i64,
        message,
        finish_reason: map_finish_reason(candidate.finish_reason, has_tool_calls),
        logprobs: candidate.logprobs_result.as_ref().map(map_logprobs),
    })
}

/// `None` for frames that carry no finish reason (mid-stream), whether the
/// field is missing or empty.
pub fn map_finish_reason(
    reason: Option<FinishReason>,
    has_tool_calls: bool,
) -> Option<ChatCompletionFinishReason> {
    match reason? {
        FinishReason::Empty => None,
        FinishReason::Stop if has_tool_calls => Some(ChatCompletionFinishReason::ToolCalls),
        FinishReason::Stop => Some(ChatCompletionFinishReason::Stop),
        FinishReason::MaxTokens => Some(ChatCompletionFinishReason::Length),
        _ => Some(ChatCompletionFinishReason::ContentFilter),
    }
}

/// Concatenates text parts. In regex mode the output was produced against a
/// string schema, so one wrapping quote is removed from each side.
pub fn extract_text(parts: &[Part], mode: ResponseMode) -> String {
    let mut text = String::new();
    for part_text in parts.iter().filter_map(|p| p.text.as_deref()) {
        if part_text.is_empty() {
            continue;
        }
        if mode == ResponseMode::Regex {
            let trimmed = part_text.strip_prefix('"').unwrap_or(part_text);
            text.push_str(trimmed.strip_suffix('"').unwrap_or(trimmed));
        } else {
            text.push_str(part_text);
        }
    }
    text
}

/// Gemini does not return call ids, so each call gets a fresh one.
pub fn extract_tool_calls(
    parts: &[Part],
) -> Result<Vec<ChatCompletionMessageToolCall>, TranslateError> {
    parts
        .iter()
        .filter_map(|p| p.function_call.as_ref())
        .map(|call| {
            let arguments = encode_arguments(call.args.as_ref())?;
            Ok(ChatCompletionMessageToolCall {
                id: uuid::Uuid::new_v4().to_string(),
                r#type: ChatCompletionToolCallType::Function,
                function: ChatCompletionMessageToolCallFunction {
                    name: call.name.clone(),
                    arguments,
                },
            })
        })
        .collect()
}

/// Missing arguments are reported as the JSON literal `null`.
pub(crate) fn encode_arguments(args: Option<&JsonValue>) -> Result<String, TranslateError> {
    match args {
        Some(args) => serde_json::to_string(args).map_err(TranslateError::Encode),
        None => Ok("null".to_string()),
    }
}

/// Reasoning tokens count toward completion tokens.
pub fn map_usage(usage: &UsageMetadata) -> CompletionUsage {
    let candidates = i64::from(usage.candidates_token_count.unwrap_or(0));
    let thoughts = i64::from(usage.thoughts_token_count.unwrap_or(0));
    let cached = i64::from(usage.cached_content_token_count.unwrap_or(0));
    CompletionUsage {
        prompt_tokens: i64::from(usage.prompt_token_count.unwrap_or(0)),
        completion_tokens: candidates + thoughts,
        total_tokens: i64::from(usage.total_token_count.unwrap_or(0)),
        completion_tokens_details: Some(CompletionTokensDetails {
            reasoning_tokens: (thoughts > 0).then_some(thoughts),
        }),
        prompt_tokens_details: Some(PromptTokensDetails {
            cached_tokens: (cached > 0).then_some(cached),
        }),
    }
}

pub fn token_usage(usage: &UsageMetadata) -> LlmTokenUsage {
    LlmTokenUsage {
        input_tokens: usage.prompt_token_count.unwrap_or(0),
        output_tokens: usage.candidates_token_count.unwrap_or(0),
        total_tokens: usage.total_token_count.unwrap_or(0),
        cached_input_tokens: usage.cached_content_token_count.unwrap_or(0),
    }
}

pub fn map_logprobs(result: &LogprobsResult) -> ChatCompletionChoiceLogprobs {
    if result.chosen_candidates.is_empty() {
        return ChatCompletionChoiceLogprobs::default();
    }
    let content = result
        .chosen_candidates
        .iter()
        .enumerate()
        .map(|(i, chosen)| ChatCompletionTokenLogprob {
            token: chosen.token.clone(),
            logprob: chosen.log_probability,
            top_logprobs: result
                .top_candidates
                .get(i)
                .map(|top| {
                    top.candidates
                        .iter()
                        .map(|candidate| ChatCompletionTopLogprob {
                            token: candidate.token.clone(),
                            logprob: candidate.log_probability,
                        })
                        .collect()
                })
                .unwrap_or_default(),
        })
        .collect();
    ChatCompletionChoiceLogprobs {
        content: Some(content),
    }
}
