use aigw_protocol::gemini::generate_content::response::{Candidate, GenerateContentResponse};
use aigw_protocol::gemini::types::Part;
use aigw_protocol::openai::chat_completions::stream::{
    ChatCompletionChunkObjectType, ChatCompletionStreamChoice, CreateChatCompletionStreamResponse,
};
use aigw_protocol::openai::chat_completions::types::{
    ChatCompletionMessageToolCallChunk, ChatCompletionMessageToolCallFunction,
    ChatCompletionResponseRole, ChatCompletionStreamResponseDelta, ChatCompletionToolCallType,
};
use aigw_protocol::sse::{
    normalize_newlines, split_frames, strip_data_prefix, strip_partial_data_prefix,
};
use tracing::{debug, warn};

use super::config::ResponseMode;
use super::response::{
    encode_arguments, extract_text, map_finish_reason, map_logprobs, map_usage,
};
use crate::error::TranslateError;

/// Reassembles upstream SSE frames that may be split across body chunks and
/// numbers tool calls across the whole stream.
#[derive(Debug, Clone, Default)]
pub struct StreamReassembler {
    buffer: String,
    /// Bytes of a UTF-8 sequence cut off at the end of the previous chunk.
    utf8_tail: Vec<u8>,
    tool_call_index: i64,
}

impl StreamReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Data held back from the previous call, with its `data:` prefix removed.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Appends `chunk` and returns every frame that now parses.
    ///
    /// A trailing frame that does not parse yet stays buffered; an
    /// unparsable frame followed by more data is dropped.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<GenerateContentResponse> {
        let text = self.decode_utf8(chunk);
        let data = std::mem::take(&mut self.buffer) + &text;
        let data = normalize_newlines(&data);
        let frames = split_frames(&data);
        let last = frames.len().saturating_sub(1);
        let mut parsed = Vec::new();

        for (i, frame) in frames.iter().enumerate() {
            let payload = strip_data_prefix(frame);
            if payload.is_empty() {
                continue;
            }
            match serde_json::from_str::<GenerateContentResponse>(payload) {
                Ok(response) => parsed.push(response),
                Err(err) if i == last => {
                    debug!(bytes = payload.len(), error = %err, "holding incomplete stream frame");
                    self.buffer = strip_partial_data_prefix(frame).to_string();
                }
                Err(err) => {
                    warn!(error = %err, "dropping unparsable stream frame");
                }
            }
        }
        parsed
    }

    fn decode_utf8(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.utf8_tail);
        bytes.extend_from_slice(chunk);
        match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                let utf8 = err.utf8_error();
                let mut bytes = err.into_bytes();
                if utf8.error_len().is_none() {
                    self.utf8_tail = bytes.split_off(utf8.valid_up_to());
                }
                String::from_utf8_lossy(&bytes).into_owned()
            }
        }
    }

    pub fn map_chunk(
        &mut self,
        response: GenerateContentResponse,
        mode: ResponseMode,
    ) -> Result<CreateChatCompletionStreamResponse, TranslateError> {
        let choices = response
            .candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| self.map_candidate(index, candidate, mode))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CreateChatCompletionStreamResponse {
            choices,
            model: response.model_version,
            object: ChatCompletionChunkObjectType::ChatCompletionChunk,
            usage: response.usage_metadata.as_ref().map(map_usage),
        })
    }

    fn map_candidate(
        &mut self,
        index: usize,
        candidate: &Candidate,
        mode: ResponseMode,
    ) -> Result<ChatCompletionStreamChoice, TranslateError> {
        let mut delta = ChatCompletionStreamResponseDelta {
            role: Some(ChatCompletionResponseRole::Assistant),
            ..ChatCompletionStreamResponseDelta::default()
        };
        let mut has_tool_calls = false;

        if let Some(content) = &candidate.content {
            let text = extract_text(&content.parts, mode);
            if !text.is_empty() {
                delta.content = Some(text);
            }
            let tool_calls = self.tool_call_chunks(&content.parts)?;
            if !tool_calls.is_empty() {
                has_tool_calls = true;
                delta.tool_calls = Some(tool_calls);
            }
        }

        Ok(ChatCompletionStreamChoice {
            index: index as i64,
            delta,
            logprobs: candidate.logprobs_result.as_ref().map(map_logprobs),
            finish_reason: map_finish_reason(candidate.finish_reason, has_tool_calls),
        })
    }

    fn tool_call_chunks(
        &mut self,
        parts: &[Part],
    ) -> Result<Vec<ChatCompletionMessageToolCallChunk>, TranslateError> {
        let mut chunks = Vec::new();
        for call in parts.iter().filter_map(|p| p.function_call.as_ref()) {
            let arguments = encode_arguments(call.args.as_ref())?;
            chunks.push(ChatCompletionMessageToolCallChunk {
                index: self.tool_call_index,
                id: Some(uuid::Uuid::new_v4().to_string()),
                r#type: Some(ChatCompletionToolCallType::Function),
                function: ChatCompletionMessageToolCallFunction {
                    name: call.name.clone(),
                    arguments,
                },
            });
            self.tool_call_index += 1;
        }
        Ok(chunks)
    }
}
