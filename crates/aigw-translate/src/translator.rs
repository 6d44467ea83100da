use std::io::Read;

use aigw_common::{
    CONTENT_TYPE, Headers, LlmTokenUsage, RequestMutation, ResponseMutation, TranslatorConfig,
    content_length_headers,
};
use aigw_protocol::gemini::generate_content::request::generate_content_path;
use aigw_protocol::gemini::generate_content::response::GenerateContentResponse;
use aigw_protocol::openai::chat_completions::request::CreateChatCompletionRequestBody;
use aigw_protocol::sse::{DONE_EVENT, push_data};
use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::chat_completions::openai2gcp_vertexai::{
    ResponseMode, StreamReassembler, map_error, map_request, map_response, token_usage,
};
use crate::error::TranslateError;

pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// Translates one OpenAI chat-completion exchange for a specific backend.
///
/// An instance is created per exchange; `request_body` must run before the
/// response methods because it records the stream flag and the model.
pub trait ChatCompletionTranslator {
    fn request_body(
        &mut self,
        raw: &[u8],
        request: &CreateChatCompletionRequestBody,
        force_body_mutation: bool,
    ) -> Result<RequestMutation, TranslateError>;

    fn response_headers(&mut self, headers: &Headers) -> Result<Option<Headers>, TranslateError>;

    /// Called once for a buffered response, or once per received slice of a
    /// streamed one.
    fn response_body(
        &mut self,
        headers: &Headers,
        body: &mut dyn Read,
        end_of_stream: bool,
    ) -> Result<ResponseMutation, TranslateError>;

    fn response_error(
        &mut self,
        headers: &Headers,
        body: &mut dyn Read,
    ) -> Result<(Headers, Bytes), TranslateError>;
}

#[derive(Debug, Clone)]
pub struct GcpVertexAiChatCompletionTranslator {
    config: TranslatorConfig,
    stream: bool,
    request_model: String,
    response_mode: ResponseMode,
    reassembler: StreamReassembler,
}

impl GcpVertexAiChatCompletionTranslator {
    pub fn new(config: TranslatorConfig) -> Self {
        Self {
            config,
            stream: false,
            request_model: String::new(),
            response_mode: ResponseMode::None,
            reassembler: StreamReassembler::new(),
        }
    }

    pub fn is_stream(&self) -> bool {
        self.stream
    }

    pub fn request_model(&self) -> &str {
        &self.request_model
    }

    /// Stream data held back until the rest of its frame arrives.
    pub fn buffered(&self) -> &str {
        self.reassembler.buffered()
    }

    fn buffered_response(&mut self, raw: &[u8]) -> Result<ResponseMutation, TranslateError> {
        let response: GenerateContentResponse =
            serde_json::from_slice(raw).map_err(TranslateError::Decode)?;
        let usage = response
            .usage_metadata
            .as_ref()
            .map(token_usage)
            .unwrap_or_default();
        let mapped = map_response(response, self.response_mode)?;
        let body = serde_json::to_vec(&mapped).map_err(TranslateError::Encode)?;

        Ok(ResponseMutation {
            headers: Some(content_length_headers(&body)),
            body: Some(Bytes::from(body)),
            usage,
            response_model: self.request_model.clone(),
        })
    }

    fn streamed_response(
        &mut self,
        raw: &[u8],
        end_of_stream: bool,
    ) -> Result<ResponseMutation, TranslateError> {
        let frames = self.reassembler.push(raw);
        debug!(frames = frames.len(), end_of_stream, "translating stream slice");

        let mut out = BytesMut::new();
        let mut usage = LlmTokenUsage::default();
        for frame in frames {
            if let Some(metadata) = &frame.usage_metadata {
                usage = token_usage(metadata);
            }
            let chunk = self.reassembler.map_chunk(frame, self.response_mode)?;
            let encoded = serde_json::to_vec(&chunk).map_err(TranslateError::Encode)?;
            push_data(&mut out, &encoded);
        }
        if end_of_stream {
            out.extend_from_slice(DONE_EVENT);
        }

        Ok(ResponseMutation {
            headers: None,
            body: Some(out.freeze()),
            usage,
            response_model: self.request_model.clone(),
        })
    }
}

impl ChatCompletionTranslator for GcpVertexAiChatCompletionTranslator {
    fn request_body(
        &mut self,
        _raw: &[u8],
        request: &CreateChatCompletionRequestBody,
        _force_body_mutation: bool,
    ) -> Result<RequestMutation, TranslateError> {
        let model = self.config.resolve_model(&request.model).to_string();
        let stream = request.is_stream();
        let (body, mode) =
            map_request(request, &model).map_err(|err| TranslateError::Request(Box::new(err)))?;
        let encoded = serde_json::to_vec(&body)
            .map_err(|err| TranslateError::Request(Box::new(TranslateError::Encode(err))))?;
        let path = generate_content_path(&self.config.publisher, &model, stream);
        debug!(%path, stream, mode = ?mode, "translated chat completion request");

        self.stream = stream;
        self.request_model = model;
        self.response_mode = mode;
        Ok(RequestMutation::build(&path, Some(Bytes::from(encoded))))
    }

    fn response_headers(&mut self, _headers: &Headers) -> Result<Option<Headers>, TranslateError> {
        if self.stream {
            return Ok(Some(vec![(
                CONTENT_TYPE.to_string(),
                EVENT_STREAM_CONTENT_TYPE.to_string(),
            )]));
        }
        Ok(None)
    }

    fn response_body(
        &mut self,
        _headers: &Headers,
        body: &mut dyn Read,
        end_of_stream: bool,
    ) -> Result<ResponseMutation, TranslateError> {
        let mut raw = Vec::new();
        body.read_to_end(&mut raw)?;
        if self.stream {
            self.streamed_response(&raw, end_of_stream)
        } else {
            self.buffered_response(&raw)
        }
    }

    fn response_error(
        &mut self,
        headers: &Headers,
        body: &mut dyn Read,
    ) -> Result<(Headers, Bytes), TranslateError> {
        let mut raw = Vec::new();
        body.read_to_end(&mut raw)?;
        map_error(headers, &raw)
    }
}
