use aigw_common::{Headers, LlmTokenUsage, TranslatorConfig, header_get};
use aigw_protocol::openai::chat_completions::request::CreateChatCompletionRequestBody;
use aigw_translate::{
    ChatCompletionTranslator, GcpVertexAiChatCompletionTranslator, TranslateError,
};
use serde_json::{Value, json};

fn translator() -> GcpVertexAiChatCompletionTranslator {
    GcpVertexAiChatCompletionTranslator::new(TranslatorConfig::default())
}

fn start(
    translator: &mut GcpVertexAiChatCompletionTranslator,
    request: Value,
) -> aigw_common::RequestMutation {
    let raw = serde_json::to_vec(&request).unwrap();
    let parsed: CreateChatCompletionRequestBody = serde_json::from_slice(&raw).unwrap();
    translator.request_body(&raw, &parsed, false).unwrap()
}

fn status_headers(status: &str) -> Headers {
    vec![(":status".to_string(), status.to_string())]
}

#[test]
fn request_sets_path_body_and_length() {
    let mut translator = translator();
    let mutation = start(
        &mut translator,
        json!({
            "model": "gemini-2.0-flash-001",
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "hi"}
            ],
            "temperature": 0.5
        }),
    );

    assert_eq!(
        header_get(&mutation.headers, ":path"),
        Some("publishers/google/models/gemini-2.0-flash-001:generateContent")
    );
    let body = mutation.body.unwrap();
    assert_eq!(
        header_get(&mutation.headers, "Content-Length"),
        Some(body.len().to_string().as_str())
    );
    let sent: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        sent,
        json!({
            "contents": [{"parts": [{"text": "hi"}], "role": "user"}],
            "generation_config": {"temperature": 0.5},
            "system_instruction": {"parts": [{"text": "be brief"}]}
        })
    );
    assert!(!translator.is_stream());
}

#[test]
fn override_model_and_stream_path() {
    let mut translator = GcpVertexAiChatCompletionTranslator::new(TranslatorConfig {
        publisher: "google".to_string(),
        model_name_override: Some("gemini-1.5-pro-002".to_string()),
    });
    let mutation = start(
        &mut translator,
        json!({"model": "gpt-4o", "stream": true, "messages": [{"role": "user", "content": "hi"}]}),
    );
    assert_eq!(
        header_get(&mutation.headers, ":path"),
        Some("publishers/google/models/gemini-1.5-pro-002:streamGenerateContent?alt=sse")
    );
    assert_eq!(translator.request_model(), "gemini-1.5-pro-002");
    assert_eq!(
        translator.response_headers(&Headers::new()).unwrap(),
        Some(vec![(
            "content-type".to_string(),
            "text/event-stream".to_string()
        )])
    );
}

#[test]
fn request_errors_are_wrapped() {
    let mut translator = translator();
    let raw = br#"{"model":"m","messages":[{"role":"user","content":"hi"}],"tool_choice":"maybe"}"#;
    let parsed: CreateChatCompletionRequestBody = serde_json::from_slice(raw).unwrap();
    let err = translator.request_body(raw, &parsed, true).unwrap_err();
    assert!(matches!(err, TranslateError::Request(_)));
    assert_eq!(
        err.to_string(),
        "failed to translate request: unsupported tool choice: 'maybe'"
    );
}

#[test]
fn buffered_response_is_rewritten_with_usage() {
    let mut translator = translator();
    start(
        &mut translator,
        json!({"model": "gemini-2.0-flash-001", "messages": [{"role": "user", "content": "hi"}]}),
    );
    assert_eq!(translator.response_headers(&Headers::new()).unwrap(), None);

    let upstream = json!({
        "candidates": [{"content": {"parts": [{"text": "Hello"}]}, "finishReason": "MAX_TOKENS"}],
        "usageMetadata": {
            "promptTokenCount": 8,
            "cachedContentTokenCount": 2,
            "candidatesTokenCount": 12,
            "totalTokenCount": 20
        }
    })
    .to_string();
    let mutation = translator
        .response_body(&Headers::new(), &mut upstream.as_bytes(), true)
        .unwrap();

    let body = mutation.body.unwrap();
    assert_eq!(
        mutation.headers,
        Some(vec![("content-length".to_string(), body.len().to_string())])
    );
    let mapped: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(mapped["choices"][0]["message"]["content"], "Hello");
    assert_eq!(mapped["choices"][0]["finish_reason"], "length");
    assert_eq!(mapped["usage"]["prompt_tokens_details"]["cached_tokens"], 2);
    assert_eq!(
        mutation.usage,
        LlmTokenUsage {
            input_tokens: 8,
            output_tokens: 12,
            total_tokens: 20,
            cached_input_tokens: 2,
        }
    );
    assert_eq!(mutation.response_model, "gemini-2.0-flash-001");
}

#[test]
fn empty_buffered_response() {
    let mut translator = translator();
    start(&mut translator, json!({"model": "m", "messages": []}));
    let mutation = translator
        .response_body(&Headers::new(), &mut &b"{}"[..], true)
        .unwrap();
    assert_eq!(mutation.body.unwrap().as_ref(), br#"{"object":"chat.completion"}"#);
    assert_eq!(
        mutation.headers,
        Some(vec![("content-length".to_string(), "28".to_string())])
    );
    assert!(mutation.usage.is_empty());
}

#[test]
fn undecodable_buffered_response_fails() {
    let mut translator = translator();
    start(&mut translator, json!({"model": "m", "messages": []}));
    let err = translator
        .response_body(&Headers::new(), &mut &b"not json"[..], true)
        .unwrap_err();
    assert!(matches!(err, TranslateError::Decode(_)));
}

#[test]
fn streamed_response_ends_with_done() {
    let mut translator = translator();
    start(
        &mut translator,
        json!({"model": "gemini-2.0-flash-001", "stream": true, "messages": [{"role": "user", "content": "hi"}]}),
    );

    let first = translator
        .response_body(
            &Headers::new(),
            &mut &b"data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hel"[..],
            false,
        )
        .unwrap();
    assert_eq!(first.headers, None);
    assert_eq!(first.body.unwrap().as_ref(), b"");
    assert_eq!(
        translator.buffered(),
        r#"{"candidates":[{"content":{"parts":[{"text":"Hel"#
    );

    let rest = b"lo\"}]}}],\"usageMetadata\":{\"promptTokenCount\":5,\"candidatesTokenCount\":3,\"totalTokenCount\":8}}\n\n";
    let last = translator
        .response_body(&Headers::new(), &mut &rest[..], true)
        .unwrap();
    let body = String::from_utf8(last.body.unwrap().to_vec()).unwrap();
    assert_eq!(
        body,
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hello\",\"role\":\"assistant\"}}],\"object\":\"chat.completion.chunk\",\"usage\":{\"prompt_tokens\":5,\"completion_tokens\":3,\"total_tokens\":8,\"completion_tokens_details\":{},\"prompt_tokens_details\":{}}}\n\ndata: [DONE]\n"
    );
    assert_eq!(last.usage.input_tokens, 5);
    assert_eq!(last.usage.output_tokens, 3);
    assert_eq!(last.usage.total_tokens, 8);
    assert_eq!(translator.buffered(), "");
}

#[test]
fn stream_output_does_not_depend_on_chunk_boundaries() {
    let stream: &[u8] = b"data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hel\"}]}}]}\n\ndata: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"lo \"}]},\"finishReason\":\"STOP\"}],\"usageMetadata\":{\"promptTokenCount\":5,\"candidatesTokenCount\":3,\"totalTokenCount\":8}}\n\n";
    let request = json!({"model": "m", "stream": true, "messages": [{"role": "user", "content": "hi"}]});

    let mut whole_translator = translator();
    start(&mut whole_translator, request.clone());
    let whole = whole_translator
        .response_body(&Headers::new(), &mut &stream[..], true)
        .unwrap();
    let whole_body = whole.body.unwrap();
    assert_eq!(whole_body.iter().filter(|b| **b == b'\n').count(), 5);

    for offset in 0..=stream.len() {
        let mut translator = translator();
        start(&mut translator, request.clone());
        let first = translator
            .response_body(&Headers::new(), &mut &stream[..offset], false)
            .unwrap();
        let second = translator
            .response_body(&Headers::new(), &mut &stream[offset..], true)
            .unwrap();

        let first_body = first.body.unwrap();
        let mut joined = first_body.to_vec();
        joined.extend_from_slice(&second.body.unwrap());
        assert_eq!(joined, whole_body.to_vec(), "split at {offset}");

        let first_has_usage = String::from_utf8_lossy(&first_body).contains("\"usage\"");
        assert_eq!(first.usage.is_empty(), !first_has_usage, "split at {offset}");
        let usage = if first_has_usage { first.usage } else { second.usage };
        assert_eq!(usage, whole.usage, "split at {offset}");
    }
}

#[test]
fn empty_finish_reason_is_left_out_of_chunks() {
    let mut translator = translator();
    start(
        &mut translator,
        json!({"model": "m", "stream": true, "messages": [{"role": "user", "content": "hi"}]}),
    );
    let stream = b"data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"x\"}]},\"finishReason\":\"\"}]}\n\n";
    let mutation = translator
        .response_body(&Headers::new(), &mut &stream[..], true)
        .unwrap();
    let body = String::from_utf8(mutation.body.unwrap().to_vec()).unwrap();
    assert!(body.contains("\"content\":\"x\""));
    assert!(!body.contains("finish_reason"));
}

#[test]
fn empty_end_of_stream_still_emits_done() {
    let mut translator = translator();
    start(
        &mut translator,
        json!({"model": "m", "stream": true, "messages": []}),
    );
    let mutation = translator
        .response_body(&Headers::new(), &mut &b""[..], true)
        .unwrap();
    assert_eq!(mutation.body.unwrap().as_ref(), b"data: [DONE]\n");
}

#[test]
fn gcp_error_is_normalized_with_details() {
    let mut translator = translator();
    let body = br#"{"error":{"code":400,"message":"Invalid request","status":"INVALID_ARGUMENT","details":[{"reason":"x"}]}}"#;
    let (headers, out) = translator
        .response_error(&status_headers("400"), &mut &body[..])
        .unwrap();

    assert_eq!(
        headers,
        vec![("content-length".to_string(), out.len().to_string())]
    );
    let mapped: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(
        mapped,
        json!({
            "type": "error",
            "error": {
                "type": "INVALID_ARGUMENT",
                "message": "Error: Invalid request\nDetails: [{\"reason\":\"x\"}]",
                "code": "400"
            }
        })
    );
}

#[test]
fn gcp_error_without_details_has_single_line() {
    let mut translator = translator();
    let body = br#"{"error":{"code":404,"message":"Not found","status":"NOT_FOUND"}}"#;
    let (_, out) = translator
        .response_error(&status_headers("404"), &mut &body[..])
        .unwrap();
    let mapped: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(mapped["error"]["message"], "Error: Not found");
    assert_eq!(mapped["error"]["type"], "NOT_FOUND");
}

#[test]
fn plain_text_error_is_wrapped() {
    let mut translator = translator();
    let (headers, out) = translator
        .response_error(&status_headers("503"), &mut &b"Service Unavailable"[..])
        .unwrap();
    let mapped: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(
        mapped,
        json!({
            "type": "error",
            "error": {
                "type": "GCPVertexAIBackendError",
                "message": "Service Unavailable",
                "code": "503"
            }
        })
    );
    assert_eq!(header_get(&headers, "content-length"), Some(out.len().to_string().as_str()));
}
