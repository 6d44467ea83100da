use aigw_protocol::gemini::error::GcpErrorResponse;
use aigw_protocol::gemini::generate_content::request::{
    GenerateContentRequestBody, generate_content_path,
};
use aigw_protocol::gemini::generate_content::response::{FinishReason, GenerateContentResponse};
use aigw_protocol::gemini::types::{
    ContentRole, HarmCategory, HarmProbability, Part, Schema, Type,
};
use aigw_protocol::openai::chat_completions::request::{
    CreateChatCompletionRequestBody, StopConfiguration,
};
use aigw_protocol::openai::chat_completions::response::CreateChatCompletionResponse;
use aigw_protocol::openai::chat_completions::types::{
    ChatCompletionRequestMessage, ChatCompletionToolChoiceOption, ChatCompletionToolDefinition,
    ChatCompletionUserContent, ChatCompletionUserContentPart,
};
use aigw_protocol::openai::error::OpenAiErrorResponse;
use serde_json::json;

#[test]
fn chat_request_decodes_every_role_and_vendor_fields() {
    let body = json!({
        "model": "gemini-2.0-flash-001",
        "messages": [
            {"role": "system", "content": "be brief"},
            {"role": "developer", "content": [{"type": "text", "text": "really"}]},
            {"role": "user", "content": [
                {"type": "text", "text": "look"},
                {"type": "image_url", "image_url": {"url": "https://x/a.png", "detail": "low"}}
            ]},
            {"role": "assistant", "tool_calls": [
                {"id": "call_1", "type": "function", "function": {"name": "f", "arguments": "{}"}}
            ]},
            {"role": "tool", "tool_call_id": "call_1", "content": "ok"},
            {"role": "function", "name": "legacy", "content": "x"}
        ],
        "stop": "END",
        "tool_choice": "auto",
        "tools": [{"type": "image_generation"}],
        "guided_choice": ["a", "b"],
        "generationConfig": {"thinkingConfig": {"includeThoughts": true, "thinkingBudget": 128}},
        "safetySettings": [{"category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_ONLY_HIGH"}]
    });
    let req: CreateChatCompletionRequestBody = serde_json::from_value(body).unwrap();

    let roles: Vec<&str> = req.messages.iter().map(|m| m.role()).collect();
    assert_eq!(
        roles,
        vec!["system", "developer", "user", "assistant", "tool", "function"]
    );
    match &req.messages[2] {
        ChatCompletionRequestMessage::User(user) => match &user.content {
            ChatCompletionUserContent::Parts(parts) => {
                assert!(matches!(parts[1], ChatCompletionUserContentPart::ImageUrl { .. }));
            }
            other => panic!("unexpected content: {other:?}"),
        },
        other => panic!("unexpected message: {other:?}"),
    }
    assert_eq!(req.stop, Some(StopConfiguration::Single("END".to_string())));
    assert_eq!(
        req.tool_choice,
        Some(ChatCompletionToolChoiceOption::Mode("auto".to_string()))
    );
    let tools = req.tools.as_ref().unwrap();
    assert_eq!(tools[0].type_name(), "image_generation");
    assert!(matches!(
        tools[0],
        ChatCompletionToolDefinition::ImageGeneration(_)
    ));
    let thinking = req
        .gcp_vertex_ai
        .generation_config
        .as_ref()
        .and_then(|c| c.thinking_config.as_ref())
        .unwrap();
    assert_eq!(thinking.thinking_budget, Some(128));
    assert_eq!(req.gcp_vertex_ai.safety_settings.as_ref().unwrap().len(), 1);
    assert!(!req.is_stream());
}

#[test]
fn chat_request_rejects_unknown_content_shape() {
    let body = json!({
        "model": "m",
        "messages": [{"role": "user", "content": 42}]
    });
    assert!(serde_json::from_value::<CreateChatCompletionRequestBody>(body).is_err());
}

#[test]
fn schema_accepts_lowercase_types_and_numeric_int64() {
    let schema: Schema = serde_json::from_value(json!({
        "type": "array",
        "minItems": 1,
        "maxItems": "3",
        "items": {"type": "STRING", "nullable": true}
    }))
    .unwrap();
    assert_eq!(schema.r#type, Some(Type::Array));
    assert_eq!(schema.min_items, Some(1));
    assert_eq!(schema.max_items, Some(3));

    let encoded = serde_json::to_value(&schema).unwrap();
    assert_eq!(
        encoded,
        json!({
            "type": "ARRAY",
            "minItems": "1",
            "maxItems": "3",
            "items": {"type": "STRING", "nullable": true}
        })
    );
}

#[test]
fn inline_data_travels_as_base64() {
    let part = Part::from_bytes(b"hi".to_vec(), "image/png");
    assert_eq!(
        serde_json::to_value(&part).unwrap(),
        json!({"inlineData": {"mimeType": "image/png", "data": "aGk="}})
    );
}

#[test]
fn request_body_uses_vertex_top_level_keys() {
    let body = GenerateContentRequestBody::default();
    assert_eq!(
        serde_json::to_value(&body).unwrap(),
        json!({"contents": [], "generation_config": {}})
    );
    assert_eq!(
        generate_content_path("google", "gemini-pro", false),
        "publishers/google/models/gemini-pro:generateContent"
    );
    assert_eq!(
        generate_content_path("google", "gemini-pro", true),
        "publishers/google/models/gemini-pro:streamGenerateContent?alt=sse"
    );
}

#[test]
fn response_tolerates_unknown_enum_values() {
    let resp: GenerateContentResponse = serde_json::from_value(json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": "hi"}]},
            "finishReason": "SOMETHING_NEW",
            "safetyRatings": [{"category": "HARM_CATEGORY_FUTURE", "probability": "LOW"}]
        }],
        "usageMetadata": {"promptTokenCount": 1, "candidatesTokenCount": 2, "totalTokenCount": 3}
    }))
    .unwrap();
    let candidate = &resp.candidates[0];
    assert_eq!(candidate.finish_reason, Some(FinishReason::Unrecognized));
    assert_eq!(
        candidate.content.as_ref().unwrap().role,
        Some(ContentRole::Model)
    );
    assert_eq!(
        candidate.safety_ratings[0].category,
        HarmCategory::Unrecognized
    );
    assert_eq!(
        candidate.safety_ratings[0].probability,
        Some(HarmProbability::Low)
    );
}

#[test]
fn empty_finish_reason_is_its_own_variant() {
    let resp: GenerateContentResponse = serde_json::from_value(json!({
        "candidates": [{"finishReason": ""}, {"finishReason": "STOP"}]
    }))
    .unwrap();
    assert_eq!(resp.candidates[0].finish_reason, Some(FinishReason::Empty));
    assert_eq!(resp.candidates[1].finish_reason, Some(FinishReason::Stop));
}

#[test]
fn gcp_error_keeps_details_verbatim() {
    let raw = br#"{"error":{"code":400,"message":"bad","status":"INVALID_ARGUMENT","details":[ {"a": 1} ]}}"#;
    let err: GcpErrorResponse = serde_json::from_slice(raw).unwrap();
    assert_eq!(err.error.status, "INVALID_ARGUMENT");
    assert_eq!(err.error.details.unwrap().get(), r#"[ {"a": 1} ]"#);
}

#[test]
fn empty_completion_serializes_object_only() {
    let resp = CreateChatCompletionResponse::default();
    assert_eq!(
        serde_json::to_string(&resp).unwrap(),
        r#"{"object":"chat.completion"}"#
    );
}

#[test]
fn openai_error_envelope_shape() {
    let err = OpenAiErrorResponse::new("INVALID_ARGUMENT", "Error: bad", Some("400".to_string()));
    assert_eq!(
        serde_json::to_value(&err).unwrap(),
        json!({"type": "error", "error": {"type": "INVALID_ARGUMENT", "message": "Error: bad", "code": "400"}})
    );
}
