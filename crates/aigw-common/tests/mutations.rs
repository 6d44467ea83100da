use aigw_common::{
    CONTENT_LENGTH, Headers, LlmTokenUsage, PATH, RequestMutation, content_length_headers,
    header_get, header_set,
};
use bytes::Bytes;

#[test]
fn header_helpers_are_case_insensitive() {
    let mut headers = Headers::new();
    header_set(&mut headers, "Content-Type", "application/json");
    header_set(&mut headers, "content-type", "text/event-stream");
    assert_eq!(headers.len(), 1);
    assert_eq!(header_get(&headers, "CONTENT-TYPE"), Some("text/event-stream"));
}

#[test]
fn request_mutation_sets_path_and_length() {
    let mutation = RequestMutation::build(
        "publishers/google/models/m:generateContent",
        Some(Bytes::from_static(b"{}")),
    );
    assert_eq!(
        header_get(&mutation.headers, PATH),
        Some("publishers/google/models/m:generateContent")
    );
    assert_eq!(header_get(&mutation.headers, CONTENT_LENGTH), Some("2"));
    assert_eq!(mutation.body, Some(Bytes::from_static(b"{}")));
}

#[test]
fn request_mutation_skips_empty_parts() {
    let mutation = RequestMutation::build("", Some(Bytes::new()));
    assert!(mutation.headers.is_empty());
    assert_eq!(mutation.body, None);

    let path_only = RequestMutation::build("/v1/x", None);
    assert_eq!(path_only.headers.len(), 1);
    assert_eq!(path_only.body, None);
}

#[test]
fn body_headers_always_carry_length() {
    let headers = content_length_headers(b"");
    assert_eq!(header_get(&headers, CONTENT_LENGTH), Some("0"));
    let headers = content_length_headers(b"{\"a\":1}");
    assert_eq!(header_get(&headers, "Content-Length"), Some("7"));
}

#[test]
fn usage_emptiness() {
    let usage = LlmTokenUsage {
        input_tokens: 10,
        output_tokens: 5,
        total_tokens: 15,
        cached_input_tokens: 0,
    };
    assert!(!usage.is_empty());
    assert!(LlmTokenUsage::default().is_empty());
}
