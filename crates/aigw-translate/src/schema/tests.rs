use super::*;
use aigw_protocol::gemini::types::Type;
use serde_json::json;

fn object(value: JsonValue) -> JsonObject {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

#[test]
fn converts_plain_object_schema() {
    let schema = json_schema_to_gemini(&object(json!({
        "type": "object",
        "properties": {
            "a": {"type": "integer", "minimum": 1},
            "b": {"type": "string", "additionalProperties": false}
        },
        "required": ["a"],
        "additionalProperties": false
    })))
    .unwrap();

    assert_eq!(schema.r#type, Some(Type::Object));
    assert_eq!(schema.required, Some(vec!["a".to_string()]));
    let properties = schema.properties.unwrap();
    assert_eq!(properties["a"].r#type, Some(Type::Integer));
    assert_eq!(properties["a"].minimum, Some(1.0));
    assert_eq!(properties["b"].r#type, Some(Type::String));
}

#[test]
fn nullable_type_list_becomes_nullable_flag() {
    let gapic = to_gapic(&object(json!({"type": ["string", "null"]})), 0).unwrap();
    assert_eq!(gapic, object(json!({"type": "string", "nullable": true})));
}

#[test]
fn type_list_without_null_is_rejected() {
    let err = to_gapic(&object(json!({"type": ["string", "integer"]})), 0).unwrap_err();
    assert!(matches!(err, SchemaError::Invalid(_)));
}

#[test]
fn any_of_null_member_sets_nullable() {
    let gapic = to_gapic(
        &object(json!({"anyOf": [{"type": "null"}, {"type": "integer", "const": 3}]})),
        0,
    )
    .unwrap();
    assert_eq!(
        gapic,
        object(json!({"nullable": true, "anyOf": [{"type": "integer"}]}))
    );
}

#[test]
fn all_of_single_member_replaces_schema() {
    let gapic = to_gapic(
        &object(json!({"description": "outer", "allOf": [{"type": "boolean"}]})),
        0,
    )
    .unwrap();
    assert_eq!(gapic, object(json!({"type": "boolean"})));

    let err = to_gapic(&object(json!({"allOf": [{}, {}]})), 0).unwrap_err();
    assert!(matches!(err, SchemaError::Invalid(_)));
}

#[test]
fn refs_are_substituted_and_defs_dropped() {
    let schema = json_schema_to_gemini(&object(json!({
        "type": "object",
        "properties": {
            "step": {"$ref": "#/$defs/Step"}
        },
        "$defs": {
            "Step": {
                "type": "object",
                "properties": {"explanation": {"type": "string"}}
            }
        }
    })))
    .unwrap();

    let step = &schema.properties.as_ref().unwrap()["step"];
    assert_eq!(step.r#type, Some(Type::Object));
    assert!(step.properties.as_ref().unwrap().contains_key("explanation"));
    let encoded = serde_json::to_value(&schema).unwrap();
    assert!(encoded.get("$defs").is_none());
}

#[test]
fn circular_refs_are_detected() {
    let err = dereference(&object(json!({
        "$defs": {"Node": {"type": "object", "properties": {"next": {"$ref": "#/$defs/Node"}}}},
        "properties": {"root": {"$ref": "#/$defs/Node"}}
    })))
    .unwrap_err();
    match err {
        SchemaError::Invalid(message) => assert!(message.contains("circular reference")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn ref_paths_must_be_local_and_clean() {
    for path in ["definitions/A", "#/", "#/a/../b", "#/missing"] {
        let err = dereference(&object(json!({"a": {}, "x": {"$ref": path}}))).unwrap_err();
        assert!(matches!(err, SchemaError::Invalid(_)), "path {path}");
    }
}

#[test]
fn deep_nesting_hits_depth_limit() {
    let mut value = json!({"type": "string"});
    for _ in 0..(MAX_DEPTH + 5) {
        value = json!({"type": "array", "items": value});
    }
    let err = json_schema_to_gemini(&object(value)).unwrap_err();
    assert!(matches!(err, SchemaError::MaxDepth(_)));
}
