//! JSON Schema to Gemini `Schema` conversion.
//!
//! Runs in three steps: `$ref` substitution, reduction to the subset Vertex AI
//! accepts, then a typed decode into [`Schema`].

use std::collections::{BTreeSet, HashSet};

use aigw_protocol::gemini::types::{JsonObject, JsonValue, Schema};

pub const MAX_DEPTH: usize = 100;

const ALLOWED_FIELDS: &[&str] = &[
    "anyOf",
    "default",
    "description",
    "enum",
    "example",
    "format",
    "items",
    "maxItems",
    "maxLength",
    "maxProperties",
    "maximum",
    "minItems",
    "minLength",
    "minProperties",
    "minimum",
    "nullable",
    "pattern",
    "properties",
    "propertyOrdering",
    "required",
    "title",
    "type",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("maximum recursion depth exceeded: depth {0}")]
    MaxDepth(usize),
    #[error("{0}")]
    Invalid(String),
}

fn invalid(message: impl Into<String>) -> SchemaError {
    SchemaError::Invalid(message.into())
}

fn check_depth(depth: usize) -> Result<(), SchemaError> {
    if depth >= MAX_DEPTH {
        return Err(SchemaError::MaxDepth(depth));
    }
    Ok(())
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Converts a JSON Schema object into the Gemini schema dialect.
pub fn json_schema_to_gemini(schema: &JsonObject) -> Result<Schema, SchemaError> {
    let dereferenced = dereference(schema)?;
    let JsonValue::Object(dereferenced) = dereferenced else {
        return Err(invalid(format!(
            "dereferenced schema is not an object, got {}",
            type_name(&dereferenced)
        )));
    };
    let gapic = to_gapic(&dereferenced, 0)?;
    serde_json::from_value(JsonValue::Object(gapic))
        .map_err(|err| invalid(format!("failed to convert to Gemini schema: {err}")))
}

/// Substitutes every `$ref` with a copy of its target.
///
/// Top-level containers that refs point into (such as `$defs`) are copied
/// through untouched so their own refs are not chased again.
pub fn dereference(schema: &JsonObject) -> Result<JsonValue, SchemaError> {
    let root = JsonValue::Object(schema.clone());
    let mut skip_keys = BTreeSet::new();
    collect_skip_keys(&root, schema, &mut HashSet::new(), 0, &mut skip_keys)?;
    substitute_refs(&root, schema, &skip_keys, &mut HashSet::new(), 0)
}

fn ref_path(value: &JsonValue) -> Result<&str, SchemaError> {
    value.as_str().ok_or_else(|| {
        invalid(format!(
            "'$ref' value must be a string, got {}",
            type_name(value)
        ))
    })
}

fn resolve_ref(path: &str, root: &JsonObject) -> Result<JsonValue, SchemaError> {
    if path.is_empty() {
        return Err(invalid("ref path cannot be empty"));
    }
    let Some(pointer) = path.strip_prefix("#/") else {
        return Err(invalid(format!("ref paths must start with '#/', got: {path}")));
    };

    let components: Vec<&str> = pointer.split('/').collect();
    let mut current = root;
    for (i, component) in components.iter().enumerate() {
        if component.is_empty() {
            return Err(invalid(format!(
                "ref path contains empty component at position {}",
                i + 1
            )));
        }
        if component.contains("..") || component.contains("./") {
            return Err(invalid(format!(
                "ref path contains invalid characters: {component}"
            )));
        }
        let Some(value) = current.get(*component) else {
            return Err(invalid(format!(
                "reference '{path}' not found: component '{component}' does not exist"
            )));
        };
        if i == components.len() - 1 {
            check_nesting(value, 0)?;
            return Ok(value.clone());
        }
        let JsonValue::Object(next) = value else {
            return Err(invalid(format!(
                "reference '{path}' invalid: intermediate component '{component}' is not an object (got {})",
                type_name(value)
            )));
        };
        current = next;
    }
    Err(invalid(format!(
        "unexpected end of ref path traversal for: {path}"
    )))
}

/// Rejects values nested deeper than [`MAX_DEPTH`] before they are copied.
fn check_nesting(value: &JsonValue, depth: usize) -> Result<(), SchemaError> {
    check_depth(depth)?;
    match value {
        JsonValue::Object(map) => map.values().try_for_each(|v| check_nesting(v, depth + 1)),
        JsonValue::Array(items) => items.iter().try_for_each(|v| check_nesting(v, depth + 1)),
        _ => Ok(()),
    }
}

fn collect_skip_keys(
    value: &JsonValue,
    root: &JsonObject,
    in_progress: &mut HashSet<String>,
    depth: usize,
    keys: &mut BTreeSet<String>,
) -> Result<(), SchemaError> {
    check_depth(depth)?;
    match value {
        JsonValue::Object(map) => {
            for (key, child) in map {
                if key == "$ref" {
                    let path = ref_path(child)?.to_string();
                    if !in_progress.insert(path.clone()) {
                        return Err(invalid(format!("circular reference detected: {path}")));
                    }
                    let target = resolve_ref(&path, root);
                    let result = target.and_then(|target| {
                        if let Some(top) = path.split('/').nth(1) {
                            keys.insert(top.to_string());
                        }
                        collect_skip_keys(&target, root, in_progress, depth + 1, keys)
                    });
                    in_progress.remove(&path);
                    result?;
                } else if child.is_object() || child.is_array() {
                    collect_skip_keys(child, root, in_progress, depth + 1, keys)?;
                }
            }
            Ok(())
        }
        JsonValue::Array(items) => items
            .iter()
            .try_for_each(|item| collect_skip_keys(item, root, in_progress, depth + 1, keys)),
        _ => Ok(()),
    }
}

fn substitute_refs(
    value: &JsonValue,
    root: &JsonObject,
    skip_keys: &BTreeSet<String>,
    in_progress: &mut HashSet<String>,
    depth: usize,
) -> Result<JsonValue, SchemaError> {
    check_depth(depth)?;
    match value {
        JsonValue::Object(map) => {
            if let Some(reference) = map.get("$ref") {
                let path = ref_path(reference)?.to_string();
                if !in_progress.insert(path.clone()) {
                    return Err(invalid(format!("circular reference detected: {path}")));
                }
                let resolved = resolve_ref(&path, root).and_then(|target| {
                    substitute_refs(&target, root, skip_keys, in_progress, depth + 1)
                });
                in_progress.remove(&path);
                return resolved;
            }

            let mut out = JsonObject::new();
            for (key, child) in map {
                let child = if skip_keys.contains(key) {
                    child.clone()
                } else if child.is_object() || child.is_array() {
                    substitute_refs(child, root, skip_keys, in_progress, depth + 1)?
                } else {
                    child.clone()
                };
                out.insert(key.clone(), child);
            }
            Ok(JsonValue::Object(out))
        }
        JsonValue::Array(items) => items
            .iter()
            .map(|item| substitute_refs(item, root, skip_keys, in_progress, depth + 1))
            .collect::<Result<Vec<_>, _>>()
            .map(JsonValue::Array),
        other => Ok(other.clone()),
    }
}

/// Reduces a dereferenced schema to the fields Vertex AI understands.
pub fn to_gapic(schema: &JsonObject, depth: usize) -> Result<JsonObject, SchemaError> {
    check_depth(depth)?;
    if let Some(all_of) = schema.get("allOf") {
        return convert_all_of(all_of, depth);
    }

    let mut converted = JsonObject::new();
    for (key, value) in schema {
        match key.as_str() {
            "$defs" => {}
            "items" => {
                let JsonValue::Object(items) = value else {
                    return Err(invalid(format!(
                        "'items' must be an object, got {}",
                        type_name(value)
                    )));
                };
                converted.insert(key.clone(), JsonValue::Object(to_gapic(items, depth + 1)?));
            }
            "properties" => {
                let JsonValue::Object(properties) = value else {
                    return Err(invalid(format!(
                        "'properties' must be an object, got {}",
                        type_name(value)
                    )));
                };
                let mut out = JsonObject::new();
                for (name, property) in properties {
                    let JsonValue::Object(property) = property else {
                        return Err(invalid(format!(
                            "property '{name}' must be an object, got {}",
                            type_name(property)
                        )));
                    };
                    out.insert(name.clone(), JsonValue::Object(to_gapic(property, depth + 1)?));
                }
                converted.insert(key.clone(), JsonValue::Object(out));
            }
            "type" => converted.extend(convert_type(value)?),
            "anyOf" => converted.extend(convert_any_of(value, depth)?),
            other if ALLOWED_FIELDS.contains(&other) => {
                converted.insert(key.clone(), value.clone());
            }
            _ => {}
        }
    }
    Ok(converted)
}

fn convert_type(value: &JsonValue) -> Result<JsonObject, SchemaError> {
    let mut out = JsonObject::new();
    match value {
        JsonValue::String(_) => {
            out.insert("type".to_string(), value.clone());
        }
        JsonValue::Array(types) => {
            if types.len() != 2 {
                return Err(invalid(format!(
                    "if type is a list, length must be 2, got {}",
                    types.len()
                )));
            }
            let has_null = types.iter().any(|t| t.as_str() == Some("null"));
            let non_null = types.iter().find(|t| t.as_str() != Some("null"));
            let Some(non_null) = non_null.filter(|_| has_null) else {
                return Err(invalid(
                    "if type is a list, it must contain one non-null type and 'null'",
                ));
            };
            let type_value = match non_null {
                JsonValue::String(s) => s.clone(),
                JsonValue::Object(_) => {
                    return Err(invalid("unexpected object type in type array"));
                }
                other => other.to_string(),
            };
            out.insert("type".to_string(), JsonValue::String(type_value));
            out.insert("nullable".to_string(), JsonValue::Bool(true));
        }
        other => {
            return Err(invalid(format!(
                "'type' must be a list or string, got {}",
                type_name(other)
            )));
        }
    }
    Ok(out)
}

fn convert_all_of(value: &JsonValue, depth: usize) -> Result<JsonObject, SchemaError> {
    let JsonValue::Array(items) = value else {
        return Err(invalid(format!(
            "'allOf' must be a list, got {}",
            type_name(value)
        )));
    };
    match items.as_slice() {
        [] => Err(invalid("'allOf' cannot be empty")),
        [JsonValue::Object(only)] => to_gapic(only, depth + 1),
        [other] => Err(invalid(format!(
            "item in 'allOf' must be an object, got {}",
            type_name(other)
        ))),
        _ => Err(invalid(format!(
            "only one value for 'allOf' key is supported, got {}",
            items.len()
        ))),
    }
}

fn convert_any_of(value: &JsonValue, depth: usize) -> Result<JsonObject, SchemaError> {
    let JsonValue::Array(items) = value else {
        return Err(invalid(format!(
            "'anyOf' must be a list, got {}",
            type_name(value)
        )));
    };
    if items.is_empty() {
        return Err(invalid("'anyOf' cannot be empty"));
    }

    let mut nullable = false;
    let mut variants = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let JsonValue::Object(sub_schema) = item else {
            return Err(invalid(format!(
                "item {i} in 'anyOf' must be an object, got {}",
                type_name(item)
            )));
        };
        if sub_schema.get("type").and_then(JsonValue::as_str) == Some("null") {
            nullable = true;
        } else {
            variants.push(JsonValue::Object(to_gapic(sub_schema, depth + 1)?));
        }
    }

    let mut out = JsonObject::new();
    if nullable {
        out.insert("nullable".to_string(), JsonValue::Bool(true));
    }
    out.insert("anyOf".to_string(), JsonValue::Array(variants));
    Ok(out)
}

#[cfg(test)]
mod tests;
