//! Strict-schema translation for structured outputs
//!
//! Vendor structured-output modes reject open-ended schemas, so the
//! document's schema is rewritten before it is sent: every property becomes
//! nullable (the model must emit the key, null when absent), every object
//! level requires all of its keys and forbids additional properties.

use serde_json::{json, Map, Value};

/// Rewrite an object schema into the strict shape structured outputs accept.
pub fn to_strict_schema(schema: &Value) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    if let Some(props) = schema.get("properties").and_then(Value::as_object) {
        for (key, prop) in props {
            properties.insert(key.clone(), strict_property(prop));
            required.push(Value::String(key.clone()));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn strict_property(prop: &Value) -> Value {
    let mut out = Map::new();
    if let Some(description) = prop.get("description") {
        out.insert("description".to_string(), description.clone());
    }

    // Enumerations are loosened to plain strings; strict mode rejects
    // nullable enums and predictions are compared by value anyway.
    let has_enum = prop
        .get("enum")
        .and_then(Value::as_array)
        .is_some_and(|variants| !variants.is_empty());
    if has_enum {
        out.insert("type".to_string(), json!(["string", "null"]));
        return Value::Object(out);
    }

    match prop.get("type").and_then(Value::as_str) {
        Some("object") => {
            let nested = to_strict_schema(prop);
            if let Value::Object(nested) = nested {
                for (key, value) in nested {
                    out.insert(key, value);
                }
            }
            out.insert("type".to_string(), json!(["object", "null"]));
        }
        Some("array") => {
            let items = prop.get("items").cloned().unwrap_or_else(|| json!({}));
            let item_schema = if items.get("type").and_then(Value::as_str) == Some("object") {
                to_strict_schema(&items)
            } else {
                json!({"type": [simple_type(&items), "null"]})
            };
            out.insert("type".to_string(), json!(["array", "null"]));
            out.insert("items".to_string(), item_schema);
        }
        other => {
            out.insert("type".to_string(), json!([simple_name(other), "null"]));
        }
    }

    Value::Object(out)
}

fn simple_type(schema: &Value) -> &'static str {
    simple_name(schema.get("type").and_then(Value::as_str))
}

fn simple_name(type_name: Option<&str>) -> &'static str {
    match type_name {
        Some("string") => "string",
        Some("number") => "number",
        Some("integer") => "integer",
        Some("boolean") => "boolean",
        // Strict mode cannot express "any"; fall back to string
        _ => "string",
    }
}
