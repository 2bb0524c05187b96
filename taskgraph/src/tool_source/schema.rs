//! Argument validation against the JSON-schema subset tools declare.

use serde_json::{Map, Value};

fn matches_type(value: &Value, ty: &str) -> bool {
    match ty {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        // Unknown type keywords are not enforced.
        _ => true,
    }
}

fn type_ok(value: &Value, ty: &Value) -> bool {
    match ty {
        Value::String(t) => matches_type(value, t),
        Value::Array(options) => options
            .iter()
            .filter_map(Value::as_str)
            .any(|t| matches_type(value, t)),
        _ => true,
    }
}

/// Checks `arguments` against `schema`: arguments must be an object, every `required`
/// field present and non-null, and every declared property of the declared type.
/// Returns the first violation as a readable reason.
pub fn validate_arguments(schema: &Value, arguments: &Value) -> Result<(), String> {
    let empty = Map::new();
    let args = match arguments {
        Value::Object(map) => map,
        Value::Null => &empty,
        other => return Err(format!("arguments must be an object, got {}", kind(other))),
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            match args.get(field) {
                None | Some(Value::Null) => {
                    return Err(format!("missing required field '{}'", field));
                }
                Some(_) => {}
            }
        }
    }

    if let Some(props) = schema.get("properties").and_then(Value::as_object) {
        for (name, value) in args {
            let Some(ty) = props.get(name).and_then(|p| p.get("type")) else {
                continue;
            };
            if !type_ok(value, ty) {
                return Err(format!(
                    "field '{}' should be {}, got {}",
                    name,
                    ty,
                    kind(value)
                ));
            }
        }
    }
    Ok(())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
