//! Validate tool call arguments against a descriptor's JSON Schema.
//!
//! Only the top level of the schema is checked: object type, required
//! fields, declared property types, string enums and `additionalProperties:
//! false`. Nested schemas are left to the executor.

use serde_json::Value;

/// Returns `Err(message)` describing the first violation found.
pub fn validate_arguments(args: &Value, schema: &Value) -> Result<(), String> {
    let expects_object = schema.get("type").and_then(Value::as_str) == Some("object");
    let Some(obj) = args.as_object() else {
        if expects_object {
            return Err(format!(
                "expected object arguments, got {}",
                json_type_name(args)
            ));
        }
        return Ok(());
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        if let Some(name) = required
            .iter()
            .filter_map(Value::as_str)
            .find(|name| !obj.contains_key(*name))
        {
            return Err(format!("missing required field '{name}'"));
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);
    let closed = schema.get("additionalProperties") == Some(&Value::Bool(false));

    for (key, value) in obj {
        let Some(prop_schema) = properties.and_then(|props| props.get(key)) else {
            if closed {
                return Err(format!("unexpected field '{key}'"));
            }
            continue;
        };
        if let Some(expected) = prop_schema.get("type").and_then(Value::as_str) {
            if !value_matches_type(value, expected) {
                return Err(format!(
                    "field '{key}' expected type '{expected}', got {}",
                    json_type_name(value)
                ));
            }
        }
        if let Some(allowed) = prop_schema.get("enum").and_then(Value::as_array) {
            if !allowed.contains(value) {
                return Err(format!("field '{key}' must be one of {}", Value::Array(allowed.clone())));
            }
        }
    }

    Ok(())
}

fn value_matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolParameters;
    use serde_json::json;

    fn lookup_schema() -> Value {
        ToolParameters::object()
            .string("query", "Search query", true)
            .integer("limit", "Max results", false)
            .string_enum("depth", "Extraction depth", &["basic", "advanced"], false)
            .build()
            .schema
    }

    #[test]
    fn accepts_required_and_optional_fields() {
        let args = json!({ "query": "rust", "limit": 5, "depth": "basic" });
        assert_eq!(validate_arguments(&args, &lookup_schema()), Ok(()));
    }

    #[test]
    fn reports_missing_required_field() {
        let err = validate_arguments(&json!({ "limit": 5 }), &lookup_schema()).unwrap_err();
        assert_eq!(err, "missing required field 'query'");
    }

    #[test]
    fn rejects_scalar_when_object_expected() {
        let err = validate_arguments(&json!(["rust"]), &lookup_schema()).unwrap_err();
        assert_eq!(err, "expected object arguments, got array");
    }

    #[test]
    fn float_is_not_an_integer() {
        let err = validate_arguments(&json!({ "query": "q", "limit": 2.5 }), &lookup_schema())
            .unwrap_err();
        assert!(err.contains("field 'limit' expected type 'integer'"));
    }

    #[test]
    fn enforces_string_enum() {
        let err = validate_arguments(&json!({ "query": "q", "depth": "deep" }), &lookup_schema())
            .unwrap_err();
        assert!(err.starts_with("field 'depth' must be one of"));
    }

    #[test]
    fn extra_fields_pass_unless_schema_is_closed() {
        let args = json!({ "query": "q", "verbose": true });
        assert!(validate_arguments(&args, &lookup_schema()).is_ok());

        let closed = ToolParameters::object()
            .string("query", "Search query", true)
            .deny_unknown()
            .build()
            .schema;
        assert_eq!(
            validate_arguments(&args, &closed),
            Err("unexpected field 'verbose'".to_string())
        );
    }

    #[test]
    fn untyped_schema_accepts_anything() {
        assert!(validate_arguments(&json!("free text"), &json!({})).is_ok());
        assert!(validate_arguments(&json!({ "x": 1 }), &json!({})).is_ok());
    }
}
