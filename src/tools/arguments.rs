//! Typed access to tool call arguments.

use crate::error::FerryError;

/// Wrapper around tool call arguments providing typed extraction.
///
/// Executors receive arguments that already passed schema validation, but
/// accessors still return `Result` so a tool can be invoked directly.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Get the raw JSON value.
    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }

    pub fn into_inner(self) -> serde_json::Value {
        self.value
    }

    fn missing(kind: &str, key: &str) -> FerryError {
        FerryError::InvalidArgument(format!("Missing {kind} argument: {key}"))
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, FerryError> {
        self.get_str_opt(key).ok_or_else(|| Self::missing("string", key))
    }

    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    pub fn get_i64(&self, key: &str) -> Result<i64, FerryError> {
        self.get_i64_opt(key).ok_or_else(|| Self::missing("integer", key))
    }

    pub fn get_i64_opt(&self, key: &str) -> Option<i64> {
        self.value.get(key).and_then(|v| v.as_i64())
    }

    pub fn get_f64(&self, key: &str) -> Result<f64, FerryError> {
        self.value
            .get(key)
            .and_then(|v| v.as_f64())
            .ok_or_else(|| Self::missing("number", key))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, FerryError> {
        self.get_bool_opt(key).ok_or_else(|| Self::missing("boolean", key))
    }

    pub fn get_bool_opt(&self, key: &str) -> Option<bool> {
        self.value.get(key).and_then(|v| v.as_bool())
    }

    pub fn get_object(&self, key: &str) -> Result<&serde_json::Value, FerryError> {
        self.value
            .get(key)
            .filter(|v| v.is_object())
            .ok_or_else(|| Self::missing("object", key))
    }

    pub fn get_array(&self, key: &str) -> Result<&Vec<serde_json::Value>, FerryError> {
        self.value
            .get(key)
            .and_then(|v| v.as_array())
            .ok_or_else(|| Self::missing("array", key))
    }

    /// Deserialize the whole argument object into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, FerryError> {
        serde_json::from_value(self.value.clone()).map_err(|e| {
            FerryError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }
}

/// Normalize raw arguments as they arrive from a gateway.
///
/// Hosted chat APIs deliver function arguments as a JSON-encoded string;
/// those are decoded here. A blank string means "no arguments" and a null
/// becomes an empty object.
pub(crate) fn normalize_arguments(raw: &serde_json::Value) -> Result<serde_json::Value, String> {
    match raw {
        serde_json::Value::String(encoded) => {
            let trimmed = encoded.trim();
            if trimmed.is_empty() {
                return Ok(serde_json::json!({}));
            }
            serde_json::from_str(trimmed)
                .map_err(|e| format!("arguments are not valid JSON: {e}"))
        }
        serde_json::Value::Null => Ok(serde_json::json!({})),
        other => Ok(other.clone()),
    }
}
