//! Tool descriptors and parameter schemas.

use serde::{Deserialize, Serialize};

/// Static metadata advertised to the model for one tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameter_schema: ToolParameters,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameter_schema: ToolParameters,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameter_schema,
        }
    }
}

/// JSON Schema-based parameter definition for a tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ToolParameters {
    /// JSON Schema object describing the parameters.
    pub schema: serde_json::Value,
}

impl ToolParameters {
    /// Create from a raw JSON Schema value.
    pub fn from_schema(schema: serde_json::Value) -> Self {
        Self { schema }
    }

    /// Create an empty parameter schema (no parameters).
    pub fn empty() -> Self {
        Self::object().build()
    }

    /// Builder: create an object schema with properties.
    pub fn object() -> ParameterBuilder {
        ParameterBuilder {
            properties: serde_json::Map::new(),
            required: Vec::new(),
            closed: false,
        }
    }
}

/// Builder for constructing tool parameter schemas.
pub struct ParameterBuilder {
    properties: serde_json::Map<String, serde_json::Value>,
    required: Vec<String>,
    closed: bool,
}

impl ParameterBuilder {
    fn property(mut self, name: impl Into<String>, schema: serde_json::Value, required: bool) -> Self {
        let name = name.into();
        if required {
            self.required.push(name.clone());
        }
        self.properties.insert(name, schema);
        self
    }

    fn typed(
        self,
        kind: &str,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        let schema = serde_json::json!({ "type": kind, "description": description.into() });
        self.property(name, schema, required)
    }

    pub fn string(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.typed("string", name, description, required)
    }

    pub fn number(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.typed("number", name, description, required)
    }

    pub fn integer(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.typed("integer", name, description, required)
    }

    pub fn boolean(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.typed("boolean", name, description, required)
    }

    /// Add an array property whose items share one JSON type.
    pub fn array(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        item_type: &str,
        required: bool,
    ) -> Self {
        let schema = serde_json::json!({
            "type": "array",
            "description": description.into(),
            "items": { "type": item_type },
        });
        self.property(name, schema, required)
    }

    /// Add an enum (string) property.
    pub fn string_enum(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        values: &[&str],
        required: bool,
    ) -> Self {
        let schema = serde_json::json!({
            "type": "string",
            "description": description.into(),
            "enum": values,
        });
        self.property(name, schema, required)
    }

    /// Reject arguments the schema does not declare.
    pub fn deny_unknown(mut self) -> Self {
        self.closed = true;
        self
    }

    pub fn build(self) -> ToolParameters {
        let mut schema = serde_json::json!({
            "type": "object",
            "properties": self.properties,
            "required": self.required,
        });
        if self.closed {
            schema["additionalProperties"] = serde_json::Value::Bool(false);
        }
        ToolParameters { schema }
    }
}
