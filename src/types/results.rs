//! Tool execution result types.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Why a single tool call failed. Tool failures never end a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToolErrorKind {
    UnknownTool,
    InvalidArguments,
    ExecutionError,
    Timeout,
}

/// Structured tool failure reported back to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Either the payload a tool produced or the reason it did not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success { payload: serde_json::Value },
    Error { error: ToolError },
}

/// The result of one tool call, keyed by the request it answers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub tool_call_id: String,
    #[serde(flatten)]
    pub outcome: ToolOutcome,
}

impl ToolResult {
    pub fn success(tool_call_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            outcome: ToolOutcome::Success { payload },
        }
    }

    pub fn failure(
        tool_call_id: impl Into<String>,
        kind: ToolErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self::from_error(tool_call_id, ToolError::new(kind, message))
    }

    pub fn from_error(tool_call_id: impl Into<String>, error: ToolError) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            outcome: ToolOutcome::Error { error },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Error { .. })
    }

    pub fn payload(&self) -> Option<&serde_json::Value> {
        match &self.outcome {
            ToolOutcome::Success { payload } => Some(payload),
            ToolOutcome::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ToolError> {
        match &self.outcome {
            ToolOutcome::Success { .. } => None,
            ToolOutcome::Error { error } => Some(error),
        }
    }

    /// Render the result as the text body of a tool message.
    ///
    /// String payloads are passed through verbatim; anything else is compact
    /// JSON. Errors become `{"error":{"kind":..,"message":..}}` so the model
    /// can tell a failure from a result that merely mentions one.
    pub fn to_content(&self) -> String {
        match &self.outcome {
            ToolOutcome::Success {
                payload: serde_json::Value::String(text),
            } => text.clone(),
            ToolOutcome::Success { payload } => payload.to_string(),
            ToolOutcome::Error { error } => serde_json::json!({
                "error": {
                    "kind": error.kind,
                    "message": error.message,
                }
            })
            .to_string(),
        }
    }
}
