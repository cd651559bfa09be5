//! Message types exchanged with the model gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::results::ToolResult;

/// A message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tool invocations requested by the model. Only set on assistant messages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
    /// The request this message answers. Only set on tool messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    fn with_role(role: Role, content: Option<String>) -> Self {
        Self {
            role,
            content,
            tool_calls: Vec::new(),
            tool_call_id: None,
            timestamp: Some(Utc::now()),
        }
    }

    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self::with_role(Role::System, Some(text.into()))
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::with_role(Role::User, Some(text.into()))
    }

    /// Create an assistant message carrying a text answer.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, Some(text.into()))
    }

    /// Create an assistant message requesting tool calls.
    pub fn assistant_tool_calls(calls: Vec<ToolCallRequest>) -> Self {
        Self {
            tool_calls: calls,
            ..Self::with_role(Role::Assistant, None)
        }
    }

    /// Create a tool message answering a single tool call.
    pub fn tool_result(result: &ToolResult) -> Self {
        Self {
            tool_call_id: Some(result.tool_call_id.clone()),
            ..Self::with_role(Role::Tool, Some(result.to_content()))
        }
    }

    /// Attach text to a message (e.g. reasoning alongside tool calls).
    pub fn with_content(mut self, text: impl Into<String>) -> Self {
        self.content = Some(text.into());
        self
    }

    /// Text content, if any and non-empty.
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref().filter(|text| !text.is_empty())
    }

    /// Whether the model asked for tool calls.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Conversation role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool call requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

impl ToolCallRequest {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}
