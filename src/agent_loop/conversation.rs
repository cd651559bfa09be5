//! The ordered message log a run feeds to the model.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::FerryError;
use crate::types::{Message, Role, ToolResult};

/// Append-only conversation owned by a single run.
///
/// Only the orchestrator appends; callers get read access and the finished
/// log back in [`AgentRun`](super::AgentRun).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    /// Seed a log with an optional system prompt and the user's message.
    pub(crate) fn seeded(system: Option<&str>, prompt: &str) -> Self {
        let mut log = Self::default();
        if let Some(system) = system {
            log.messages.push(Message::system(system));
        }
        log.messages.push(Message::user(prompt));
        log
    }

    pub(crate) fn push_assistant(&mut self, message: Message) {
        debug_assert_eq!(message.role, Role::Assistant);
        self.messages.push(message);
    }

    pub(crate) fn push_tool_results(&mut self, results: &[ToolResult]) {
        self.messages.extend(results.iter().map(Message::tool_result));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    /// Check the tool-call pairing rules.
    ///
    /// Every tool message must answer a call of the nearest preceding
    /// assistant message, with no other role in between, and each call id
    /// may be answered at most once. Assistant messages may not repeat call
    /// ids.
    pub fn validate(&self) -> Result<(), FerryError> {
        let invalid = |index: usize, reason: String| {
            Err(FerryError::InvalidConversation(format!("message {index}: {reason}")))
        };

        let mut open: HashSet<&str> = HashSet::new();
        let mut answered: HashSet<&str> = HashSet::new();
        let mut in_turn = false;

        for (index, message) in self.messages.iter().enumerate() {
            match message.role {
                Role::Assistant => {
                    open.clear();
                    answered.clear();
                    for call in &message.tool_calls {
                        if !open.insert(call.id.as_str()) {
                            return invalid(index, format!("duplicate tool call id '{}'", call.id));
                        }
                    }
                    in_turn = !open.is_empty();
                }
                Role::Tool => {
                    let Some(id) = message.tool_call_id.as_deref() else {
                        return invalid(index, "tool message without tool_call_id".to_string());
                    };
                    if !in_turn || !open.contains(id) {
                        return invalid(index, format!("dangling tool_call_id '{id}'"));
                    }
                    if !answered.insert(id) {
                        return invalid(index, format!("tool_call_id '{id}' answered twice"));
                    }
                }
                Role::System | Role::User => {
                    in_turn = false;
                }
            }
        }
        Ok(())
    }
}
