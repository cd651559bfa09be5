//! The model boundary and a scripted implementation of it.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FerryError;
use crate::tools::ToolDescriptor;
use crate::types::{Message, ToolCallRequest};

/// Turns a conversation plus the advertised tools into one assistant message.
///
/// Implementations own transport, auth and wire format. Any `Err` is treated
/// as a transport failure and goes through the orchestrator's retry policy;
/// mark unrecoverable failures with a non-retryable [`FerryError`] variant.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn send(
        &self,
        log: &[Message],
        tools: &[ToolDescriptor],
    ) -> Result<Message, FerryError>;
}

/// One prepared gateway reply.
///
/// In a script file a turn is `{"text": ".."}`, `{"tool_calls": [..]}`, both,
/// or `{"error": ".."}` for a transport failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScriptedTurn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScriptedTurn {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn tool_calls(calls: Vec<ToolCallRequest>) -> Self {
        Self {
            tool_calls: calls,
            ..Self::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    fn reply(&self) -> Result<Message, FerryError> {
        if let Some(error) = &self.error {
            return Err(FerryError::gateway(error.clone()));
        }
        let mut message = Message::assistant_tool_calls(self.tool_calls.clone());
        message.content = self.text.clone();
        Ok(message)
    }
}

impl From<Message> for ScriptedTurn {
    fn from(message: Message) -> Self {
        Self {
            text: message.content,
            tool_calls: message.tool_calls,
            error: None,
        }
    }
}

/// A replayable gateway script.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GatewayScript {
    pub turns: Vec<ScriptedTurn>,
    /// Keep answering with the last turn once the script runs out.
    #[serde(default)]
    pub repeat_last: bool,
}

impl GatewayScript {
    pub fn from_json(input: &str) -> Result<Self, FerryError> {
        Ok(serde_json::from_str(input)?)
    }
}

#[derive(Debug, Default)]
struct ScriptState {
    pending: VecDeque<ScriptedTurn>,
    last: Option<ScriptedTurn>,
    received: Vec<Vec<Message>>,
}

/// Deterministic gateway that replays prepared turns in order.
///
/// Every call records the log it was given, so tests can check what the
/// model would have seen.
#[derive(Debug)]
pub struct ScriptedGateway {
    state: Mutex<ScriptState>,
    repeat_last: bool,
}

impl ScriptedGateway {
    pub fn new(turns: impl IntoIterator<Item = impl Into<ScriptedTurn>>) -> Self {
        Self::from_script(GatewayScript {
            turns: turns.into_iter().map(Into::into).collect(),
            repeat_last: false,
        })
    }

    pub fn from_script(script: GatewayScript) -> Self {
        Self {
            state: Mutex::new(ScriptState {
                pending: script.turns.into(),
                ..ScriptState::default()
            }),
            repeat_last: script.repeat_last,
        }
    }

    /// Keep replaying the final turn forever.
    pub fn repeating(mut self) -> Self {
        self.repeat_last = true;
        self
    }

    /// Number of `send` calls so far.
    pub fn calls(&self) -> usize {
        self.lock().received.len()
    }

    /// Snapshot of the log passed to each call.
    pub fn received(&self) -> Vec<Vec<Message>> {
        self.lock().received.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn send(
        &self,
        log: &[Message],
        _tools: &[ToolDescriptor],
    ) -> Result<Message, FerryError> {
        let mut state = self.lock();
        state.received.push(log.to_vec());
        let turn = match state.pending.pop_front() {
            Some(turn) => turn,
            None if self.repeat_last => state.last.clone().ok_or_else(|| {
                FerryError::InvalidState("gateway script is empty".to_string())
            })?,
            None => {
                return Err(FerryError::InvalidState(
                    "gateway script exhausted".to_string(),
                ))
            }
        };
        state.last = Some(turn.clone());
        turn.reply()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn replays_turns_in_order_then_runs_dry() {
        let gateway = ScriptedGateway::new([
            ScriptedTurn::tool_calls(vec![ToolCallRequest::new("c1", "lookup", json!({}))]),
            ScriptedTurn::text("done"),
        ]);
        let log = [Message::user("q")];

        let first = gateway.send(&log, &[]).await.unwrap();
        assert_eq!(first.tool_calls.len(), 1);
        let second = gateway.send(&log, &[]).await.unwrap();
        assert_eq!(second.text(), Some("done"));

        let err = gateway.send(&log, &[]).await.unwrap_err();
        assert!(!err.is_retryable());
        assert_eq!(gateway.calls(), 3);
    }

    #[tokio::test]
    async fn repeating_script_reuses_last_turn() {
        let gateway = ScriptedGateway::new([ScriptedTurn::text("again")]).repeating();
        for _ in 0..3 {
            let reply = gateway.send(&[], &[]).await.unwrap();
            assert_eq!(reply.text(), Some("again"));
        }
    }

    #[tokio::test]
    async fn error_turn_is_a_retryable_transport_failure() {
        let gateway = ScriptedGateway::new([ScriptedTurn::error("connection reset")]);
        let err = gateway.send(&[], &[]).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn parses_script_file() {
        let script = GatewayScript::from_json(
            r#"{
                "turns": [
                    {"tool_calls": [{"id": "c1", "name": "echo", "arguments": {"text": "hi"}}]},
                    {"text": "said hi"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(script.turns.len(), 2);
        assert!(!script.repeat_last);
        assert_eq!(script.turns[0].tool_calls[0].name, "echo");
    }
}
