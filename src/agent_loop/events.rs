//! Run event stream types.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::{Message, ToolResult};

use super::types::{AgentOutcome, RunId};

/// Callback receiving agent events as they happen.
pub type AgentEventSink = Arc<dyn Fn(AgentEvent) + Send + Sync>;

/// Events emitted while a run progresses.
///
/// Tool events may interleave across calls of the same batch; everything
/// else arrives in state-machine order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    // -- Lifecycle --
    RunStarted {
        run_id: RunId,
    },
    RunFinished {
        run_id: RunId,
        outcome: AgentOutcome,
    },

    // -- Turn boundaries --
    TurnStarted {
        run_id: RunId,
        turn_index: usize,
    },
    AssistantMessage {
        run_id: RunId,
        message: Message,
    },
    TurnEnd {
        run_id: RunId,
        turn_index: usize,
        tool_results: Vec<ToolResult>,
    },

    // -- Tool execution --
    ToolExecutionStart {
        tool_call_id: String,
        tool_name: String,
        args: serde_json::Value,
    },
    ToolExecutionEnd {
        tool_call_id: String,
        tool_name: String,
        result: ToolResult,
        is_error: bool,
    },
}

#[derive(Clone, Default)]
pub(crate) struct AgentEventEmitter {
    sink: Option<AgentEventSink>,
}

impl AgentEventEmitter {
    pub(crate) fn new(sink: Option<AgentEventSink>) -> Self {
        Self { sink }
    }

    pub(crate) fn emit(&self, event: AgentEvent) {
        if let Some(sink) = &self.sink {
            (sink)(event);
        }
    }
}
