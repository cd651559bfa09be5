//! Core run types for the agent loop.

use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;
use uuid::Uuid;

use super::conversation::ConversationLog;

/// Unique run identifier.
pub type RunId = Uuid;

/// Why a run ended without an answer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    /// Gateway transport kept failing (or timed out) past the retry budget.
    GatewayUnavailable,
    /// Gateway returned neither text nor tool calls.
    MalformedResponse,
    /// The tool loop hit `max_iterations`.
    MaxIterationsExceeded,
    /// The caller cancelled the run or its deadline passed.
    Cancelled,
}

/// Structured run failure returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct AgentFailure {
    pub kind: FailureKind,
    pub detail: String,
}

impl AgentFailure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Terminal value of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentOutcome {
    FinalAnswer { text: String },
    Failure(AgentFailure),
}

impl AgentOutcome {
    pub fn final_answer(text: impl Into<String>) -> Self {
        Self::FinalAnswer { text: text.into() }
    }

    pub fn failure(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self::Failure(AgentFailure::new(kind, detail))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::FinalAnswer { .. })
    }

    pub fn answer(&self) -> Option<&str> {
        match self {
            Self::FinalAnswer { text } => Some(text),
            Self::Failure(_) => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::FinalAnswer { .. } => None,
            Self::Failure(failure) => Some(failure.kind),
        }
    }

    pub fn into_result(self) -> Result<String, AgentFailure> {
        match self {
            Self::FinalAnswer { text } => Ok(text),
            Self::Failure(failure) => Err(failure),
        }
    }
}

/// Bookkeeping collected while a run progresses.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunStats {
    /// Logical gateway calls (one per `AwaitingModel` visit).
    pub gateway_calls: usize,
    /// Gateway attempts including retries.
    pub gateway_attempts: usize,
    /// Tool batches handed to the dispatcher.
    pub dispatch_calls: usize,
    /// Completed model↔tool round trips.
    pub iterations: usize,
    pub tool_calls: usize,
    pub tool_failures: usize,
}

/// Everything a finished run hands back to its caller.
#[derive(Debug, Clone)]
pub struct AgentRun {
    pub run_id: RunId,
    pub outcome: AgentOutcome,
    pub log: ConversationLog,
    pub stats: RunStats,
}

impl AgentRun {
    pub fn into_result(self) -> Result<String, AgentFailure> {
        self.outcome.into_result()
    }
}
