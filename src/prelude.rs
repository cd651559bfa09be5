//! Convenience re-exports for common use.

pub use crate::agent_loop::{
    AgentFailure, AgentOrchestrator, AgentOutcome, AgentRun, ConversationLog, FailureKind,
    ModelGateway, RunRequest,
};
pub use crate::config::AgentConfig;
pub use crate::error::{FerryError, Result};
pub use crate::tools::{
    AgentTool, ToolArguments, ToolDescriptor, ToolDispatcher, ToolExecutor, ToolParameters,
    ToolRegistry,
};
pub use crate::types::{Message, Role, ToolCallRequest, ToolErrorKind, ToolResult};
