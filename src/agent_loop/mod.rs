//! Agent loop: conversation log, model gateway, orchestrator and events.

pub mod conversation;
pub mod events;
pub mod gateway;
pub mod runner;
pub mod types;

pub use conversation::ConversationLog;
pub use events::{AgentEvent, AgentEventSink};
pub use gateway::{GatewayScript, ModelGateway, ScriptedGateway, ScriptedTurn};
pub use runner::{AgentOrchestrator, RunRequest};
pub use types::*;
