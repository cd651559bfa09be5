//! Tool system: descriptors, executors, registry and dispatch.

pub mod arguments;
pub mod builtin;
pub mod dispatcher;
pub mod registry;
pub mod tool;
pub mod types;
pub mod validation;

pub use arguments::ToolArguments;
pub use dispatcher::ToolDispatcher;
pub use registry::{ResolvedTool, ToolRegistry};
pub use tool::{AgentTool, FnExecutor, ToolExecutionContext, ToolExecutor};
pub use types::{ParameterBuilder, ToolDescriptor, ToolParameters};
