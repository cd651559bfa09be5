//! Tool executor trait and closure-based tool wrapper.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use super::arguments::ToolArguments;
use super::types::{ToolDescriptor, ToolParameters};
use crate::error::FerryError;

/// Context available during tool execution.
///
/// Executors see only the call they are serving, never the conversation.
#[derive(Debug, Clone)]
pub struct ToolExecutionContext {
    pub tool_call_id: String,
    pub tool_name: String,
}

/// Capability that runs one tool. Implement to create custom tools.
///
/// Failures are reported through the `Err` side; the dispatcher turns them
/// into error results for the model instead of aborting the run.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn invoke(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, FerryError>;
}

type ToolHandler = dyn Fn(
        ToolArguments,
        ToolExecutionContext,
    ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, FerryError>> + Send>>
    + Send
    + Sync;

/// Executor backed by an async closure.
pub struct FnExecutor {
    handler: Arc<ToolHandler>,
}

impl FnExecutor {
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(ToolArguments, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, FerryError>> + Send + 'static,
    {
        Self {
            handler: Arc::new(move |args, ctx| Box::pin(handler(args, ctx))),
        }
    }
}

#[async_trait]
impl ToolExecutor for FnExecutor {
    async fn invoke(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, FerryError> {
        (self.handler)(args.clone(), ctx.clone()).await
    }
}

impl std::fmt::Debug for FnExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnExecutor").finish_non_exhaustive()
    }
}

/// A descriptor paired with its executor, ready for registration.
pub struct AgentTool {
    descriptor: ToolDescriptor,
    executor: Arc<dyn ToolExecutor>,
}

impl AgentTool {
    /// Create a tool from a closure.
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: ToolParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, FerryError>> + Send + 'static,
    {
        Self {
            descriptor: ToolDescriptor::new(name, description, parameters),
            executor: Arc::new(FnExecutor::new(handler)),
        }
    }

    /// Pair an existing executor with a descriptor.
    pub fn from_executor(descriptor: ToolDescriptor, executor: Arc<dyn ToolExecutor>) -> Self {
        Self {
            descriptor,
            executor,
        }
    }

    pub fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    pub fn into_parts(self) -> (ToolDescriptor, Arc<dyn ToolExecutor>) {
        (self.descriptor, self.executor)
    }
}

impl std::fmt::Debug for AgentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentTool")
            .field("name", &self.descriptor.name)
            .field("description", &self.descriptor.description)
            .finish()
    }
}
