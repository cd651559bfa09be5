//! Execute one assistant turn's tool calls.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::{future, FutureExt};
use tokio::sync::Semaphore;

use super::arguments::{normalize_arguments, ToolArguments};
use super::registry::ToolRegistry;
use super::tool::ToolExecutionContext;
use super::validation::validate_arguments;
use crate::agent_loop::events::{AgentEvent, AgentEventEmitter, AgentEventSink};
use crate::config::AgentConfig;
use crate::error::FerryError;
use crate::types::{ToolCallRequest, ToolError, ToolErrorKind, ToolResult};

/// Resolves, validates and runs a batch of tool calls.
///
/// Every request yields exactly one result, in request order. Unknown
/// tools, invalid arguments, executor errors, panics and timeouts are all
/// reported as error results for the affected call only.
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    max_concurrent_tools: usize,
    per_call_timeout: Duration,
    emitter: AgentEventEmitter,
}

impl ToolDispatcher {
    pub fn new(
        registry: Arc<ToolRegistry>,
        max_concurrent_tools: usize,
        per_call_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            max_concurrent_tools: max_concurrent_tools.max(1),
            per_call_timeout,
            emitter: AgentEventEmitter::default(),
        }
    }

    pub fn from_config(registry: Arc<ToolRegistry>, config: &AgentConfig) -> Self {
        Self::new(
            registry,
            config.max_concurrent_tools,
            config.per_call_timeout(),
        )
    }

    pub fn with_event_sink(mut self, sink: AgentEventSink) -> Self {
        self.emitter = AgentEventEmitter::new(Some(sink));
        self
    }

    pub(crate) fn with_emitter(mut self, emitter: AgentEventEmitter) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run a batch. At most `max_concurrent_tools` calls are in flight at
    /// once, and a call starts as soon as any slot frees up. Results come
    /// back in input order regardless of which call finishes first.
    pub async fn dispatch(&self, requests: &[ToolCallRequest]) -> Vec<ToolResult> {
        let slots = Semaphore::new(self.max_concurrent_tools);
        future::join_all(
            requests
                .iter()
                .map(|request| self.dispatch_one(request, &slots)),
        )
        .await
    }

    async fn dispatch_one(&self, request: &ToolCallRequest, slots: &Semaphore) -> ToolResult {
        // Permits are granted in request order; the semaphore is never closed.
        let Ok(_permit) = slots.acquire().await else {
            return ToolResult::failure(
                &request.id,
                ToolErrorKind::ExecutionError,
                "dispatcher shut down",
            );
        };

        self.emitter.emit(AgentEvent::ToolExecutionStart {
            tool_call_id: request.id.clone(),
            tool_name: request.name.clone(),
            args: request.arguments.clone(),
        });

        let result = self.execute(request).await;

        if let Some(error) = result.error() {
            tracing::warn!(
                tool_call_id = %request.id,
                tool = %request.name,
                kind = %error.kind,
                error = %error.message,
                "tool call failed"
            );
        }
        self.emitter.emit(AgentEvent::ToolExecutionEnd {
            tool_call_id: request.id.clone(),
            tool_name: request.name.clone(),
            result: result.clone(),
            is_error: result.is_error(),
        });
        result
    }

    async fn execute(&self, request: &ToolCallRequest) -> ToolResult {
        let tool = match self.registry.resolve(&request.name) {
            Ok(tool) => tool,
            Err(error) => return ToolResult::from_error(&request.id, error),
        };

        let arguments = match normalize_arguments(&request.arguments) {
            Ok(arguments) => arguments,
            Err(message) => {
                return ToolResult::failure(&request.id, ToolErrorKind::InvalidArguments, message)
            }
        };
        if let Err(message) =
            validate_arguments(&arguments, &tool.descriptor.parameter_schema.schema)
        {
            return ToolResult::failure(
                &request.id,
                ToolErrorKind::InvalidArguments,
                format!("Argument validation failed: {message}"),
            );
        }

        let args = ToolArguments::new(arguments);
        let ctx = ToolExecutionContext {
            tool_call_id: request.id.clone(),
            tool_name: request.name.clone(),
        };
        let invocation = AssertUnwindSafe(tool.executor.invoke(&args, &ctx)).catch_unwind();

        match tokio::time::timeout(self.per_call_timeout, invocation).await {
            Ok(Ok(Ok(payload))) => ToolResult::success(&request.id, payload),
            Ok(Ok(Err(error))) => ToolResult::from_error(&request.id, classify(error)),
            Ok(Err(panic)) => ToolResult::failure(
                &request.id,
                ToolErrorKind::ExecutionError,
                format!("Tool '{}' panicked: {}", request.name, panic_message(panic.as_ref())),
            ),
            Err(_) => ToolResult::failure(
                &request.id,
                ToolErrorKind::Timeout,
                format!(
                    "Tool '{}' timed out after {}ms",
                    request.name,
                    self.per_call_timeout.as_millis()
                ),
            ),
        }
    }
}

fn classify(error: FerryError) -> ToolError {
    match error {
        FerryError::InvalidArgument(message) => {
            ToolError::new(ToolErrorKind::InvalidArguments, message)
        }
        FerryError::Timeout(ms) => {
            ToolError::new(ToolErrorKind::Timeout, format!("timed out after {ms}ms"))
        }
        FerryError::ToolExecution { message, .. } => {
            ToolError::new(ToolErrorKind::ExecutionError, message)
        }
        other => ToolError::new(ToolErrorKind::ExecutionError, other.to_string()),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

impl std::fmt::Debug for ToolDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDispatcher")
            .field("registry", &self.registry)
            .field("max_concurrent_tools", &self.max_concurrent_tools)
            .field("per_call_timeout", &self.per_call_timeout)
            .finish()
    }
}
