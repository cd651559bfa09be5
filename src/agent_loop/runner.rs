//! The agent orchestrator: a sequential model/tool state machine.

use std::collections::HashSet;
use std::sync::Arc;

use bon::Builder;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::conversation::ConversationLog;
use super::events::{AgentEvent, AgentEventEmitter, AgentEventSink};
use super::gateway::ModelGateway;
use super::types::{AgentOutcome, AgentRun, FailureKind, RunId, RunStats};
use crate::config::AgentConfig;
use crate::error::FerryError;
use crate::tools::{ToolDispatcher, ToolRegistry};
use crate::types::{Message, Role, ToolCallRequest};
use crate::util::retry::RetryPolicy;
use crate::util::timeout::with_timeout;

/// Input for a single run.
#[derive(Debug, Clone, Builder)]
pub struct RunRequest {
    /// The user's message.
    #[builder(into)]
    pub prompt: String,
    /// Optional system prompt placed before the user message.
    #[builder(into)]
    pub system: Option<String>,
    /// Caller-chosen run id; a fresh v4 id otherwise.
    pub run_id: Option<RunId>,
}

impl RunRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self::builder().prompt(prompt).build()
    }
}

#[derive(Debug)]
enum RunState {
    Init,
    AwaitingModel,
    ExecutingTools(Vec<ToolCallRequest>),
    Done(AgentOutcome),
}

#[derive(Debug, Clone, Copy)]
enum Interrupt {
    Cancelled,
    DeadlineExceeded,
}

/// Cancellation token plus the optional run deadline.
struct RunGuard {
    cancel: CancellationToken,
    deadline: Option<Instant>,
    run_timeout_ms: Option<u64>,
}

impl RunGuard {
    fn new(cancel: CancellationToken, config: &AgentConfig) -> Self {
        Self {
            cancel,
            deadline: config.run_timeout().map(|timeout| Instant::now() + timeout),
            run_timeout_ms: config.run_timeout_ms,
        }
    }

    fn check(&self) -> Option<Interrupt> {
        if self.cancel.is_cancelled() {
            Some(Interrupt::Cancelled)
        } else if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            Some(Interrupt::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Resolves once the run has been cancelled or its deadline has passed.
    async fn interrupted(&self) -> Interrupt {
        match self.deadline {
            Some(deadline) => tokio::select! {
                _ = self.cancel.cancelled() => Interrupt::Cancelled,
                _ = tokio::time::sleep_until(deadline) => Interrupt::DeadlineExceeded,
            },
            None => {
                self.cancel.cancelled().await;
                Interrupt::Cancelled
            }
        }
    }

    fn outcome(&self, interrupt: Interrupt) -> AgentOutcome {
        let detail = match interrupt {
            Interrupt::Cancelled => "run cancelled by caller".to_string(),
            Interrupt::DeadlineExceeded => format!(
                "run deadline of {}ms exceeded",
                self.run_timeout_ms.unwrap_or_default()
            ),
        };
        AgentOutcome::failure(FailureKind::Cancelled, detail)
    }
}

/// Drives a model gateway through tool calls until it answers.
///
/// One orchestrator can serve many runs; each run owns its own
/// [`ConversationLog`] and never shares it with another run.
pub struct AgentOrchestrator {
    gateway: Arc<dyn ModelGateway>,
    registry: Arc<ToolRegistry>,
    config: AgentConfig,
    retry: RetryPolicy,
    emitter: AgentEventEmitter,
}

impl AgentOrchestrator {
    /// Build an orchestrator, rejecting configurations that could never
    /// finish a run.
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        registry: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Result<Self, FerryError> {
        config.validate()?;
        Ok(Self {
            gateway,
            registry,
            retry: RetryPolicy::from(&config.retry),
            config,
            emitter: AgentEventEmitter::default(),
        })
    }

    /// Receive [`AgentEvent`]s for every run of this orchestrator.
    pub fn with_event_sink(mut self, sink: AgentEventSink) -> Self {
        self.emitter = AgentEventEmitter::new(Some(sink));
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run to a terminal state.
    pub async fn run(&self, request: RunRequest) -> AgentRun {
        self.run_with_cancel(request, CancellationToken::new()).await
    }

    /// Run to a terminal state, ending early with
    /// [`FailureKind::Cancelled`] once `cancel` fires.
    ///
    /// Cancellation is observed at the gateway call (including retry
    /// backoff) and during a tool batch. An interrupted batch is dropped
    /// whole: its in-flight calls are cancelled and none of its results
    /// reach the log.
    pub async fn run_with_cancel(
        &self,
        request: RunRequest,
        cancel: CancellationToken,
    ) -> AgentRun {
        let run_id = request.run_id.unwrap_or_else(Uuid::new_v4);
        let guard = RunGuard::new(cancel, &self.config);
        let dispatcher = ToolDispatcher::from_config(Arc::clone(&self.registry), &self.config)
            .with_emitter(self.emitter.clone());

        let mut log = ConversationLog::default();
        let mut stats = RunStats::default();
        let mut state = RunState::Init;

        self.emitter.emit(AgentEvent::RunStarted { run_id });
        tracing::debug!(
            %run_id,
            max_iterations = self.config.max_iterations,
            tools = self.registry.len(),
            "ferry run started"
        );

        let outcome = loop {
            if matches!(state, RunState::AwaitingModel | RunState::ExecutingTools(_)) {
                if let Some(interrupt) = guard.check() {
                    state = RunState::Done(guard.outcome(interrupt));
                }
            }

            state = match state {
                RunState::Init => {
                    log = ConversationLog::seeded(request.system.as_deref(), &request.prompt);
                    RunState::AwaitingModel
                }
                RunState::AwaitingModel => {
                    self.await_model(run_id, &guard, &mut log, &mut stats).await
                }
                RunState::ExecutingTools(calls) => {
                    self.execute_tools(run_id, &dispatcher, calls, &guard, &mut log, &mut stats)
                        .await
                }
                RunState::Done(outcome) => break outcome,
            };
        };

        match &outcome {
            AgentOutcome::FinalAnswer { .. } => tracing::info!(
                %run_id,
                iterations = stats.iterations,
                gateway_calls = stats.gateway_calls,
                tool_calls = stats.tool_calls,
                "ferry run completed"
            ),
            AgentOutcome::Failure(failure) => tracing::info!(
                %run_id,
                kind = %failure.kind,
                detail = %failure.detail,
                iterations = stats.iterations,
                "ferry run failed"
            ),
        }
        self.emitter.emit(AgentEvent::RunFinished {
            run_id,
            outcome: outcome.clone(),
        });

        AgentRun {
            run_id,
            outcome,
            log,
            stats,
        }
    }

    async fn await_model(
        &self,
        run_id: RunId,
        guard: &RunGuard,
        log: &mut ConversationLog,
        stats: &mut RunStats,
    ) -> RunState {
        let turn_index = stats.iterations;
        stats.gateway_calls += 1;
        self.emitter.emit(AgentEvent::TurnStarted {
            run_id,
            turn_index,
        });
        tracing::debug!(%run_id, turn_index, messages = log.len(), "calling model gateway");

        let mut attempts = 0usize;
        let response = {
            let messages = log.messages();
            let tools = self.registry.descriptors();
            let timeout = self.config.gateway_timeout();
            let call = self.retry.execute(|| {
                attempts += 1;
                with_timeout(timeout, self.gateway.send(messages, tools))
            });
            tokio::select! {
                biased;
                interrupt = guard.interrupted() => Err(interrupt),
                result = call => Ok(result),
            }
        };
        stats.gateway_attempts += attempts;

        match response {
            Err(interrupt) => RunState::Done(guard.outcome(interrupt)),
            Ok(Err(error)) => {
                tracing::warn!(
                    %run_id,
                    attempts,
                    retryable = error.is_retryable(),
                    error = %error,
                    "model gateway unavailable"
                );
                RunState::Done(AgentOutcome::failure(
                    FailureKind::GatewayUnavailable,
                    format!("gateway failed after {attempts} attempt(s): {error}"),
                ))
            }
            Ok(Ok(message)) => self.accept_response(run_id, message, log),
        }
    }

    fn accept_response(
        &self,
        run_id: RunId,
        message: Message,
        log: &mut ConversationLog,
    ) -> RunState {
        if let Err(error) = check_response(&message) {
            tracing::warn!(%run_id, error = %error, "malformed gateway response");
            return RunState::Done(AgentOutcome::failure(
                FailureKind::MalformedResponse,
                error.to_string(),
            ));
        }

        self.emitter.emit(AgentEvent::AssistantMessage {
            run_id,
            message: message.clone(),
        });

        if message.has_tool_calls() {
            let calls = message.tool_calls.clone();
            log.push_assistant(message);
            return RunState::ExecutingTools(calls);
        }

        let text = message.text().unwrap_or_default().to_string();
        log.push_assistant(message);
        RunState::Done(AgentOutcome::final_answer(text))
    }

    async fn execute_tools(
        &self,
        run_id: RunId,
        dispatcher: &ToolDispatcher,
        calls: Vec<ToolCallRequest>,
        guard: &RunGuard,
        log: &mut ConversationLog,
        stats: &mut RunStats,
    ) -> RunState {
        let turn_index = stats.iterations;
        stats.dispatch_calls += 1;
        tracing::debug!(%run_id, turn_index, tool_calls = calls.len(), "dispatching tool calls");

        let results = tokio::select! {
            biased;
            interrupt = guard.interrupted() => {
                tracing::debug!(%run_id, turn_index, "tool batch interrupted");
                return RunState::Done(guard.outcome(interrupt));
            }
            results = dispatcher.dispatch(&calls) => results,
        };

        stats.tool_calls += results.len();
        stats.tool_failures += results.iter().filter(|result| result.is_error()).count();
        stats.iterations += 1;
        log.push_tool_results(&results);
        self.emitter.emit(AgentEvent::TurnEnd {
            run_id,
            turn_index,
            tool_results: results,
        });

        if stats.iterations >= self.config.max_iterations {
            tracing::warn!(
                %run_id,
                max_iterations = self.config.max_iterations,
                "iteration limit reached"
            );
            return RunState::Done(AgentOutcome::failure(
                FailureKind::MaxIterationsExceeded,
                format!(
                    "no final answer after {} tool iterations",
                    self.config.max_iterations
                ),
            ));
        }
        RunState::AwaitingModel
    }
}

impl std::fmt::Debug for AgentOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentOrchestrator")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Structural checks on a gateway reply before it touches the log.
fn check_response(message: &Message) -> Result<(), FerryError> {
    let malformed = |reason: String| Err(FerryError::MalformedResponse(reason));

    if message.role != Role::Assistant {
        return malformed(format!(
            "expected an assistant message, got role '{}'",
            message.role
        ));
    }

    let mut seen = HashSet::new();
    for call in &message.tool_calls {
        if call.id.trim().is_empty() {
            return malformed(format!("tool call for '{}' has an empty id", call.name));
        }
        if !seen.insert(call.id.as_str()) {
            return malformed(format!("duplicate tool call id '{}'", call.id));
        }
    }

    if !message.has_tool_calls() && message.text().is_none() {
        return malformed("response carried neither text nor tool calls".to_string());
    }
    Ok(())
}
