//! Shared test helpers: instrumented tools and event capture.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use ferry::agent_loop::{AgentEvent, AgentEventSink};
use ferry::error::FerryError;
use ferry::tools::{AgentTool, ToolExecutionContext, ToolParameters, ToolRegistry};

/// Records concurrency and completion order across instrumented tools.
#[derive(Debug, Default)]
pub struct Tracker {
    running: AtomicUsize,
    peak: AtomicUsize,
    invocations: AtomicUsize,
    completed: Mutex<Vec<String>>,
}

impl Tracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Tool call ids in the order their executors finished.
    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }

    fn enter(&self) {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self, tool_call_id: &str) {
        self.running.fetch_sub(1, Ordering::SeqCst);
        self.completed.lock().unwrap().push(tool_call_id.to_string());
    }
}

/// A tool that sleeps for its `delay_ms` argument, then returns `{ "tag": .. }`.
pub fn tracked_tool(name: &str, tracker: Arc<Tracker>) -> AgentTool {
    AgentTool::new(
        name,
        "Sleep, then echo the tag",
        ToolParameters::object()
            .integer("delay_ms", "How long to take", true)
            .string("tag", "Value to return", false)
            .build(),
        move |args, ctx: ToolExecutionContext| {
            let tracker = Arc::clone(&tracker);
            async move {
                tracker.enter();
                let delay = args.get_i64("delay_ms")?.max(0) as u64;
                tokio::time::sleep(Duration::from_millis(delay)).await;
                tracker.exit(&ctx.tool_call_id);
                Ok(json!({ "tag": args.get_str_opt("tag").unwrap_or(&ctx.tool_call_id) }))
            }
        },
    )
}

/// A tool that returns a constant payload.
pub fn constant_tool(name: &str, payload: serde_json::Value) -> AgentTool {
    AgentTool::new(
        name,
        "Return a fixed value",
        ToolParameters::empty(),
        move |_args, _ctx: ToolExecutionContext| {
            let payload = payload.clone();
            async move { Ok(payload) }
        },
    )
}

/// A tool whose executor always fails.
pub fn failing_tool(name: &str) -> AgentTool {
    AgentTool::new(
        name,
        "Always fails",
        ToolParameters::empty(),
        |_args, ctx: ToolExecutionContext| async move {
            Err(FerryError::tool(ctx.tool_name, "backend unavailable"))
        },
    )
}

/// A tool whose executor panics.
pub fn panicking_tool(name: &str) -> AgentTool {
    AgentTool::new(
        name,
        "Panics",
        ToolParameters::empty(),
        |_args, _ctx: ToolExecutionContext| async move {
            if true {
                panic!("tool exploded");
            }
            Ok(json!(null))
        },
    )
}

/// A tool that never finishes on its own.
pub fn hanging_tool(name: &str) -> AgentTool {
    AgentTool::new(
        name,
        "Never returns",
        ToolParameters::empty(),
        |_args, _ctx: ToolExecutionContext| async move {
            futures::future::pending::<()>().await;
            Ok(json!(null))
        },
    )
}

pub fn registry(tools: impl IntoIterator<Item = AgentTool>) -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    for tool in tools {
        registry.register_tool(tool).unwrap();
    }
    Arc::new(registry)
}

/// Collects emitted events for later inspection.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<AgentEvent>>>,
}

impl EventLog {
    pub fn sink(&self) -> AgentEventSink {
        let events = Arc::clone(&self.events);
        Arc::new(move |event| events.lock().unwrap().push(event))
    }

    pub fn events(&self) -> Vec<AgentEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Short names for the events, in emission order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events()
            .iter()
            .map(|event| match event {
                AgentEvent::RunStarted { .. } => "run_started",
                AgentEvent::RunFinished { .. } => "run_finished",
                AgentEvent::TurnStarted { .. } => "turn_started",
                AgentEvent::AssistantMessage { .. } => "assistant_message",
                AgentEvent::TurnEnd { .. } => "turn_end",
                AgentEvent::ToolExecutionStart { .. } => "tool_start",
                AgentEvent::ToolExecutionEnd { .. } => "tool_end",
            })
            .collect()
    }
}
