//! Built-in demonstration tools.
//!
//! Small, dependency-free tools used by the `ferry` CLI and handy for
//! exercising a gateway integration: `echo`, `current_time` and `sleep`.
//!
//! # Usage
//!
//! ```rust
//! use ferry::tools::{builtin, ToolRegistry};
//!
//! let mut registry = ToolRegistry::new();
//! for tool in builtin::all_tools() {
//!     registry.register_tool(tool).unwrap();
//! }
//! assert_eq!(registry.len(), 3);
//! ```

use std::time::Duration;

use chrono::{FixedOffset, SecondsFormat, Utc};

use crate::error::FerryError;
use crate::tools::tool::{AgentTool, ToolExecutionContext};
use crate::tools::types::ToolParameters;

const SLEEP_MAX_MS: i64 = 60_000;

/// `echo`: returns its `text` argument unchanged.
pub fn echo_tool() -> AgentTool {
    AgentTool::new(
        "echo",
        "Return the given text unchanged",
        ToolParameters::object()
            .string("text", "Text to echo back", true)
            .build(),
        |args, _ctx: ToolExecutionContext| async move {
            let text = args.get_str("text")?;
            Ok(serde_json::Value::String(text.to_string()))
        },
    )
}

/// `current_time`: the current time as RFC 3339, optionally shifted by a
/// UTC offset in minutes.
pub fn current_time_tool() -> AgentTool {
    AgentTool::new(
        "current_time",
        "Get the current date and time",
        ToolParameters::object()
            .integer(
                "utc_offset_minutes",
                "Offset from UTC in minutes (default 0)",
                false,
            )
            .build(),
        |args, _ctx: ToolExecutionContext| async move {
            let minutes = args.get_i64_opt("utc_offset_minutes").unwrap_or(0);
            let offset = i32::try_from(minutes)
                .ok()
                .and_then(|m| m.checked_mul(60))
                .and_then(FixedOffset::east_opt)
                .ok_or_else(|| {
                    FerryError::InvalidArgument(format!(
                        "utc_offset_minutes out of range: {minutes}"
                    ))
                })?;
            let now = Utc::now().with_timezone(&offset);
            Ok(serde_json::json!({
                "time": now.to_rfc3339_opts(SecondsFormat::Secs, true),
                "unix": now.timestamp(),
            }))
        },
    )
}

/// `sleep`: waits `ms` milliseconds (capped at one minute), then reports
/// how long it slept.
pub fn sleep_tool() -> AgentTool {
    AgentTool::new(
        "sleep",
        "Wait for a number of milliseconds",
        ToolParameters::object()
            .integer("ms", "Milliseconds to wait", true)
            .build(),
        |args, ctx: ToolExecutionContext| async move {
            let ms = args.get_i64("ms")?;
            if !(0..=SLEEP_MAX_MS).contains(&ms) {
                return Err(FerryError::tool(
                    ctx.tool_name,
                    format!("ms must be between 0 and {SLEEP_MAX_MS}"),
                ));
            }
            let ms = ms as u64;
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(serde_json::json!({ "slept_ms": ms }))
        },
    )
}

/// Every built-in tool, in a stable order.
pub fn all_tools() -> Vec<AgentTool> {
    vec![echo_tool(), current_time_tool(), sleep_tool()]
}
