//! Ferry: a tool-use agent loop
//!
//! Drives a language model through tool calls until it produces a final
//! answer. The model sits behind the [`agent_loop::ModelGateway`] trait and
//! tools behind [`tools::ToolExecutor`]; everything in between (argument
//! validation, bounded concurrent dispatch, retries, timeouts, iteration
//! limits, cancellation) lives here.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ferry::prelude::*;
//! use ferry::agent_loop::ScriptedGateway;
//!
//! # async fn example() -> ferry::error::Result<()> {
//! let mut registry = ToolRegistry::new();
//! registry.register_tool(ferry::tools::builtin::echo_tool())?;
//!
//! let gateway = Arc::new(ScriptedGateway::new(vec![Message::assistant("hi")]));
//! let orchestrator = AgentOrchestrator::new(gateway, Arc::new(registry), AgentConfig::default())?;
//!
//! let run = orchestrator.run(RunRequest::builder().prompt("Hello!").build()).await;
//! println!("{:?}", run.outcome);
//! # Ok(())
//! # }
//! ```

pub mod agent_loop;
pub mod config;
pub mod error;
pub mod prelude;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
