//! Ferry CLI binary entry point.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ferry::agent_loop::{
    AgentEvent, AgentOrchestrator, AgentOutcome, GatewayScript, RunRequest, ScriptedGateway,
};
use ferry::cli::{Cli, Commands, ReplayArgs};
use ferry::config::AgentConfig;
use ferry::tools::{builtin, ToolRegistry};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ferry=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Replay(args) => handle_replay(args).await,
        Commands::Tools => handle_tools(),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn builtin_registry() -> ferry::error::Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    for tool in builtin::all_tools() {
        registry.register_tool(tool)?;
    }
    Ok(registry)
}

fn handle_tools() -> Result<bool, Box<dyn std::error::Error>> {
    let registry = builtin_registry()?;
    println!("{}", serde_json::to_string_pretty(registry.descriptors())?);
    Ok(true)
}

async fn handle_replay(args: ReplayArgs) -> Result<bool, Box<dyn std::error::Error>> {
    let mut config = AgentConfig::load_layered(args.config.as_deref())?;
    if let Some(max) = args.max_iterations {
        config = config.with_max_iterations(max);
    }
    if let Some(max) = args.max_concurrent_tools {
        config = config.with_max_concurrent_tools(max);
    }
    if let Some(ms) = args.tool_timeout_ms {
        config = config.with_per_call_timeout(Duration::from_millis(ms));
    }

    let script = GatewayScript::from_json(&std::fs::read_to_string(&args.script)?)?;
    let gateway = Arc::new(ScriptedGateway::from_script(script));

    // Stream events to terminal
    let sink = Arc::new(|event: AgentEvent| match &event {
        AgentEvent::ToolExecutionStart {
            tool_call_id,
            tool_name,
            ..
        } => eprintln!("⚡ {tool_name} ({tool_call_id})"),
        AgentEvent::ToolExecutionEnd {
            result, is_error, ..
        } => {
            let output = truncate(&result.to_content(), 200);
            if *is_error {
                eprintln!("  ❌ {output}");
            } else {
                eprintln!("  ✅ {output}");
            }
        }
        _ => {}
    });

    let orchestrator = AgentOrchestrator::new(gateway, Arc::new(builtin_registry()?), config)?
        .with_event_sink(sink);

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let mut request = RunRequest::new(args.prompt);
    request.system = args.system;
    let run = orchestrator.run_with_cancel(request, cancel).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run.outcome)?);
    } else {
        match &run.outcome {
            AgentOutcome::FinalAnswer { text } => println!("{text}"),
            AgentOutcome::Failure(failure) => eprintln!("❌ {failure}"),
        }
    }
    Ok(run.outcome.is_success())
}

fn truncate(output: &str, max: usize) -> String {
    if output.len() <= max {
        return output.to_string();
    }
    // Find a valid UTF-8 char boundary at or before max
    let mut end = max;
    while end > 0 && !output.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &output[..end])
}
