//! CLI definitions for the `ferry` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Ferry tool-use agent loop
#[derive(Parser, Debug)]
#[command(name = "ferry", version, about = "Ferry tool-use agent loop runner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the agent loop against a scripted gateway
    Replay(ReplayArgs),
    /// Print the built-in tool descriptors as JSON
    Tools,
}

/// Arguments for the `replay` subcommand.
#[derive(Parser, Debug)]
pub struct ReplayArgs {
    /// JSON gateway script (`{"turns": [...], "repeat_last": false}`)
    pub script: PathBuf,

    /// User prompt
    pub prompt: String,

    /// System prompt
    #[arg(short, long)]
    pub system: Option<String>,

    /// Config file (defaults to the platform config dir when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the iteration cap
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Override the number of tool calls run in parallel
    #[arg(long)]
    pub max_concurrent_tools: Option<usize>,

    /// Override the per-call tool timeout
    #[arg(long)]
    pub tool_timeout_ms: Option<u64>,

    /// Print the full outcome as JSON instead of the answer text
    #[arg(long)]
    pub json: bool,
}
