//! Configuration system (layered: code > env > config file > defaults).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::FerryError;

pub const DEFAULT_MAX_ITERATIONS: usize = 10;
pub const DEFAULT_MAX_CONCURRENT_TOOLS: usize = 4;
pub const DEFAULT_PER_CALL_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_GATEWAY_TIMEOUT_MS: u64 = 60_000;

const MAX_ITERATIONS_ENV: &str = "FERRY_MAX_ITERATIONS";
const MAX_CONCURRENT_TOOLS_ENV: &str = "FERRY_MAX_CONCURRENT_TOOLS";
const TOOL_TIMEOUT_ENV: &str = "FERRY_TOOL_TIMEOUT_MS";
const GATEWAY_TIMEOUT_ENV: &str = "FERRY_GATEWAY_TIMEOUT_MS";
const RUN_TIMEOUT_ENV: &str = "FERRY_RUN_TIMEOUT_MS";
const RETRY_MAX_ATTEMPTS_ENV: &str = "FERRY_RETRY_MAX_ATTEMPTS";

/// Limits and timeouts for agent runs.
///
/// Durations are stored in milliseconds so config files stay readable:
///
/// ```toml
/// max_iterations = 8
/// max_concurrent_tools = 2
/// per_call_timeout_ms = 10000
///
/// [retry]
/// max_attempts = 5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Hard cap on model↔tool round trips.
    pub max_iterations: usize,
    /// Bound on parallel tool calls within one turn.
    pub max_concurrent_tools: usize,
    /// Deadline for each tool invocation.
    pub per_call_timeout_ms: u64,
    /// Deadline for each gateway attempt.
    pub gateway_timeout_ms: u64,
    /// Deadline for the whole run; `None` runs until a terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_timeout_ms: Option<u64>,
    /// Gateway retry policy.
    pub retry: RetrySettings,
}

/// Retry settings for gateway calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 30_000,
            multiplier: 2.0,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_concurrent_tools: DEFAULT_MAX_CONCURRENT_TOOLS,
            per_call_timeout_ms: DEFAULT_PER_CALL_TIMEOUT_MS,
            gateway_timeout_ms: DEFAULT_GATEWAY_TIMEOUT_MS,
            run_timeout_ms: None,
            retry: RetrySettings::default(),
        }
    }
}

impl AgentConfig {
    pub fn per_call_timeout(&self) -> Duration {
        Duration::from_millis(self.per_call_timeout_ms)
    }

    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_millis(self.gateway_timeout_ms)
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_ms.map(Duration::from_millis)
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_max_concurrent_tools(mut self, max_concurrent_tools: usize) -> Self {
        self.max_concurrent_tools = max_concurrent_tools;
        self
    }

    pub fn with_per_call_timeout(mut self, timeout: Duration) -> Self {
        self.per_call_timeout_ms = duration_ms(timeout);
        self
    }

    pub fn with_gateway_timeout(mut self, timeout: Duration) -> Self {
        self.gateway_timeout_ms = duration_ms(timeout);
        self
    }

    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout_ms = Some(duration_ms(timeout));
        self
    }

    pub fn with_retry(mut self, retry: RetrySettings) -> Self {
        self.retry = retry;
        self
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, FerryError> {
        Ok(toml::from_str(input)?)
    }

    /// Load a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FerryError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Platform config location, e.g. `~/.config/ferry/config.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "ferry", "ferry")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load the platform config file, or defaults when there is none.
    pub fn load_default() -> Result<Self, FerryError> {
        match Self::default_config_path().filter(|path| path.is_file()) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Defaults overlaid with environment variables.
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Resolve the full layering: defaults, then the config file (`path`, or
    /// the platform default when it exists), then the environment.
    pub fn load_layered(path: Option<&Path>) -> Result<Self, FerryError> {
        let base = match path {
            Some(path) => Self::load(path)?,
            None => Self::load_default()?,
        };
        let config = base.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Overlay `FERRY_*` environment variables (and a `.env` file if present).
    pub fn apply_env(self) -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary lookup. Unparsable or zero values are
    /// ignored.
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let positive = |key: &str| lookup(key).and_then(|value| parse_positive(&value));

        if let Some(value) = positive(MAX_ITERATIONS_ENV) {
            self.max_iterations = value as usize;
        }
        if let Some(value) = positive(MAX_CONCURRENT_TOOLS_ENV) {
            self.max_concurrent_tools = value as usize;
        }
        if let Some(value) = positive(TOOL_TIMEOUT_ENV) {
            self.per_call_timeout_ms = value;
        }
        if let Some(value) = positive(GATEWAY_TIMEOUT_ENV) {
            self.gateway_timeout_ms = value;
        }
        if let Some(value) = positive(RUN_TIMEOUT_ENV) {
            self.run_timeout_ms = Some(value);
        }
        if let Some(value) = positive(RETRY_MAX_ATTEMPTS_ENV) {
            self.retry.max_attempts = u32::try_from(value).unwrap_or(u32::MAX);
        }
        self
    }

    /// Reject limits that would make a run hang or never start.
    pub fn validate(&self) -> Result<(), FerryError> {
        let invalid = |message: &str| Err(FerryError::Configuration(message.to_string()));

        if self.max_iterations == 0 {
            return invalid("max_iterations must be at least 1");
        }
        if self.max_concurrent_tools == 0 {
            return invalid("max_concurrent_tools must be at least 1");
        }
        if self.per_call_timeout_ms == 0 {
            return invalid("per_call_timeout_ms must be positive");
        }
        if self.gateway_timeout_ms == 0 {
            return invalid("gateway_timeout_ms must be positive");
        }
        if self.run_timeout_ms == Some(0) {
            return invalid("run_timeout_ms must be positive when set");
        }
        if self.retry.max_attempts == 0 {
            return invalid("retry.max_attempts must be at least 1");
        }
        if self.retry.multiplier.is_nan() || self.retry.multiplier < 1.0 {
            return invalid("retry.multiplier must be at least 1.0");
        }
        Ok(())
    }
}

fn parse_positive(value: &str) -> Option<u64> {
    let parsed = value.trim().parse::<u64>().ok()?;
    if parsed == 0 {
        None
    } else {
        Some(parsed)
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
