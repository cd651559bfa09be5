//! Error types for Ferry.

use thiserror::Error;

/// Primary error type for all Ferry operations.
#[derive(Error, Debug)]
pub enum FerryError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Invalid tool name: {0}")]
    InvalidToolName(String),

    #[error("Malformed gateway response: {0}")]
    MalformedResponse(String),

    #[error("Invalid conversation: {0}")]
    InvalidConversation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    RateLimit,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Serialization,
    ToolExecution,
    Protocol,
    Unknown,
}

impl FerryError {
    /// Create an API error from an HTTP-style status.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a transport-level gateway error.
    pub fn gateway(message: impl Into<String>) -> Self {
        Self::Gateway(message.into())
    }

    /// Create a tool execution error.
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Gateway(_) | Self::Io(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Configuration(_) | Self::ConfigParse(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::ToolExecution { .. } | Self::InvalidArgument(_) => ErrorCategory::ToolExecution,
            Self::MalformedResponse(_) | Self::InvalidConversation(_) => ErrorCategory::Protocol,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Whether this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit
                | ErrorCategory::Network
                | ErrorCategory::Timeout
                | ErrorCategory::Server
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, FerryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_are_retryable() {
        assert!(FerryError::gateway("connection reset").is_retryable());
        assert!(FerryError::Timeout(500).is_retryable());
        assert!(FerryError::RateLimited { retry_after_ms: None }.is_retryable());
        assert!(FerryError::api(503, "unavailable").is_retryable());
        assert!(FerryError::api(429, "slow down").is_retryable());
    }

    #[test]
    fn client_and_protocol_failures_are_not_retryable() {
        assert!(!FerryError::api(401, "bad key").is_retryable());
        assert!(!FerryError::MalformedResponse("empty".into()).is_retryable());
        assert!(!FerryError::InvalidState("script exhausted".into()).is_retryable());
        assert!(!FerryError::Configuration("max_iterations".into()).is_retryable());
    }

    #[test]
    fn api_status_maps_to_category() {
        assert_eq!(FerryError::api(500, "x").category(), ErrorCategory::Server);
        assert_eq!(FerryError::api(400, "x").category(), ErrorCategory::Api);
        assert_eq!(
            FerryError::tool("lookup", "boom").category(),
            ErrorCategory::ToolExecution
        );
    }
}
