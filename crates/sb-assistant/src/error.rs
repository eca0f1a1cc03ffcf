//! Error types for the assistant core.

use std::path::PathBuf;

use sb_commerce::CommerceError;

/// Errors from a language-model backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("model returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("malformed backend response: {0}")]
    Decode(String),

    #[error("model returned no content")]
    EmptyContent,

    #[error("no API key configured for {provider}")]
    MissingApiKey { provider: String },
}

/// Errors loading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors loading a message template catalog.
#[derive(Debug, thiserror::Error)]
pub enum MessagesError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid message catalog: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Errors wiring an assistant together at startup.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Messages(#[from] MessagesError),

    #[error("commerce gateway: {0}")]
    Commerce(#[from] CommerceError),

    #[error("language model: {0}")]
    Llm(#[from] LlmError),

    #[error("extraction rule {operation} has an invalid pattern: {source}")]
    Pattern {
        operation: String,
        #[source]
        source: regex::Error,
    },
}
