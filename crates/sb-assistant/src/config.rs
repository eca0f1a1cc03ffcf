//! Assistant configuration, loaded once from TOML and passed by reference.

use std::path::{Path, PathBuf};

use sb_commerce::CommerceConfig;
use serde::Deserialize;

use crate::backend::LlmConfig;
use crate::error::ConfigError;
use crate::history::DEFAULT_CAPACITY;
use crate::inference::ResolverMode;

/// Top-level configuration for the assistant.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantConfig {
    /// Append handler failure detail to user-facing error messages.
    #[serde(default)]
    pub debug: bool,
    /// YAML file overriding the built-in message templates.
    #[serde(default)]
    pub messages_path: Option<PathBuf>,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub commerce: CommerceConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Turns kept per conversation.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Recent turns rendered into the model prompt.
    #[serde(default = "default_prompt_turns")]
    pub prompt_turns: usize,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}
fn default_prompt_turns() -> usize {
    5
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            prompt_turns: default_prompt_turns(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub mode: ResolverMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_handler_timeout_secs")]
    pub handler_timeout_secs: u64,
}

fn default_handler_timeout_secs() -> u64 {
    30
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            handler_timeout_secs: default_handler_timeout_secs(),
        }
    }
}

impl AssistantConfig {
    /// Load config from a TOML file, then overlay secrets from the environment.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&contents)?;
        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.llm.apply_env();
        self.commerce.apply_env();
    }
}
