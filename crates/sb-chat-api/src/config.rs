//! Chat API server configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::state::ConversationLimits;

/// Listen address, conversation bounds and where to find the assistant's
/// own config.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Listen address (e.g., "0.0.0.0").
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Assistant TOML file. Without one the server runs against the
    /// in-memory sample store.
    pub assistant_config: Option<PathBuf>,
    /// Directory image uploads must come from, unless the assistant config
    /// names its own.
    pub upload_dir: PathBuf,
    /// Seconds of inactivity before a conversation is dropped.
    pub conversation_ttl_secs: u64,
    /// Live conversations kept at most.
    pub max_conversations: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("/var/lib/storebot/uploads")
}

impl ApiConfig {
    /// Load config from `HOST`, `PORT`, `ASSISTANT_CONFIG`, `UPLOAD_DIR`,
    /// `CONVERSATION_TTL_SECS` and `MAX_CONVERSATIONS`.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| var(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: var("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
            assistant_config: var("ASSISTANT_CONFIG").map(PathBuf::from),
            upload_dir: var("UPLOAD_DIR").map(PathBuf::from).unwrap_or(defaults.upload_dir),
            conversation_ttl_secs: var("CONVERSATION_TTL_SECS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|&secs| secs > 0)
                .unwrap_or(defaults.conversation_ttl_secs),
            max_conversations: var("MAX_CONVERSATIONS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|&max| max > 0)
                .unwrap_or(defaults.max_conversations),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn limits(&self) -> ConversationLimits {
        ConversationLimits {
            idle_ttl: Duration::from_secs(self.conversation_ttl_secs),
            max_conversations: self.max_conversations,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            assistant_config: None,
            upload_dir: default_upload_dir(),
            conversation_ttl_secs: 3600,
            max_conversations: 10_000,
        }
    }
}
