//! Language-model backends for the structured resolver.
//!
//! The resolver only needs "prompt in, text out", so every provider sits
//! behind [`LanguageModel`]. Two HTTP providers are supported: an
//! OpenAI-compatible chat-completions endpoint and a local Ollama server.

pub mod mock;
pub mod ollama;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::LlmError;

pub use mock::MockLanguageModel;
pub use ollama::OllamaModel;
pub use openai::OpenAiModel;

/// Instruction sent as the system message by every provider.
pub const SYSTEM_PROMPT: &str =
    "אתה מנתח פקודות של מערכת ניהול חנות. ענה אך ורק באובייקט JSON אחד, ללא טקסט נוסף.";

/// A chat model that turns one prompt into one completion.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Provider name, for logging.
    fn provider(&self) -> &str;
}

/// Which HTTP API to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Ollama,
}

/// Language-model settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: Provider,
    /// API base URL. Defaults per provider when unset.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Read from `OPENAI_API_KEY`, never from the file.
    #[serde(skip)]
    pub api_key: Option<SecretString>,
}

fn default_provider() -> Provider {
    Provider::OpenAi
}
fn default_model() -> String {
    "gpt-4".into()
}
fn default_timeout_secs() -> u64 {
    20
}
fn default_temperature() -> f32 {
    0.2
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: None,
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            api_key: None,
        }
    }
}

impl LlmConfig {
    /// Base URL with the provider default applied and trailing slashes removed.
    pub fn endpoint(&self) -> String {
        let base = match (&self.base_url, self.provider) {
            (Some(url), _) if !url.trim().is_empty() => url.trim(),
            (_, Provider::OpenAi) => "https://api.openai.com/v1",
            (_, Provider::Ollama) => "http://localhost:11434",
        };
        base.trim_end_matches('/').to_string()
    }

    /// Overlay `OPENAI_API_KEY` and `LLM_MODEL` from the environment.
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| var(name).filter(|v| !v.trim().is_empty());
        if let Some(key) = var("OPENAI_API_KEY") {
            self.api_key = Some(SecretString::from(key));
        }
        if let Some(model) = var("LLM_MODEL") {
            self.model = model;
        }
    }
}

/// Build the configured backend.
pub fn from_config(config: &LlmConfig) -> Result<Arc<dyn LanguageModel>, LlmError> {
    let model: Arc<dyn LanguageModel> = match config.provider {
        Provider::OpenAi => Arc::new(OpenAiModel::new(config.clone())?),
        Provider::Ollama => Arc::new(OllamaModel::new(config.clone())?),
    };
    Ok(model)
}

/// Map a reqwest failure, keeping timeouts distinguishable.
pub(crate) fn request_error(error: reqwest::Error, timeout_secs: u64) -> LlmError {
    if error.is_timeout() {
        LlmError::Timeout(timeout_secs)
    } else {
        LlmError::Request(error.to_string())
    }
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LlmError::Request(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn config_defaults() {
        let config = LlmConfig::default();
        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.timeout_secs, 20);
        assert_eq!(config.endpoint(), "https://api.openai.com/v1");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn config_from_toml() {
        let config: LlmConfig = toml::from_str(
            r#"
provider = "ollama"
model = "llama3"
base_url = "http://10.0.0.5:11434/"
temperature = 0.0
"#,
        )
        .unwrap();
        assert_eq!(config.provider, Provider::Ollama);
        assert_eq!(config.endpoint(), "http://10.0.0.5:11434");
        assert_eq!(config.model, "llama3");
        assert_eq!(config.timeout_secs, 20);
    }

    #[test]
    fn ollama_default_endpoint() {
        let config = LlmConfig {
            provider: Provider::Ollama,
            ..LlmConfig::default()
        };
        assert_eq!(config.endpoint(), "http://localhost:11434");
    }

    #[test]
    fn env_overlay() {
        let mut config = LlmConfig::default();
        config.apply_vars(|name| match name {
            "OPENAI_API_KEY" => Some("sk-test".into()),
            "LLM_MODEL" => Some(" ".into()),
            _ => None,
        });
        assert_eq!(config.api_key.as_ref().unwrap().expose_secret(), "sk-test");
        assert_eq!(config.model, "gpt-4");
    }

    #[test]
    fn openai_without_key_fails_to_build() {
        let err = from_config(&LlmConfig::default()).err().unwrap();
        assert!(matches!(err, LlmError::MissingApiKey { .. }));
    }
}
