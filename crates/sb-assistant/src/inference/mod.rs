//! Intent resolution.
//!
//! Turns a user message plus recent history into an [`Intent`]. Three
//! strategies sit behind the same trait:
//! - **Pattern** (local): capability router plus the declarative rule table.
//! - **LLM** (remote): structured `{agent, method, params}` output from a
//!   language model, validated against the requirement table.
//! - **Tiered**: pattern first, the model only for what patterns cannot place.

pub mod pattern;
pub mod structured;
pub mod tiered;

use async_trait::async_trait;
use sb_protocol::{Intent, ResolutionError};
use serde::Deserialize;

use crate::history::ConversationHistory;

pub use pattern::PatternResolver;
pub use structured::LlmResolver;
pub use tiered::TieredResolver;

/// Trait for strategies that turn a message into an intent.
#[async_trait]
pub trait IntentResolver: Send + Sync {
    /// Resolve `message`. `history` is read-only context; callers append
    /// the turn themselves once the message has been answered.
    async fn resolve(&self, message: &str, history: &ConversationHistory) -> Result<Intent, ResolutionError>;

    /// Name of this strategy (for logging).
    fn tier_name(&self) -> &str;
}

/// Resolver selection in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverMode {
    #[default]
    Pattern,
    Llm,
    Tiered,
}
