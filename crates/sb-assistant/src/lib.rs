//! Storebot assistant core: turns Hebrew store-management messages into
//! validated operations and runs them against the store.
//!
//! Re-exports the building blocks so the chat API and end-to-end tests can
//! wire an [`Assistant`] with their own gateway or language model.

pub mod assistant;
pub mod backend;
pub mod config;
pub mod console;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod history;
pub mod inference;
pub mod messages;
pub mod requirements;
pub mod router;

pub use assistant::{Assistant, Session};
pub use backend::{LanguageModel, LlmConfig};
pub use config::AssistantConfig;
pub use dispatch::DispatchTable;
pub use error::{BuildError, ConfigError, LlmError, MessagesError};
pub use history::ConversationHistory;
pub use inference::{IntentResolver, ResolverMode};
pub use messages::MessageCatalog;
