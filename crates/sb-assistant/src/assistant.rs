//! The assistant: one resolver, one dispatch table, one template store.
//!
//! An [`Assistant`] is built once at startup and shared. Each conversation
//! gets its own [`Session`], which owns the bounded history and is the only
//! thing mutated while a message is handled.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use sb_commerce::{CommerceError, CommerceGateway, ImageAssociator, MarketCatalog, WooCommerceGateway};
use sb_protocol::{ConversationTurn, DispatchError, ResolutionError};
use tokio::time::timeout;

use crate::backend::{self, LanguageModel};
use crate::config::AssistantConfig;
use crate::dispatch::{DEFAULT_HANDLER_TIMEOUT, DispatchTable};
use crate::error::BuildError;
use crate::fallback::fallback;
use crate::history::{ConversationHistory, DEFAULT_CAPACITY};
use crate::inference::{IntentResolver, LlmResolver, PatternResolver, ResolverMode, TieredResolver};
use crate::messages::MessageCatalog;

pub struct Assistant {
    resolver: Box<dyn IntentResolver>,
    dispatcher: DispatchTable,
    messages: MessageCatalog,
    images: Option<ImageAssociator>,
    debug: bool,
    history_capacity: usize,
}

impl Assistant {
    pub fn new(resolver: Box<dyn IntentResolver>, dispatcher: DispatchTable, messages: MessageCatalog) -> Self {
        Self {
            resolver,
            dispatcher,
            messages,
            images: None,
            debug: false,
            history_capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn with_images(mut self, images: ImageAssociator) -> Self {
        self.images = Some(images);
        self
    }

    /// Append failure detail to user-facing error messages.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Wire an assistant against the live store described by `config`.
    pub fn from_config(config: &AssistantConfig) -> Result<Self, BuildError> {
        let gateway: Arc<dyn CommerceGateway> = Arc::new(WooCommerceGateway::new(&config.commerce)?);
        Self::build(config, gateway, None)
    }

    /// Wire an assistant over an arbitrary gateway. When `model` is `None`
    /// and the resolver mode needs one, it is built from `config.llm`.
    pub fn build(
        config: &AssistantConfig,
        gateway: Arc<dyn CommerceGateway>,
        model: Option<Arc<dyn LanguageModel>>,
    ) -> Result<Self, BuildError> {
        let messages = MessageCatalog::load(config.messages_path.as_deref())?;

        let prompt_turns = config.history.prompt_turns;
        let resolver: Box<dyn IntentResolver> = match config.resolver.mode {
            ResolverMode::Pattern => Box::new(PatternResolver::new()?),
            ResolverMode::Llm => Box::new(LlmResolver::new(language_model(config, model)?, prompt_turns)),
            ResolverMode::Tiered => Box::new(TieredResolver::new(
                Box::new(PatternResolver::new()?),
                Box::new(LlmResolver::new(language_model(config, model)?, prompt_turns)),
            )),
        };

        let handler_timeout = match config.dispatch.handler_timeout_secs {
            0 => DEFAULT_HANDLER_TIMEOUT,
            secs => Duration::from_secs(secs),
        };
        let dispatcher = DispatchTable::with_commerce(
            gateway.clone(),
            MarketCatalog::default(),
            config.commerce.max_products_fetch,
            handler_timeout,
        );

        tracing::info!(
            resolver = resolver.tier_name(),
            handler_timeout_secs = handler_timeout.as_secs(),
            debug = config.debug,
            "assistant ready"
        );

        let mut images = ImageAssociator::new(gateway);
        if let Some(dir) = &config.commerce.upload_dir {
            images = images.with_upload_dir(dir.clone());
        }

        Ok(Self::new(resolver, dispatcher, messages)
            .with_images(images)
            .with_debug(config.debug)
            .with_history_capacity(config.history.capacity))
    }

    pub fn messages(&self) -> &MessageCatalog {
        &self.messages
    }

    pub fn resolver_name(&self) -> &str {
        self.resolver.tier_name()
    }

    /// Start a conversation with an empty history.
    pub fn session(self: &Arc<Self>) -> Session {
        Session {
            assistant: Arc::clone(self),
            history: ConversationHistory::new(self.history_capacity),
        }
    }

    /// Answer one message against `history`.
    ///
    /// Never fails: every error becomes a Hebrew reply. A turn is recorded
    /// whenever an operation was identified, including when it failed or
    /// still needs parameters, so a follow-up can refer back to it.
    pub async fn respond(&self, message: &str, history: &mut ConversationHistory) -> String {
        let message = message.trim();
        if message.is_empty() {
            return fallback(&self.messages, None);
        }

        let intent = match self.resolver.resolve(message, history).await {
            Ok(intent) => intent,
            Err(e) => {
                tracing::info!(tier = self.resolver.tier_name(), kind = e.kind().as_str(), error = %e, "message not resolved");
                let reply = self.resolution_reply(&e);
                if let ResolutionError::MissingParameters { operation, .. } = &e {
                    history.push(ConversationTurn::new(message, reply.clone(), Some(*operation)));
                }
                return reply;
            }
        };

        tracing::info!(
            tier = self.resolver.tier_name(),
            operation = %intent.operation,
            source = intent.source.as_str(),
            "intent resolved"
        );

        let reply = match self.dispatcher.dispatch(&intent).await {
            Ok(reply) if reply.trim().is_empty() => self.messages.status("success"),
            Ok(reply) => reply,
            Err(e) => self.dispatch_reply(&e),
        };
        history.push(ConversationTurn::new(message, reply.clone(), Some(intent.operation)));
        reply
    }

    /// Attach the image at `path` to the product named `product_name`.
    pub async fn associate_image(&self, product_name: &str, path: &Path, history: &mut ConversationHistory) -> String {
        let product_name = product_name.trim();
        if product_name.is_empty() {
            return self.messages.error("missing_parameters", &[("missing", "product_name")]);
        }
        let Some(images) = &self.images else {
            tracing::warn!("image association requested but no store is connected");
            return self.messages.error("general_error", &[]);
        };

        let reply = match timeout(self.dispatcher.timeout(), images.associate(path, product_name)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(CommerceError::NotFound { item })) => self.messages.error("not_found", &[("item", item.as_str())]),
            Ok(Err(CommerceError::UnsupportedImage(file))) => {
                self.messages.error("unsupported_image", &[("file", file.as_str())])
            }
            Ok(Err(CommerceError::PermissionDenied(detail))) => {
                self.with_detail(self.messages.error("permission_denied", &[]), &detail)
            }
            Ok(Err(e)) => {
                tracing::error!(product = product_name, path = %path.display(), error = %e, "image association failed");
                self.with_detail(self.messages.error("general_error", &[]), &e.to_string())
            }
            Err(_) => {
                tracing::error!(product = product_name, path = %path.display(), "image association timed out");
                let detail = format!("timed out after {}s", self.dispatcher.timeout().as_secs());
                self.with_detail(self.messages.error("general_error", &[]), &detail)
            }
        };
        history.push(ConversationTurn::new(
            format!("שיוך תמונה {} למוצר {product_name}", path.display()),
            reply.clone(),
            None,
        ));
        reply
    }

    fn resolution_reply(&self, error: &ResolutionError) -> String {
        let m = &self.messages;
        match error {
            ResolutionError::UnresolvedDomain => {
                format!("{}\n\n{}", m.error("unresolved_domain", &[]), fallback(m, None))
            }
            ResolutionError::NoMatchingOperation { domain } => fallback(m, Some(*domain)),
            ResolutionError::UnrecognizedOperation { hint, .. } => {
                m.error("unrecognized_operation", &[("hint", hint.as_str())])
            }
            ResolutionError::InvalidFormat { reason } => {
                self.with_detail(m.error("invalid_format", &[]), reason)
            }
            ResolutionError::MissingParameters { missing, .. } => {
                m.error("missing_parameters", &[("missing", missing.join(", ").as_str())])
            }
            ResolutionError::CapabilityNotFound { domain, operation } => {
                m.error("capability_not_found", &[("domain", domain.as_str()), ("operation", operation.as_str())])
            }
            ResolutionError::Backend(detail) => self.with_detail(m.error("agent_error", &[]), detail),
        }
    }

    fn dispatch_reply(&self, error: &DispatchError) -> String {
        let m = &self.messages;
        match error {
            DispatchError::MissingParameters { missing, .. } => {
                m.error("missing_parameters", &[("missing", missing.join(", ").as_str())])
            }
            DispatchError::CapabilityNotFound { domain, operation } => m.error(
                "capability_not_found",
                &[("domain", domain.as_str()), ("operation", operation.name())],
            ),
            DispatchError::NotFound { item } => m.error("not_found", &[("item", item.as_str())]),
            DispatchError::PermissionDenied { detail } => self.with_detail(m.error("permission_denied", &[]), detail),
            DispatchError::HandlerFailure { .. } | DispatchError::Timeout { .. } => {
                self.with_detail(m.error("general_error", &[]), &error.to_string())
            }
        }
    }

    fn with_detail(&self, reply: String, detail: &str) -> String {
        if self.debug {
            format!("{reply}\n\n[debug] {detail}")
        } else {
            reply
        }
    }
}

fn language_model(
    config: &AssistantConfig,
    model: Option<Arc<dyn LanguageModel>>,
) -> Result<Arc<dyn LanguageModel>, BuildError> {
    match model {
        Some(model) => Ok(model),
        None => Ok(backend::from_config(&config.llm)?),
    }
}

/// One conversation: a shared assistant plus this conversation's history.
pub struct Session {
    assistant: Arc<Assistant>,
    history: ConversationHistory,
}

impl Session {
    pub async fn handle_user_message(&mut self, message: &str) -> String {
        self.assistant.respond(message, &mut self.history).await
    }

    pub async fn handle_image_association(&mut self, product_name: &str, path: &Path) -> String {
        self.assistant
            .associate_image(product_name, path, &mut self.history)
            .await
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn assistant(&self) -> &Arc<Assistant> {
        &self.assistant
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}
