//! Local resolver: keyword routing followed by rule-table extraction.

use async_trait::async_trait;
use sb_protocol::{Intent, ResolutionError, ResolutionSource};

use super::IntentResolver;
use crate::error::BuildError;
use crate::extract::PatternExtractor;
use crate::history::ConversationHistory;
use crate::router;

/// Resolves messages without any network call. History is not consulted;
/// every message must be self-contained.
pub struct PatternResolver {
    extractor: PatternExtractor,
}

impl PatternResolver {
    pub fn new() -> Result<Self, BuildError> {
        Ok(Self::with_extractor(PatternExtractor::new()?))
    }

    pub fn with_extractor(extractor: PatternExtractor) -> Self {
        Self { extractor }
    }
}

#[async_trait]
impl IntentResolver for PatternResolver {
    async fn resolve(&self, message: &str, _history: &ConversationHistory) -> Result<Intent, ResolutionError> {
        let domain = router::route(message).ok_or(ResolutionError::UnresolvedDomain)?;
        tracing::debug!(domain = %domain, "message routed");

        let extraction = self.extractor.extract(domain, message)?;
        let operation = extraction.operation;
        Ok(Intent::new(
            operation,
            extraction.into_parameters(),
            ResolutionSource::PatternMatch,
        ))
    }

    fn tier_name(&self) -> &str {
        "pattern"
    }
}
