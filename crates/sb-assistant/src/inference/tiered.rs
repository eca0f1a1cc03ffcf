//! Tiered resolver: local patterns first, language model as fallback.
//!
//! The model is consulted only when the pattern path could not place the
//! message (no domain, no applicable rule, or an applicable rule that did
//! not fill). If the model then fails to produce a usable reply, the
//! pattern error is returned so the user still gets the menu or usage hint.

use async_trait::async_trait;
use sb_protocol::{Intent, ResolutionError};

use super::IntentResolver;
use crate::history::ConversationHistory;

/// Composite resolver that tries local resolution first, then the model.
pub struct TieredResolver {
    local: Box<dyn IntentResolver>,
    remote: Box<dyn IntentResolver>,
}

impl TieredResolver {
    pub fn new(local: Box<dyn IntentResolver>, remote: Box<dyn IntentResolver>) -> Self {
        Self { local, remote }
    }
}

fn falls_through(err: &ResolutionError) -> bool {
    matches!(
        err,
        ResolutionError::UnresolvedDomain
            | ResolutionError::NoMatchingOperation { .. }
            | ResolutionError::UnrecognizedOperation { .. }
    )
}

#[async_trait]
impl IntentResolver for TieredResolver {
    async fn resolve(&self, message: &str, history: &ConversationHistory) -> Result<Intent, ResolutionError> {
        let local_err = match self.local.resolve(message, history).await {
            Ok(intent) => return Ok(intent),
            Err(e) if falls_through(&e) => e,
            Err(e) => return Err(e),
        };

        tracing::debug!(
            tier = self.local.tier_name(),
            error = %local_err,
            "local resolution missed, falling back"
        );
        match self.remote.resolve(message, history).await {
            Ok(intent) => Ok(intent),
            Err(e @ (ResolutionError::InvalidFormat { .. } | ResolutionError::Backend(_))) => {
                tracing::debug!(tier = self.remote.tier_name(), error = %e, "fallback failed, keeping local error");
                Err(local_err)
            }
            Err(e) => Err(e),
        }
    }

    fn tier_name(&self) -> &str {
        "tiered"
    }
}
