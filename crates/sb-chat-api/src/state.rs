//! Shared application state for the Axum server.
//!
//! One assistant is shared by every request. Each conversation id owns an
//! isolated [`Session`] behind its own `Mutex`, so messages within one
//! conversation are handled strictly in order while different
//! conversations proceed in parallel.
//!
//! Conversations are bounded: idle ones are dropped by [`AppState::evict_idle`]
//! and, at capacity, starting a new one evicts the least recently active.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use sb_assistant::{Assistant, AssistantConfig, BuildError, Session};
use sb_commerce::MockCommerceGateway;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Bounds on live conversations.
#[derive(Debug, Clone, Copy)]
pub struct ConversationLimits {
    /// Idle time after which a conversation is dropped.
    pub idle_ttl: Duration,
    /// Live conversations kept at most.
    pub max_conversations: usize,
}

impl Default for ConversationLimits {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(3600),
            max_conversations: 10_000,
        }
    }
}

/// Shared application state, cheap to clone into handlers.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
    pub conversations: Arc<RwLock<HashMap<Uuid, Arc<Conversation>>>>,
    limits: ConversationLimits,
}

/// A live conversation.
pub struct Conversation {
    pub started_at: DateTime<Utc>,
    last_active_ms: AtomicI64,
    pub session: Mutex<Session>,
}

impl Conversation {
    fn new(session: Session, now: DateTime<Utc>) -> Self {
        Self {
            started_at: now,
            last_active_ms: AtomicI64::new(now.timestamp_millis()),
            session: Mutex::new(session),
        }
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_active_ms.load(Ordering::Relaxed)).unwrap_or(self.started_at)
    }

    fn touch(&self, now: DateTime<Utc>) {
        self.last_active_ms.fetch_max(now.timestamp_millis(), Ordering::Relaxed);
    }

    /// A request currently holds the session.
    fn is_busy(&self) -> bool {
        self.session.try_lock().is_err()
    }
}

impl AppState {
    pub fn new(assistant: Arc<Assistant>) -> Self {
        Self {
            assistant,
            conversations: Arc::new(RwLock::new(HashMap::new())),
            limits: ConversationLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ConversationLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> ConversationLimits {
        self.limits
    }

    /// Pattern-resolving assistant over the in-memory sample store
    /// (development and tests). Images are only accepted from `upload_dir`.
    pub fn with_sample_store(upload_dir: impl Into<PathBuf>) -> Result<Self, BuildError> {
        let gateway = Arc::new(MockCommerceGateway::with_sample_store());
        let mut config = AssistantConfig::default();
        config.commerce.upload_dir = Some(upload_dir.into());
        let assistant = Assistant::build(&config, gateway, None)?;
        Ok(Self::new(Arc::new(assistant)))
    }

    /// The conversation for `id`, created on first use.
    pub async fn conversation(&self, id: Uuid) -> Arc<Conversation> {
        let now = Utc::now();
        if let Some(existing) = self.conversations.read().await.get(&id) {
            existing.touch(now);
            return Arc::clone(existing);
        }

        let mut conversations = self.conversations.write().await;
        if let Some(existing) = conversations.get(&id) {
            existing.touch(now);
            return Arc::clone(existing);
        }
        if conversations.len() >= self.limits.max_conversations {
            evict_least_recent(&mut conversations);
        }
        tracing::info!(conversation_id = %id, "conversation started");
        let conversation = Arc::new(Conversation::new(self.assistant.session(), now));
        conversations.insert(id, Arc::clone(&conversation));
        conversation
    }

    pub async fn existing(&self, id: Uuid) -> Option<Arc<Conversation>> {
        self.conversations.read().await.get(&id).cloned()
    }

    /// Drop a conversation. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.conversations.write().await.remove(&id).is_some()
    }

    /// Drop conversations idle longer than the TTL as of `now`. A
    /// conversation with a request in flight is kept. Returns how many
    /// were dropped.
    pub async fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let ttl = TimeDelta::from_std(self.limits.idle_ttl).unwrap_or(TimeDelta::MAX);
        let Some(cutoff) = now.checked_sub_signed(ttl) else {
            return 0;
        };

        let mut conversations = self.conversations.write().await;
        let before = conversations.len();
        conversations.retain(|id, c| {
            let keep = c.last_active() > cutoff || c.is_busy();
            if !keep {
                tracing::info!(conversation_id = %id, "idle conversation evicted");
            }
            keep
        });
        before - conversations.len()
    }
}

fn evict_least_recent(conversations: &mut HashMap<Uuid, Arc<Conversation>>) {
    let oldest = conversations
        .iter()
        .filter(|(_, c)| !c.is_busy())
        .min_by_key(|(_, c)| c.last_active())
        .map(|(id, _)| *id);
    if let Some(id) = oldest {
        conversations.remove(&id);
        tracing::info!(conversation_id = %id, "conversation evicted at capacity");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::with_sample_store(std::env::temp_dir()).unwrap()
    }

    #[tokio::test]
    async fn conversations_are_isolated() {
        let state = state();
        let a = state.conversation(Uuid::now_v7()).await;
        let b = state.conversation(Uuid::now_v7()).await;

        a.session
            .lock()
            .await
            .handle_user_message("הוסף מוצר חדש בשם חולצה במחיר 70")
            .await;

        assert_eq!(a.session.lock().await.history().len(), 1);
        assert!(b.session.lock().await.history().is_empty());
    }

    #[tokio::test]
    async fn same_id_returns_same_conversation() {
        let state = state();
        let id = Uuid::now_v7();
        let first = state.conversation(id).await;
        let second = state.conversation(id).await;
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn remove_forgets_conversation() {
        let state = state();
        let id = Uuid::now_v7();
        state.conversation(id).await;
        assert!(state.remove(id).await);
        assert!(state.existing(id).await.is_none());
        assert!(!state.remove(id).await);
    }

    #[tokio::test]
    async fn idle_conversations_expire() {
        let state = state().with_limits(ConversationLimits {
            idle_ttl: Duration::from_secs(60),
            ..ConversationLimits::default()
        });
        let idle = Uuid::now_v7();
        let busy = Uuid::now_v7();
        state.conversation(idle).await;
        let held = state.conversation(busy).await;
        let _guard = held.session.lock().await;

        assert_eq!(state.evict_idle(Utc::now()).await, 0);

        let later = Utc::now() + TimeDelta::seconds(61);
        assert_eq!(state.evict_idle(later).await, 1);
        assert!(state.existing(idle).await.is_none());
        assert!(state.existing(busy).await.is_some());
    }

    #[tokio::test]
    async fn activity_postpones_expiry() {
        let state = state().with_limits(ConversationLimits {
            idle_ttl: Duration::from_secs(60),
            ..ConversationLimits::default()
        });
        let id = Uuid::now_v7();
        let conversation = state.conversation(id).await;
        let first_seen = conversation.last_active();

        conversation.touch(first_seen + TimeDelta::seconds(50));
        assert_eq!(state.evict_idle(first_seen + TimeDelta::seconds(100)).await, 0);
        assert_eq!(state.evict_idle(first_seen + TimeDelta::seconds(111)).await, 1);
    }

    #[tokio::test]
    async fn capacity_evicts_least_recently_active() {
        let state = state().with_limits(ConversationLimits {
            max_conversations: 2,
            ..ConversationLimits::default()
        });
        let (a, b, c) = (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());
        let first = state.conversation(a).await;
        let second = state.conversation(b).await;
        first.touch(second.last_active() + TimeDelta::seconds(5));

        state.conversation(c).await;
        assert_eq!(state.conversations.read().await.len(), 2);
        assert!(state.existing(a).await.is_some());
        assert!(state.existing(b).await.is_none());
        assert!(state.existing(c).await.is_some());
    }
}
