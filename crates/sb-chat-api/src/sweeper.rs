//! Periodic removal of idle conversations.

use std::time::Duration;

use chrono::Utc;
use tokio::time;

use crate::state::AppState;

/// Run the sweep loop, evicting idle conversations every `interval`.
///
/// Runs until the task is cancelled. Intended to be spawned as a
/// background tokio task.
pub async fn run(state: AppState, interval: Duration) {
    let mut ticker = time::interval(interval);
    // Skip the first tick (fires immediately).
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let evicted = state.evict_idle(Utc::now()).await;
        if evicted > 0 {
            tracing::info!(evicted, "idle conversations swept");
        } else {
            tracing::debug!("no idle conversations");
        }
    }
}

/// Sweep often enough that a conversation outlives its TTL by at most a
/// quarter of it, and at least once a minute.
pub fn interval_for(ttl: Duration) -> Duration {
    (ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_tracks_ttl() {
        assert_eq!(interval_for(Duration::from_secs(3600)), Duration::from_secs(60));
        assert_eq!(interval_for(Duration::from_secs(120)), Duration::from_secs(30));
        assert_eq!(interval_for(Duration::from_secs(2)), Duration::from_secs(1));
    }
}
