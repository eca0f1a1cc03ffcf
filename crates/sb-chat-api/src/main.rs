//! Storebot chat API: HTTP transport for the store assistant.
//!
//! Serves one isolated conversation history per conversation id on top
//! of a single shared assistant.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use sb_assistant::{Assistant, AssistantConfig};
use sb_chat_api::config::ApiConfig;
use sb_chat_api::routes;
use sb_chat_api::state::AppState;
use sb_chat_api::sweeper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "sb-chat-api starting");

    let config = ApiConfig::from_env();

    // Use the configured store if ASSISTANT_CONFIG is set, otherwise the sample store.
    let state = if let Some(path) = &config.assistant_config {
        let mut assistant_config = AssistantConfig::from_file(path)?;
        let upload_dir = assistant_config
            .commerce
            .upload_dir
            .get_or_insert_with(|| config.upload_dir.clone());
        tokio::fs::create_dir_all(&*upload_dir).await?;
        tracing::info!(
            path = %path.display(),
            store_url = %assistant_config.commerce.store_url,
            upload_dir = %upload_dir.display(),
            "assistant config loaded"
        );
        AppState::new(Arc::new(Assistant::from_config(&assistant_config)?))
    } else {
        tracing::warn!("ASSISTANT_CONFIG not set, using in-memory sample store");
        tokio::fs::create_dir_all(&config.upload_dir).await?;
        AppState::with_sample_store(config.upload_dir.clone())?
    };
    let state = state.with_limits(config.limits());

    let limits = state.limits();
    tracing::info!(
        idle_ttl_secs = limits.idle_ttl.as_secs(),
        max_conversations = limits.max_conversations,
        "conversation limits"
    );
    tokio::spawn(sweeper::run(state.clone(), sweeper::interval_for(limits.idle_ttl)));

    let app = routes::build_router(state);

    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
