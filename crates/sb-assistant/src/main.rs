//! Storebot console: chat with the store assistant over stdin/stdout.
//!
//! Logs go to stderr as JSON so replies stay readable.

use std::sync::Arc;

use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use sb_assistant::{Assistant, AssistantConfig, console};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "sb-assistant starting");

    // ── Load config ─────────────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/storebot/assistant.toml".to_string());

    let config = AssistantConfig::from_file(&config_path)?;
    tracing::info!(
        store_url = %config.commerce.store_url,
        resolver = ?config.resolver.mode,
        "config loaded"
    );

    // ── Build assistant ─────────────────────────────────────────
    let assistant = Arc::new(Assistant::from_config(&config)?);

    // ── Console loop ────────────────────────────────────────────
    let mut stdout = tokio::io::stdout();
    let session = console::run(&assistant, BufReader::new(tokio::io::stdin()), &mut stdout).await?;

    tracing::info!(turns = session.history().len(), "sb-assistant shutting down");
    Ok(())
}
