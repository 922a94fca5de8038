// =============================================================================
// FX Signals — Main Entry Point
// =============================================================================
//
// Polls price history for the configured symbols, evaluates the configured
// rule set, and pushes BUY/SELL alerts to Telegram subject to a cooldown.
// A small read-only HTTP API exposes health, recent decisions and cooldowns.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod cooldown;
mod decision_envelope;
mod error;
mod feed;
mod formatter;
mod indicators;
mod market_data;
mod notify;
mod runtime_config;
mod scheduler;
mod signals;
mod strategy;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::feed::YahooFeed;
use crate::notify::{Notifier, TelegramNotifier};
use crate::runtime_config::{RuntimeConfig, DEFAULT_CONFIG_PATH};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("FX Signals starting up");

    let config_path =
        std::env::var("SIGNAL_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });
    config.apply_env_overrides(|key| std::env::var(key).ok());
    config.validate().context("invalid configuration")?;

    info!(
        symbols = ?config.symbols,
        strategy = %config.strategy,
        timeframe = config.effective_timeframe(),
        check_every_min = config.check_every_min,
        cooldown_min = config.effective_cooldown_min(),
        "configuration ready"
    );

    // ── 2. Shared state & clients ────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config));

    let feed = YahooFeed::new()?;
    let notifier = TelegramNotifier::from_env()?;

    if notifier.is_enabled() {
        if let Err(e) = notifier.notify("🚀 FX signal service started").await {
            warn!(error = %e, "startup notification failed");
        }
    }

    // ── 3. API server ────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    let app = api::rest::router(state.clone());
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "API server failed");
        }
    });

    // ── 4. Scheduler ─────────────────────────────────────────────────────
    let scheduler = tokio::spawn(scheduler::run_scheduler(state.clone(), feed, notifier));

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received, stopping");

    scheduler.abort();
    let gate = state.engine.gate();
    if !gate.is_empty() {
        warn!(keys = gate.len(), "dropping in-memory cooldown state");
    }
    info!(cycles = state.health().cycles, "FX Signals shut down complete");
    Ok(())
}
