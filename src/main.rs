//! honeyfarm-watch binary entrypoint.
//! Loads configuration, then polls the contract's history until Ctrl-C.

use anyhow::Context;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use honeyfarm_watch::ingest::providers::HyperionProvider;
use honeyfarm_watch::metrics::Metrics;
use honeyfarm_watch::{DiscordNotifier, Poller, WatcherConfig};

/// Compact logs by default, JSON lines when `LOG_FORMAT=json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("honeyfarm_watch=info,ingest=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = WatcherConfig::load().context("invalid configuration, refusing to start")?;
    tracing::info!(
        network = %cfg.network,
        contract = %cfg.contract,
        endpoints = ?cfg.endpoints,
        poll_interval_secs = cfg.poll_interval.as_secs(),
        test_mode = cfg.test_mode,
        "starting watcher"
    );

    let cancel = CancellationToken::new();
    {
        let token = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("received Ctrl+C, shutting down");
                token.cancel();
            }
        });
    }

    if let Some(addr) = cfg.metrics_addr {
        let metrics = Metrics::init()?;
        let token = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = metrics.serve(addr, token).await {
                tracing::error!(error = %e, "metrics server stopped");
            }
        });
    }

    let source = Arc::new(HyperionProvider::new(cfg.http_timeout));
    let notifier = Arc::new(DiscordNotifier::new(cfg.discord_webhook_url.clone()));
    let poller = Poller::from_config(&cfg, source, notifier);

    let state = poller.run(cancel).await;
    tracing::info!(?state, "watcher stopped");
    Ok(())
}
