//! hookpool entry point.
//!
//! Boots the client manager from the environment and rebuilds it whenever
//! the process receives `SIGHUP`, re-reading `.env` first.

use std::sync::Arc;

use sqlx::postgres::PgArguments;
use tracing_subscriber::EnvFilter;

use hookpool::client::{ChangeBus, ChangeEvent, ClientManager};
use hookpool::config::RawOptions;
use hookpool::options::Options;
use hookpool::span::{RequestContext, SpanCapability, TracingSpans};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let options = Options::resolve(&RawOptions::from_env()?)?;
    tracing::info!(url = %options.redacted_url(), "starting hookpool");

    let spans: Arc<dyn SpanCapability> = Arc::new(TracingSpans);
    let manager = Arc::new(ClientManager::initialize(options, spans).await?);
    let bus = ChangeBus::new(16);
    let watcher = Arc::clone(&manager).spawn_watch(bus.subscribe());

    let handle = manager.handle();
    let request = RequestContext::current();
    match handle.query(&request, "SELECT 1", PgArguments::default()).await {
        Ok(_) => tracing::info!("database reachable"),
        Err(err) => tracing::warn!(error = %err, "smoke query failed"),
    }

    wait_for_reloads(&bus).await?;

    drop(bus);
    watcher.await?;
    tracing::info!(generation = handle.generation(), "shutting down");
    Ok(())
}

/// Publishes a change event on every `SIGHUP` until `Ctrl-C`.
#[cfg(unix)]
async fn wait_for_reloads(bus: &ChangeBus) -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = signal(SignalKind::hangup())?;
    loop {
        tokio::select! {
            _ = hangup.recv() => match RawOptions::reload_from_env() {
                Ok(raw) => {
                    bus.publish(ChangeEvent::new(raw, "SIGHUP"));
                }
                Err(err) => tracing::error!(error = %err, "refresh database error"),
            },
            result = tokio::signal::ctrl_c() => return result,
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_reloads(_bus: &ChangeBus) -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
