//! Prism Config Server binary.

use std::sync::Arc;

use anyhow::Context;
use prism_server::{AppState, PrismSettings, run_server};
use prism_sources::{BackendFactory, CompositeResolver};
use prism_transport::ConnectionFactoryProvider;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = PrismSettings::load().context("failed to load configuration")?;
    let addr = settings.server.addr().context("invalid server address")?;

    tracing::info!("Starting Prism Config Server v{}", env!("CARGO_PKG_VERSION"));
    if settings.composite.is_empty() {
        tracing::warn!("No backends configured; every query resolves to an empty snapshot");
    }

    let handles = BackendFactory::new()
        .build_all(&settings.composite)
        .await
        .context("failed to wire backends")?;
    tracing::info!("{} backend(s) ready", handles.len());

    let resolver = CompositeResolver::new(handles, Arc::new(ConnectionFactoryProvider::new()));
    run_server(addr, AppState::new(resolver)).await?;

    Ok(())
}
