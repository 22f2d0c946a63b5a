use std::sync::Arc;
use anyhow::Context;
use autorent_api::{app, AppState};
use autorent_core::image::normalize_car_images;
use autorent_core::FsAssets;
use autorent_store::{app_config::Config, JsonStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "autorent_api=debug,autorent_store=debug,autorent_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Autorent API on port {}", config.server.port);

    let store = Arc::new(JsonStore::open_or_volatile(&config.storage.db_file));
    if !store.is_persistent().await {
        tracing::warn!("Running without persistence; bookings will be lost on restart");
    }

    let assets = FsAssets::new(&config.assets.root);
    match normalize_car_images(store.as_ref(), &assets).await {
        Ok(0) => {}
        Ok(n) => tracing::info!("Normalized {} car images", n),
        Err(e) => tracing::warn!("Image normalization failed: {}", e),
    }

    let state = AppState::new(store, Arc::new(assets));

    let static_root = config.assets.serve.then_some(config.assets.root.as_path());
    if let Some(root) = static_root {
        tracing::info!("Serving static assets from {}", root.display());
    }
    let router = app(state, static_root);

    let listener = tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.server.host, config.server.port))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
