// src/pipeline/serve.rs

//! HTTP server pipeline.

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::error::Result;
use crate::feed::FeedCache;
use crate::models::Config;
use crate::server::{AppState, create_router};

/// Run the feed server until Ctrl-C.
pub async fn run_server(config: &Config) -> Result<()> {
    config.validate()?;

    let cache = Arc::new(FeedCache::from_config(config)?);
    let state = AppState::from_config(cache, &config.server);
    let router = create_router(state);

    let listener = TcpListener::bind(&config.server.bind).await?;
    log::info!("Serving feeds on http://{}", listener.local_addr()?);
    log::info!(
        "Debounce {}s, {} page(s) per refresh, {} cached feed(s) max",
        config.server.debounce_secs,
        config.feed.page_count,
        config.feed.cache_capacity
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}
