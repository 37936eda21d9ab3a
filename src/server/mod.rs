// src/server/mod.rs

//! HTTP serving layer.
//!
//! `GET /t4g/{location}` and `GET /t4g` return a location's feed as RSS.
//! Any failure is answered with `400` and `{"error": "..."}`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Json, Router,
    extract::{Path, Request, State},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use crate::error::{AppError, Result};
use crate::feed::FeedCache;
use crate::models::ServerConfig;

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    cache: Arc<FeedCache>,
    debounce: Option<Duration>,
    request_timeout: Duration,
}

impl AppState {
    pub fn new(cache: Arc<FeedCache>, debounce: Option<Duration>, request_timeout: Duration) -> Self {
        Self {
            cache,
            debounce,
            request_timeout,
        }
    }

    /// State using the debounce window and deadline from `config`.
    pub fn from_config(cache: Arc<FeedCache>, config: &ServerConfig) -> Self {
        Self::new(cache, config.debounce(), config.request_timeout())
    }

    pub fn cache(&self) -> &FeedCache {
        &self.cache
    }
}

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/t4g", get(unfiltered_feed))
        .route("/t4g/", get(unfiltered_feed))
        .route("/t4g/{location}", get(location_feed))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn unfiltered_feed(State(state): State<AppState>) -> Response {
    serve_feed(&state, None).await
}

async fn location_feed(State(state): State<AppState>, Path(location): Path<String>) -> Response {
    serve_feed(&state, Some(&location)).await
}

async fn serve_feed(state: &AppState, location: Option<&str>) -> Response {
    match feed_rss(state, location).await {
        Ok(body) => ([(header::CONTENT_TYPE, "application/xml")], body).into_response(),
        Err(error) => {
            log::warn!(
                "Failed to serve feed for location '{}': {}",
                location.unwrap_or_default(),
                error
            );
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response()
        }
    }
}

async fn feed_rss(state: &AppState, location: Option<&str>) -> Result<String> {
    let fetch = state.cache.fetch_feed(location, state.debounce);
    let feed = tokio::time::timeout(state.request_timeout, fetch)
        .await
        .map_err(|_| AppError::Timeout(state.request_timeout))??;
    feed.to_rss().await
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    log::info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}
