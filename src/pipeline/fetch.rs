// src/pipeline/fetch.rs

//! One-shot feed fetch pipeline.

use chrono::Utc;

use crate::error::Result;
use crate::feed::FeedCache;
use crate::models::Config;

/// Refresh the feed for `location` once and return it as RSS.
pub async fn run_fetch(config: &Config, location: Option<&str>) -> Result<String> {
    config.validate()?;

    let start_time = Utc::now();
    log::info!(
        "Fetching {} page(s) for {}",
        config.feed.page_count,
        location.filter(|l| !l.is_empty()).unwrap_or("all locations")
    );

    let cache = FeedCache::from_config(config)?;
    let feed = cache.fetch_feed(location, None).await?;
    let rss = feed.to_rss().await?;

    let elapsed = Utc::now() - start_time;
    log::info!(
        "Fetched '{}' with {} item(s) in {} ms",
        feed.title(),
        feed.items().await.len(),
        elapsed.num_milliseconds()
    );

    Ok(rss)
}
