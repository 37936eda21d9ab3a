// src/feed/cache.rs

//! Per-location feed cache.
//!
//! The map lock only guards lookup, insertion and eviction. Refreshes run
//! under each feed's own lock, so different locations refresh concurrently
//! and requests for the same location share one upstream refresh.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use url::Url;

use crate::error::Result;
use crate::feed::Feed;
use crate::models::{Config, FeedConfig};
use crate::services::{EventAggregator, EventPageParser, HttpPageFetcher};

/// Location → feed map with debounced refresh and bounded capacity.
pub struct FeedCache {
    aggregator: EventAggregator,
    base_url: Url,
    settings: FeedConfig,
    feeds: Mutex<HashMap<String, Arc<Feed>>>,
}

impl FeedCache {
    /// Create a cache that refreshes feeds through `aggregator`.
    pub fn new(aggregator: EventAggregator, base_url: Url, settings: FeedConfig) -> Self {
        Self {
            aggregator,
            base_url,
            settings,
            feeds: Mutex::new(HashMap::new()),
        }
    }

    /// Wire up the HTTP fetcher and parser described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = config.upstream.base_url()?;
        let fetcher = Arc::new(HttpPageFetcher::from_config(&config.upstream)?);
        let parser = EventPageParser::new(base_url.clone())?;

        Ok(Self::new(
            EventAggregator::new(fetcher, parser),
            base_url,
            config.feed.clone(),
        ))
    }

    /// Get the feed for `location`, refreshing it unless it was refreshed
    /// less than `debounce` ago. `None` and `""` both mean unfiltered.
    ///
    /// A failed refresh leaves the feed cached with its previous items.
    pub async fn fetch_feed(
        &self,
        location: Option<&str>,
        debounce: Option<Duration>,
    ) -> Result<Arc<Feed>> {
        let key = location.unwrap_or_default();
        let feed = self.get_or_insert(key);

        feed.refresh(
            &self.aggregator,
            self.settings.page_count,
            self.settings.partial_failure,
            debounce,
        )
        .await?;

        Ok(feed)
    }

    fn get_or_insert(&self, key: &str) -> Arc<Feed> {
        let mut feeds = self.lock_feeds();
        if let Some(feed) = feeds.get(key) {
            return Arc::clone(feed);
        }

        if feeds.len() >= self.settings.cache_capacity {
            if let Some(oldest) = oldest_key(&feeds) {
                log::info!("Evicting cached feed for location '{}'", oldest);
                feeds.remove(&oldest);
            }
        }

        log::debug!("Creating feed for location '{}'", key);
        let feed = Arc::new(Feed::new(
            Some(key),
            &self.base_url,
            self.settings.max_items,
        ));
        feeds.insert(key.to_string(), Arc::clone(&feed));
        feed
    }

    /// Number of cached feeds.
    pub fn len(&self) -> usize {
        self.lock_feeds().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a feed for `location` is cached.
    pub fn contains(&self, location: Option<&str>) -> bool {
        self.lock_feeds()
            .contains_key(location.unwrap_or_default())
    }

    /// Cached location keys, sorted. The unfiltered feed is `""`.
    pub fn locations(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock_feeds().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn lock_feeds(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Feed>>> {
        self.feeds.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Least recently updated entry; never-updated feeds first, ties by key.
fn oldest_key(feeds: &HashMap<String, Arc<Feed>>) -> Option<String> {
    feeds
        .iter()
        .map(|(key, feed)| (feed.updated_at(), key))
        .min()
        .map(|(_, key)| key.clone())
}
