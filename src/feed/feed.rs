// src/feed/feed.rs

//! A single location's bounded, ranked event feed.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use url::Url;

use crate::error::Result;
use crate::feed::render::render_rss;
use crate::models::{Event, FeedItem, PartialFailurePolicy};
use crate::services::EventAggregator;
use crate::utils::text::title_case;
use crate::utils::url::location_events_url;

const FEED_TITLE: &str = "T4G Feed";
const FEED_DESCRIPTION: &str = "Tickets For Good Events";

/// What one refresh changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Deduplicated events received from the aggregator
    pub fetched: usize,
    /// Events that entered the feed
    pub added: usize,
    /// Items in the feed afterwards
    pub total: usize,
    /// Pages skipped under the partial failure policy
    pub failed_pages: Vec<u32>,
}

/// Events for one location (or all locations), newest first.
#[derive(Debug)]
pub struct Feed {
    location: Option<String>,
    title: String,
    description: String,
    link: String,
    max_items: usize,
    items: Mutex<Vec<FeedItem>>,
    // Kept apart from `items` so readers never wait on a refresh in flight
    updated_at: RwLock<Option<DateTime<Utc>>>,
}

impl Feed {
    /// Create an empty feed. An empty location means unfiltered.
    pub fn new(location: Option<&str>, base_url: &Url, max_items: usize) -> Self {
        let location = location.filter(|l| !l.is_empty());

        let (title, description) = match location {
            Some(location) => {
                let name = title_case(location);
                (
                    format!("{FEED_TITLE}: {name}"),
                    format!("{FEED_DESCRIPTION} in {name}"),
                )
            }
            None => (FEED_TITLE.to_string(), FEED_DESCRIPTION.to_string()),
        };

        Self {
            location: location.map(str::to_string),
            title,
            description,
            link: location_events_url(base_url, location).to_string(),
            max_items,
            items: Mutex::new(Vec::new()),
            updated_at: RwLock::new(None),
        }
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// When the feed last refreshed successfully; `None` before the first refresh.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        *self.updated_at.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the last refresh is younger than `debounce`.
    pub fn is_fresh(&self, debounce: Option<Duration>) -> bool {
        let (Some(window), Some(updated)) = (debounce, self.updated_at()) else {
            return false;
        };
        // A timestamp ahead of the clock counts as fresh
        Utc::now()
            .signed_duration_since(updated)
            .to_std()
            .map_or(true, |age| age < window)
    }

    /// Snapshot of the current items.
    pub async fn items(&self) -> Vec<FeedItem> {
        self.items.lock().await.clone()
    }

    /// Refresh from `page_count` listing pages.
    ///
    /// On error the items and timestamp are left untouched.
    pub async fn update(
        &self,
        aggregator: &EventAggregator,
        page_count: u32,
        policy: PartialFailurePolicy,
    ) -> Result<UpdateSummary> {
        let mut items = self.items.lock().await;
        self.update_locked(&mut items, aggregator, page_count, policy)
            .await
    }

    /// Refresh unless the feed is still inside its debounce window.
    ///
    /// The window is checked after taking the feed lock, so callers queued
    /// behind a refresh reuse its result. Returns `None` when skipped.
    pub async fn refresh(
        &self,
        aggregator: &EventAggregator,
        page_count: u32,
        policy: PartialFailurePolicy,
        debounce: Option<Duration>,
    ) -> Result<Option<UpdateSummary>> {
        let mut items = self.items.lock().await;
        if self.is_fresh(debounce) {
            log::debug!("Feed '{}' is within its debounce window", self.title);
            return Ok(None);
        }

        self.update_locked(&mut items, aggregator, page_count, policy)
            .await
            .map(Some)
    }

    /// Render the feed as an RSS document. Holds the feed lock throughout.
    pub async fn to_rss(&self) -> Result<String> {
        let items = self.items.lock().await;
        render_rss(self, &items)
    }

    async fn update_locked(
        &self,
        items: &mut Vec<FeedItem>,
        aggregator: &EventAggregator,
        page_count: u32,
        policy: PartialFailurePolicy,
    ) -> Result<UpdateSummary> {
        log::info!("Refreshing feed '{}' from {} page(s)", self.title, page_count);

        let outcome = aggregator.fetch_pages(self.location(), page_count).await;
        let failed_pages: Vec<u32> = outcome.failures.iter().map(|f| f.page).collect();
        let all_failed = failed_pages.len() >= outcome.pages as usize;

        let events = if policy == PartialFailurePolicy::Abort || all_failed {
            outcome.into_result()?
        } else {
            log::warn!(
                "Feed '{}' refreshed without page(s) {:?}",
                self.title,
                failed_pages
            );
            outcome.events
        };

        let now = Utc::now();
        let added = merge_events(items, &events, self.max_items, now);
        self.touch(now);

        let summary = UpdateSummary {
            fetched: events.len(),
            added,
            total: items.len(),
            failed_pages,
        };
        log::info!(
            "Feed '{}' updated: {} fetched, {} added, {} total",
            self.title,
            summary.fetched,
            summary.added,
            summary.total
        );
        Ok(summary)
    }

    fn touch(&self, now: DateTime<Utc>) {
        let mut updated_at = self
            .updated_at
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *updated_at = Some(updated_at.map_or(now, |prev| prev.max(now)));
    }
}

/// Merge fresh events into `items`, then rank and truncate.
///
/// An event is added only if its id is not already present and is greater
/// than the smallest numeric id currently held, so events that were
/// truncated earlier cannot creep back in from the tail of the listing.
/// Returns how many events were added.
pub fn merge_events(
    items: &mut Vec<FeedItem>,
    events: &[Event],
    max_items: usize,
    now: DateTime<Utc>,
) -> usize {
    let mut present: HashSet<u64> = items.iter().filter_map(FeedItem::numeric_id).collect();
    let min_id = present.iter().copied().min().unwrap_or(0);

    let mut added = 0;
    for event in events {
        if event.id > min_id && present.insert(event.id) {
            items.push(FeedItem::from_event(event, now));
            added += 1;
        }
    }

    items.sort_by(FeedItem::rank);
    items.truncate(max_items);
    added
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::AppError;
    use crate::services::{EventPageParser, PageFetcher};

    fn base() -> Url {
        Url::parse("https://nhs.ticketsforgood.co.uk").unwrap()
    }

    fn event(id: u64) -> Event {
        Event {
            id,
            title: format!("Event {id}"),
            ..Event::default()
        }
    }

    fn item(id: &str) -> FeedItem {
        FeedItem {
            id: id.to_string(),
            title: String::new(),
            link: String::new(),
            description: String::new(),
            image_url: String::new(),
            created: Utc::now(),
        }
    }

    fn ids(items: &[FeedItem]) -> Vec<String> {
        items.iter().map(|i| i.id.clone()).collect()
    }

    /// Pages are swapped between refreshes; missing pages fail.
    struct ScriptedFetcher {
        pages: std::sync::Mutex<HashMap<u32, Vec<u64>>>,
        calls: AtomicUsize,
    }

    impl ScriptedFetcher {
        fn set(&self, pages: Vec<(u32, Vec<u64>)>) {
            *self.pages.lock().unwrap() = pages.into_iter().collect();
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch_page(&self, _location: Option<&str>, page: u32) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let ids = self.pages.lock().unwrap().get(&page).cloned();
            let ids = ids.ok_or_else(|| AppError::upstream(502, "bad gateway", 512))?;
            Ok(ids
                .iter()
                .map(|id| {
                    format!(
                        r#"<div class="event_card"><div class="card-body"><a href="/events/{id}">x</a></div></div>"#
                    )
                })
                .collect())
        }
    }

    fn setup(pages: Vec<(u32, Vec<u64>)>) -> (EventAggregator, Arc<ScriptedFetcher>) {
        let fetcher = Arc::new(ScriptedFetcher {
            pages: std::sync::Mutex::new(pages.into_iter().collect()),
            calls: AtomicUsize::new(0),
        });
        let parser = EventPageParser::new(base()).unwrap();
        (EventAggregator::new(fetcher.clone(), parser), fetcher)
    }

    #[test]
    fn test_new_feed_titles() {
        let feed = Feed::new(Some("london"), &base(), 75);
        assert_eq!(feed.title(), "T4G Feed: London");
        assert_eq!(feed.description(), "Tickets For Good Events in London");
        assert_eq!(
            feed.link(),
            "https://nhs.ticketsforgood.co.uk/events?location=london&range=30&sort=newest"
        );
        assert_eq!(feed.updated_at(), None);

        let unfiltered = Feed::new(Some(""), &base(), 75);
        assert_eq!(unfiltered.title(), "T4G Feed");
        assert_eq!(unfiltered.description(), "Tickets For Good Events");
        assert_eq!(unfiltered.location(), None);
    }

    #[test]
    fn test_merge_into_empty_ranks_descending() {
        let mut items = Vec::new();
        let added = merge_events(&mut items, &[event(5), event(9), event(7)], 10, Utc::now());
        assert_eq!(added, 3);
        assert_eq!(ids(&items), vec!["9", "7", "5"]);
    }

    #[test]
    fn test_merge_skips_present_and_stale_ids() {
        let mut items = vec![item("20"), item("15")];
        let added = merge_events(
            &mut items,
            &[event(22), event(20), event(16), event(12)],
            10,
            Utc::now(),
        );

        // 20 is present, 12 is below the current minimum of 15
        assert_eq!(added, 2);
        assert_eq!(ids(&items), vec!["22", "20", "16", "15"]);
    }

    #[test]
    fn test_merge_truncates_lowest_ranked() {
        let mut items = vec![item("10"), item("8")];
        merge_events(&mut items, &[event(12), event(11), event(9)], 3, Utc::now());
        assert_eq!(ids(&items), vec!["12", "11", "10"]);
    }

    #[test]
    fn test_merge_ignores_unparsable_ids_for_minimum() {
        let mut items = vec![item(""), item("abc")];
        merge_events(&mut items, &[event(1)], 10, Utc::now());
        assert_eq!(ids(&items), vec!["1", "", "abc"]);
    }

    #[test]
    fn test_merge_never_admits_unidentified_events() {
        let mut items = Vec::new();
        let added = merge_events(&mut items, &[Event::default(), event(3)], 10, Utc::now());
        assert_eq!(added, 1);
        assert_eq!(ids(&items), vec!["3"]);
    }

    #[test]
    fn test_merge_rejects_duplicates_within_batch() {
        let mut items = Vec::new();
        merge_events(&mut items, &[event(4), event(4)], 10, Utc::now());
        assert_eq!(ids(&items), vec!["4"]);
    }

    #[tokio::test]
    async fn test_update_stamps_and_keeps_items_on_error() {
        let (aggregator, fetcher) = setup(vec![(1, vec![3, 1]), (2, vec![2])]);
        let feed = Feed::new(None, &base(), 10);

        let summary = feed
            .update(&aggregator, 2, PartialFailurePolicy::Abort)
            .await
            .unwrap();
        assert_eq!(summary.added, 3);
        assert_eq!(ids(&feed.items().await), vec!["3", "2", "1"]);
        let first = feed.updated_at().unwrap();

        fetcher.set(vec![(1, vec![9])]);
        let err = feed
            .update(&aggregator, 2, PartialFailurePolicy::Abort)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AggregateFetch(_)));
        assert_eq!(ids(&feed.items().await), vec!["3", "2", "1"]);
        assert_eq!(feed.updated_at(), Some(first));
    }

    #[tokio::test]
    async fn test_update_without_changes_still_stamps() {
        let (aggregator, _) = setup(vec![(1, vec![3])]);
        let feed = Feed::new(None, &base(), 10);

        feed.update(&aggregator, 1, PartialFailurePolicy::Abort)
            .await
            .unwrap();
        let first = feed.updated_at().unwrap();

        let summary = feed
            .update(&aggregator, 1, PartialFailurePolicy::Abort)
            .await
            .unwrap();
        assert_eq!(summary.added, 0);
        assert!(feed.updated_at().unwrap() >= first);
    }

    #[tokio::test]
    async fn test_partial_policy_merges_successful_pages() {
        let (aggregator, _) = setup(vec![(1, vec![8, 6]), (3, vec![4])]);
        let feed = Feed::new(None, &base(), 10);

        let summary = feed
            .update(&aggregator, 3, PartialFailurePolicy::Partial)
            .await
            .unwrap();
        assert_eq!(summary.failed_pages, vec![2]);
        assert_eq!(ids(&feed.items().await), vec!["8", "6", "4"]);
    }

    #[tokio::test]
    async fn test_partial_policy_still_fails_when_every_page_fails() {
        let (aggregator, _) = setup(vec![]);
        let feed = Feed::new(None, &base(), 10);

        let result = feed
            .update(&aggregator, 2, PartialFailurePolicy::Partial)
            .await;
        assert!(result.is_err());
        assert_eq!(feed.updated_at(), None);
    }

    #[tokio::test]
    async fn test_refresh_respects_debounce() {
        let (aggregator, fetcher) = setup(vec![(1, vec![1])]);
        let feed = Feed::new(Some("bristol"), &base(), 10);
        let window = Some(Duration::from_secs(60));

        let first = feed
            .refresh(&aggregator, 1, PartialFailurePolicy::Abort, window)
            .await
            .unwrap();
        assert!(first.is_some());

        let second = feed
            .refresh(&aggregator, 1, PartialFailurePolicy::Abort, window)
            .await
            .unwrap();
        assert!(second.is_none());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        // No window means always refresh
        feed.refresh(&aggregator, 1, PartialFailurePolicy::Abort, None)
            .await
            .unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }
}
