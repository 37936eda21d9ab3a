// src/services/aggregator.rs

//! Event aggregator service.
//!
//! Fetches several listing pages concurrently and joins them into one
//! deduplicated event list in page order.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::error::{AggregateFetchError, PageFailure, Result};
use crate::models::Event;
use crate::services::{EventPageParser, PageFetcher};

/// Everything one aggregate fetch produced, including failed pages.
#[derive(Debug, Default)]
pub struct AggregateOutcome {
    /// Number of pages requested
    pub pages: u32,
    /// Deduplicated events from the pages that succeeded, page order
    pub events: Vec<Event>,
    /// Pages that failed, ordered by page number
    pub failures: Vec<PageFailure>,
}

impl AggregateOutcome {
    /// True when every page was fetched and parsed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Events if every page succeeded, otherwise the joined page errors.
    pub fn into_result(self) -> Result<Vec<Event>> {
        if self.failures.is_empty() {
            Ok(self.events)
        } else {
            Err(AggregateFetchError {
                pages: self.pages,
                failures: self.failures,
            }
            .into())
        }
    }
}

/// Service for fetching and joining listing pages.
pub struct EventAggregator {
    fetcher: Arc<dyn PageFetcher>,
    parser: EventPageParser,
}

impl EventAggregator {
    /// Create an aggregator over a page source and parser.
    pub fn new(fetcher: Arc<dyn PageFetcher>, parser: EventPageParser) -> Self {
        Self { fetcher, parser }
    }

    /// Fetch `page_count` pages, failing if any page failed.
    pub async fn fetch_events(&self, location: Option<&str>, page_count: u32) -> Result<Vec<Event>> {
        self.fetch_pages(location, page_count).await.into_result()
    }

    /// Fetch `page_count` pages (at least one) concurrently.
    ///
    /// All pages run to completion; failures are collected rather than
    /// cancelling the remaining pages.
    pub async fn fetch_pages(&self, location: Option<&str>, page_count: u32) -> AggregateOutcome {
        let pages = page_count.max(1);

        let mut results: Vec<(u32, Result<Vec<Event>>)> = stream::iter(1..=pages)
            .map(|page| async move { (page, self.fetch_page_events(location, page).await) })
            .buffer_unordered(pages as usize)
            .collect()
            .await;

        // Completion order is arbitrary
        results.sort_by_key(|(page, _)| *page);

        let mut outcome = AggregateOutcome {
            pages,
            ..AggregateOutcome::default()
        };
        let mut page_events = Vec::with_capacity(results.len());

        for (page, result) in results {
            match result {
                Ok(events) => {
                    log::debug!("Page {} yielded {} events", page, events.len());
                    page_events.push(events);
                }
                Err(error) => {
                    log::warn!("Failed to fetch listing page {}: {}", page, error);
                    outcome.failures.push(PageFailure { page, error });
                }
            }
        }

        outcome.events = dedup_events(page_events.into_iter().flatten());
        outcome
    }

    async fn fetch_page_events(&self, location: Option<&str>, page: u32) -> Result<Vec<Event>> {
        let html = self.fetcher.fetch_page(location, page).await?;
        Ok(self.parser.parse(&html))
    }
}

/// Drop repeated nonzero ids, keeping the first occurrence. Unidentified
/// events are always kept.
pub fn dedup_events(events: impl IntoIterator<Item = Event>) -> Vec<Event> {
    let mut seen = HashSet::new();
    events
        .into_iter()
        .filter(|event| !event.is_identified() || seen.insert(event.id))
        .collect()
}
