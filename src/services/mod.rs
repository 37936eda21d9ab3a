//! Service layer for the feed application.
//!
//! This module contains the scraping logic:
//! - Listing page fetching (`PageFetcher`, `HttpPageFetcher`)
//! - Event card parsing (`EventPageParser`)
//! - Multi-page aggregation (`EventAggregator`)

mod aggregator;
mod fetcher;
mod parser;

pub use aggregator::{AggregateOutcome, EventAggregator, dedup_events};
pub use fetcher::{HttpPageFetcher, PageFetcher};
pub use parser::{EventField, EventPageParser, parse_events_page};
