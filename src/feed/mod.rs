//! Feeds and the per-location feed cache.
//!
//! - `Feed`: one location's ranked, bounded item list
//! - `FeedCache`: location → feed map with debounce and eviction
//! - `render_rss`: RSS output

pub mod cache;
#[allow(clippy::module_inception)]
pub mod feed;
pub mod render;

pub use cache::FeedCache;
pub use feed::{Feed, UpdateSummary, merge_events};
pub use render::render_rss;
