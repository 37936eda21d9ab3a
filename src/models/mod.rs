// src/models/mod.rs

//! Domain models for the feed service.

mod config;
mod event;
mod feed_item;

// Re-export all public types
pub use config::{
    Config, FeedConfig, LoggingConfig, PartialFailurePolicy, ServerConfig, UpstreamConfig,
};
pub use event::{Event, RawEvent};
pub use feed_item::FeedItem;
