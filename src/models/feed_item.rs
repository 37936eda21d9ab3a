// src/models/feed_item.rs

//! Feed item data structure.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Event;

/// An event as it appears in a feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedItem {
    /// Event id as text; empty when the event had no id
    pub id: String,

    /// Event title
    pub title: String,

    /// Absolute URL of the event page
    pub link: String,

    /// `"{date} | {location} | {category}"`
    pub description: String,

    /// Image published as the item's enclosure
    pub image_url: String,

    /// When the item entered the feed
    pub created: DateTime<Utc>,
}

impl FeedItem {
    /// Build a feed item from an event.
    pub fn from_event(event: &Event, created: DateTime<Utc>) -> Self {
        Self {
            id: if event.is_identified() {
                event.id.to_string()
            } else {
                String::new()
            },
            title: event.title.clone(),
            link: event.link_url.clone(),
            description: format!("{} | {} | {}", event.date, event.location, event.category),
            image_url: event.image_url.clone(),
            created,
        }
    }

    /// The id as a number, if it parses as one.
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.parse().ok()
    }

    /// Feed ranking: higher numeric ids first, unparsable ids last.
    pub fn rank(a: &Self, b: &Self) -> Ordering {
        b.numeric_id().cmp(&a.numeric_id())
    }
}
