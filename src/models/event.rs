// src/models/event.rs

//! Event data structures.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::utils::resolve_url;
use crate::utils::text::{collapse_line_breaks, first_digit_run};

/// Marker the site puts in image file names for thumbnail renditions.
const THUMBNAIL_MARKER: &str = "thumb_";

/// An event listed on the ticketing site.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    /// Numeric id taken from the event link; 0 when unknown
    pub id: u64,

    /// Event title
    pub title: String,

    /// Full-size image URL
    pub image_url: String,

    /// Absolute URL of the event page
    pub link_url: String,

    /// Venue location as listed
    pub location: String,

    /// Free-text date, single line
    pub date: String,

    /// Event category
    pub category: String,
}

impl Event {
    /// Whether the event carries a usable identity.
    pub fn is_identified(&self) -> bool {
        self.id != 0
    }
}

/// Field values exactly as extracted from an event card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
    pub title: String,
    pub image: String,
    pub link: String,
    pub location: String,
    pub date: String,
    pub category: String,
}

impl RawEvent {
    /// Turn raw card fields into a clean [`Event`].
    ///
    /// The id is the first digit run of the raw link. Thumbnail markers are
    /// dropped from the image, the link is made absolute against `base` and
    /// line breaks in the date become spaces.
    pub fn sanitize(self, base: &Url) -> Event {
        Event {
            id: first_digit_run(&self.link).unwrap_or(0),
            title: self.title,
            image_url: self.image.replace(THUMBNAIL_MARKER, ""),
            link_url: resolve_url(base, &self.link),
            location: self.location,
            date: collapse_line_breaks(&self.date),
            category: self.category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://nhs.ticketsforgood.co.uk").unwrap()
    }

    #[test]
    fn test_sanitize() {
        let raw = RawEvent {
            title: "Jazz Night".to_string(),
            image: "https://cdn.example.com/img/thumb_jazz.jpg".to_string(),
            link: "/events/4821/jazz-night".to_string(),
            location: "London".to_string(),
            date: "Fri 3 May\n   19:30".to_string(),
            category: "Music".to_string(),
        };

        let event = raw.sanitize(&base());
        assert_eq!(event.id, 4821);
        assert_eq!(event.image_url, "https://cdn.example.com/img/jazz.jpg");
        assert_eq!(
            event.link_url,
            "https://nhs.ticketsforgood.co.uk/events/4821/jazz-night"
        );
        assert_eq!(event.date, "Fri 3 May 19:30");
        assert!(event.is_identified());
    }

    #[test]
    fn test_sanitize_without_digits_is_unidentified() {
        let raw = RawEvent {
            link: "/events/mystery".to_string(),
            ..RawEvent::default()
        };

        let event = raw.sanitize(&base());
        assert_eq!(event.id, 0);
        assert!(!event.is_identified());
    }
}
