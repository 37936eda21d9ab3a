// src/feed/render.rs

//! RSS rendering for feeds.

use rss::{Channel, Enclosure, Guid, Item};

use crate::error::{AppError, Result};
use crate::feed::Feed;
use crate::models::FeedItem;

const ENCLOSURE_MIME_TYPE: &str = "image/jpeg";

/// Render a feed and a snapshot of its items as an RSS 2.0 document.
///
/// Output depends only on the feed's stored state, so rendering the same
/// state twice yields identical bytes.
pub fn render_rss(feed: &Feed, items: &[FeedItem]) -> Result<String> {
    let mut channel = Channel::default();
    channel.set_title(feed.title());
    channel.set_link(feed.link());
    channel.set_description(feed.description());
    if let Some(updated_at) = feed.updated_at() {
        channel.set_last_build_date(updated_at.to_rfc2822());
    }
    channel.set_items(items.iter().map(to_rss_item).collect::<Vec<_>>());

    let bytes = channel.write_to(Vec::new())?;
    String::from_utf8(bytes).map_err(|e| AppError::Serialization(e.to_string()))
}

fn to_rss_item(item: &FeedItem) -> Item {
    let mut rss_item = Item::default();
    rss_item.set_title(item.title.clone());
    rss_item.set_link(item.link.clone());
    rss_item.set_description(item.description.clone());
    rss_item.set_pub_date(item.created.to_rfc2822());

    if !item.id.is_empty() {
        let mut guid = Guid::default();
        guid.set_value(item.id.clone());
        guid.set_permalink(false);
        rss_item.set_guid(guid);
    }

    if !item.image_url.is_empty() {
        let mut enclosure = Enclosure::default();
        enclosure.set_url(item.image_url.clone());
        enclosure.set_length("0");
        enclosure.set_mime_type(ENCLOSURE_MIME_TYPE);
        rss_item.set_enclosure(enclosure);
    }

    rss_item
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use url::Url;

    use super::*;

    fn item(id: &str, image: &str) -> FeedItem {
        FeedItem {
            id: id.to_string(),
            title: format!("Show {id}"),
            link: format!("https://nhs.ticketsforgood.co.uk/events/{id}"),
            description: "Sat 4 May | London | Theatre".to_string(),
            image_url: image.to_string(),
            created: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_render_channel_and_items() {
        let base = Url::parse("https://nhs.ticketsforgood.co.uk").unwrap();
        let feed = Feed::new(Some("london"), &base, 10);
        let items = vec![item("12", "https://cdn.example.com/12.jpg"), item("", "")];

        let xml = render_rss(&feed, &items).unwrap();
        let channel = Channel::read_from(xml.as_bytes()).unwrap();

        assert_eq!(channel.title(), "T4G Feed: London");
        assert_eq!(channel.description(), "Tickets For Good Events in London");
        assert_eq!(channel.items().len(), 2);

        let first = &channel.items()[0];
        assert_eq!(first.title(), Some("Show 12"));
        assert_eq!(first.guid().map(|g| g.value()), Some("12"));
        let enclosure = first.enclosure().unwrap();
        assert_eq!(enclosure.url(), "https://cdn.example.com/12.jpg");
        assert_eq!(enclosure.mime_type(), "image/jpeg");
        assert_eq!(enclosure.length(), "0");

        let second = &channel.items()[1];
        assert!(second.guid().is_none());
        assert!(second.enclosure().is_none());
    }

    #[test]
    fn test_render_is_deterministic() {
        let base = Url::parse("https://nhs.ticketsforgood.co.uk").unwrap();
        let feed = Feed::new(None, &base, 10);
        let items = vec![item("3", "")];

        assert_eq!(
            render_rss(&feed, &items).unwrap(),
            render_rss(&feed, &items).unwrap()
        );
    }
}
