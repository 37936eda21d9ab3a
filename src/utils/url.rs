// src/utils/url.rs

//! Listing URL construction for the ticketing site.

use url::Url;

/// Path of the events listing relative to the site root.
pub const EVENTS_PATH: &str = "/events";

/// Build the events listing URL for an optional location and page.
///
/// Query keys are emitted in sorted order so the same inputs always yield
/// the same URL. Empty locations and non-positive pages are omitted.
///
/// # Examples
/// ```
/// use t4g_feed::utils::url::events_url;
/// use url::Url;
///
/// let base = Url::parse("https://nhs.ticketsforgood.co.uk").unwrap();
/// assert_eq!(
///     events_url(&base, Some("london"), Some(2)).as_str(),
///     "https://nhs.ticketsforgood.co.uk/events?location=london&page=2&range=30&sort=newest"
/// );
/// ```
pub fn events_url(base: &Url, location: Option<&str>, page: Option<u32>) -> Url {
    let mut url = base.clone();
    url.set_path(EVENTS_PATH);
    url.set_query(None);
    url.set_fragment(None);

    {
        let mut query = url.query_pairs_mut();
        if let Some(location) = location.filter(|l| !l.is_empty()) {
            query.append_pair("location", location);
        }
        if let Some(page) = page.filter(|p| *p > 0) {
            query.append_pair("page", &page.to_string());
        }
        query.append_pair("range", "30");
        query.append_pair("sort", "newest");
    }

    url
}

/// Listing URL for a location without a page, used as a feed's channel link.
pub fn location_events_url(base: &Url, location: Option<&str>) -> Url {
    events_url(base, location, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://nhs.ticketsforgood.co.uk").unwrap()
    }

    #[test]
    fn test_fixed_params_only() {
        assert_eq!(
            events_url(&base(), None, None).as_str(),
            "https://nhs.ticketsforgood.co.uk/events?range=30&sort=newest"
        );
    }

    #[test]
    fn test_empty_location_and_zero_page_omitted() {
        assert_eq!(
            events_url(&base(), Some(""), Some(0)).as_str(),
            "https://nhs.ticketsforgood.co.uk/events?range=30&sort=newest"
        );
    }

    #[test]
    fn test_location_is_encoded() {
        assert_eq!(
            events_url(&base(), Some("milton keynes"), Some(3)).as_str(),
            "https://nhs.ticketsforgood.co.uk/events?location=milton+keynes&page=3&range=30&sort=newest"
        );
    }

    #[test]
    fn test_base_path_and_query_replaced() {
        let base = Url::parse("http://127.0.0.1:9000/ignored?x=1").unwrap();
        assert_eq!(
            location_events_url(&base, Some("leeds")).as_str(),
            "http://127.0.0.1:9000/events?location=leeds&range=30&sort=newest"
        );
    }
}
