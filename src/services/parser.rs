// src/services/parser.rs

//! Event listing page parser.
//!
//! Each event card field is bound to a typed extractor over the parsed
//! document instead of a selector mini-language.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Event, RawEvent};

/// Matches every element whose class mentions an event card.
const CARD_SELECTOR: &str = "[class*='event_card']";

/// Fields read from an event card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventField {
    Title,
    Image,
    Link,
    Location,
    Date,
    Category,
}

/// How a single field is read from a card.
#[derive(Debug, Clone)]
enum Extractor {
    /// Trimmed text of the first match
    Text(Selector),
    /// Attribute of the first match
    Attr(Selector, &'static str),
    /// Trimmed text of the n-th match (0-based)
    NthText(Selector, usize),
}

impl Extractor {
    fn extract(&self, card: ElementRef<'_>) -> String {
        let value = match self {
            Self::Text(sel) => card.select(sel).next().map(element_text),
            Self::Attr(sel, attr) => card
                .select(sel)
                .next()
                .and_then(|el| el.value().attr(attr))
                .map(|v| v.trim().to_string()),
            Self::NthText(sel, n) => card.select(sel).nth(*n).map(element_text),
        };
        value.unwrap_or_default()
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Parses listing pages into events.
#[derive(Debug, Clone)]
pub struct EventPageParser {
    card: Selector,
    fields: Vec<(EventField, Extractor)>,
    base_url: Url,
}

impl EventPageParser {
    /// Build a parser; links are resolved against `base_url`.
    pub fn new(base_url: Url) -> Result<Self> {
        let columns = parse_selector(".card-body .col")?;

        let fields = vec![
            (EventField::Title, Extractor::Text(parse_selector(".card-title")?)),
            (EventField::Image, Extractor::Attr(parse_selector("img")?, "src")),
            (
                EventField::Link,
                Extractor::Attr(parse_selector(".card-body a")?, "href"),
            ),
            (EventField::Location, Extractor::NthText(columns.clone(), 0)),
            (EventField::Date, Extractor::NthText(columns.clone(), 1)),
            (EventField::Category, Extractor::NthText(columns, 2)),
        ];

        Ok(Self {
            card: parse_selector(CARD_SELECTOR)?,
            fields,
            base_url,
        })
    }

    /// Extract every event card from a page. No cards is an empty result.
    pub fn parse(&self, html: &str) -> Vec<Event> {
        let document = Html::parse_document(html);

        document
            .select(&self.card)
            .map(|card| self.read_card(card).sanitize(&self.base_url))
            .collect()
    }

    fn read_card(&self, card: ElementRef<'_>) -> RawEvent {
        let mut raw = RawEvent::default();
        for (field, extractor) in &self.fields {
            *field_slot(&mut raw, *field) = extractor.extract(card);
        }
        raw
    }
}

fn field_slot(raw: &mut RawEvent, field: EventField) -> &mut String {
    match field {
        EventField::Title => &mut raw.title,
        EventField::Image => &mut raw.image,
        EventField::Link => &mut raw.link,
        EventField::Location => &mut raw.location,
        EventField::Date => &mut raw.date,
        EventField::Category => &mut raw.category,
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::parse(format!("invalid selector '{s}': {e:?}")))
}

/// Parse one listing page.
pub fn parse_events_page(html: &str, base_url: &Url) -> Result<Vec<Event>> {
    Ok(EventPageParser::new(base_url.clone())?.parse(html))
}
