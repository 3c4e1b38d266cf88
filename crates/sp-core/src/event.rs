//! Browser history events, before and after classification.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::label::SearchLabel;
use crate::time::decode_raw_timestamp;

/// Errors that degrade a single event. None of them abort a batch.
#[derive(Debug, Error)]
pub enum EventError {
    /// The URL could not be parsed; the event is treated as not countable.
    #[error("malformed url {url}: {source}")]
    MalformedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// No recognized scheme could decode the visit time; the event is dropped.
    #[error("invalid timestamp: {raw}")]
    InvalidTimestamp { raw: String },
}

/// A history row as read from a browser store, timestamp still encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawVisit {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub visit_count: u32,
    /// Source-specific encoding (Chromium microseconds, naive UTC string, RFC 3339).
    pub last_visit_time: String,
}

/// One normalized browsing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub url: String,
    pub title: String,
    pub visit_count: u32,
    /// The visit time exactly as the source encoded it.
    pub raw_visit_time: String,
    /// The decoded visit time.
    pub visited_at: DateTime<Utc>,
}

impl Event {
    /// Creates an event from an already-decoded instant.
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        visit_count: u32,
        visited_at: DateTime<Utc>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            visit_count,
            raw_visit_time: visited_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            visited_at,
        }
    }

    /// Decodes a raw row.
    pub fn from_raw(raw: RawVisit) -> Result<Self, EventError> {
        let visited_at = decode_raw_timestamp(&raw.last_visit_time)?;
        Ok(Self {
            url: raw.url,
            title: raw.title,
            visit_count: raw.visit_count,
            raw_visit_time: raw.last_visit_time,
            visited_at,
        })
    }
}

/// Decodes raw rows into events in canonical order (oldest first).
///
/// Rows whose timestamps cannot be decoded are dropped. Rows sharing a
/// timestamp keep their input order.
pub fn resolve_events<I>(raw: I) -> Vec<Event>
where
    I: IntoIterator<Item = RawVisit>,
{
    let mut events: Vec<Event> = raw
        .into_iter()
        .filter_map(|row| match Event::from_raw(row) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::debug!(error = %e, "dropping history row");
                None
            }
        })
        .collect();
    events.sort_by_key(|e| e.visited_at);
    events
}

/// An event with its search classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedEvent {
    #[serde(flatten)]
    pub event: Event,

    /// Decoded query text, or a placeholder for systems that hide it.
    #[serde(default)]
    pub search_query: Option<String>,

    /// Host the search ran on, without `www.`. Present iff the query is non-empty.
    #[serde(default)]
    pub search_engine: Option<String>,

    #[serde(default)]
    pub search_label: SearchLabel,

    /// Whether the event counts toward usage statistics.
    #[serde(default)]
    pub included_search_entry: bool,

    /// Whether listings show the event without asking for everything.
    #[serde(default = "default_visible")]
    pub default_visible: bool,
}

const fn default_visible() -> bool {
    true
}

impl AnnotatedEvent {
    /// An event that is not a search.
    pub const fn not_a_search(event: Event) -> Self {
        Self {
            event,
            search_query: None,
            search_engine: None,
            search_label: SearchLabel::None,
            included_search_entry: false,
            default_visible: true,
        }
    }

    /// Whether classification attached a query (possibly a placeholder).
    pub const fn is_search(&self) -> bool {
        self.search_query.is_some()
    }

    /// Relabels the event as a redirect artifact, which also excludes it.
    pub const fn mark_redirect(&mut self) {
        self.search_label = SearchLabel::Redirect;
        self.included_search_entry = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(url: &str, time: &str) -> RawVisit {
        RawVisit {
            url: url.to_string(),
            title: String::new(),
            visit_count: 1,
            last_visit_time: time.to_string(),
        }
    }

    #[test]
    fn from_raw_keeps_the_source_encoding() {
        let visit = raw("https://duckduckgo.com/?q=mock", "2024-04-23 12:00:00");
        let event = Event::from_raw(visit).unwrap();
        assert_eq!(event.raw_visit_time, "2024-04-23 12:00:00");
        assert_eq!(
            event.visited_at,
            Utc.with_ymd_and_hms(2024, 4, 23, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn resolve_events_drops_undecodable_rows_and_sorts() {
        let events = resolve_events(vec![
            raw("https://b.example/", "2024-04-21 11:00:00"),
            raw("https://broken.example/", "not a time"),
            raw("https://a.example/", "2024-04-20 10:00:00"),
            raw("https://unstamped.example/", "0"),
        ]);

        let urls: Vec<_> = events.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, ["https://a.example/", "https://b.example/"]);
    }

    #[test]
    fn resolve_events_is_stable_for_equal_times() {
        let events = resolve_events(vec![
            raw("https://first.example/", "2024-04-20 10:00:00"),
            raw("https://second.example/", "2024-04-20 10:00:00"),
        ]);
        assert_eq!(events[0].url, "https://first.example/");
        assert_eq!(events[1].url, "https://second.example/");
    }

    #[test]
    fn mark_redirect_excludes_the_event() {
        let event = Event::new("https://x.example/?q=a", "", 1, Utc::now());
        let mut annotated = AnnotatedEvent::not_a_search(event);
        annotated.included_search_entry = true;
        annotated.mark_redirect();
        assert_eq!(annotated.search_label, SearchLabel::Redirect);
        assert!(!annotated.included_search_entry);
    }

    #[test]
    fn annotated_event_serializes_flat() {
        let event = Event::new(
            "https://www.google.com/search?q=cats",
            "cats - Google Search",
            1,
            Utc.with_ymd_and_hms(2025, 1, 29, 16, 0, 0).unwrap(),
        );
        let annotated = AnnotatedEvent {
            event,
            search_query: Some("cats".to_string()),
            search_engine: Some("google.com".to_string()),
            search_label: SearchLabel::None,
            included_search_entry: true,
            default_visible: true,
        };

        let json = serde_json::to_string_pretty(&annotated).unwrap();
        insta::assert_snapshot!(json, @r#"
        {
          "url": "https://www.google.com/search?q=cats",
          "title": "cats - Google Search",
          "visit_count": 1,
          "raw_visit_time": "2025-01-29T16:00:00Z",
          "visited_at": "2025-01-29T16:00:00Z",
          "search_query": "cats",
          "search_engine": "google.com",
          "search_label": "none",
          "included_search_entry": true,
          "default_visible": true
        }
        "#);
    }
}
