//! Read-only views for inspecting classified history.

use chrono::{NaiveDateTime, TimeZone, Timelike};
use serde::Serialize;

use crate::event::AnnotatedEvent;
use crate::label::SearchLabel;

/// Events within `radius` positions of `index`, clamped to the slice.
pub fn surrounding(events: &[AnnotatedEvent], index: usize, radius: usize) -> &[AnnotatedEvent] {
    if events.is_empty() {
        return events;
    }
    let index = index.min(events.len() - 1);
    let start = index.saturating_sub(radius);
    let end = index
        .saturating_add(radius)
        .saturating_add(1)
        .min(events.len());
    &events[start..end]
}

/// Position of the first event visited at `local` (to the second) in `tz`.
pub fn find_by_local_time<Tz: TimeZone>(
    events: &[AnnotatedEvent],
    local: NaiveDateTime,
    tz: &Tz,
) -> Option<usize> {
    let wanted = local.with_nanosecond(0)?;
    events.iter().position(|e| {
        e.event
            .visited_at
            .with_timezone(tz)
            .naive_local()
            .with_nanosecond(0)
            == Some(wanted)
    })
}

/// A distinct search query and how often it was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryCount {
    pub query: String,
    pub count: usize,
}

/// Counted, unlabelled queries grouped by text and sorted case-insensitively.
pub fn query_counts<'a, I>(events: I) -> Vec<QueryCount>
where
    I: IntoIterator<Item = &'a AnnotatedEvent>,
{
    let mut counts: Vec<QueryCount> = Vec::new();
    let queries = events
        .into_iter()
        .filter(|e| e.included_search_entry && e.search_label == SearchLabel::None)
        .filter_map(|e| e.search_query.as_deref())
        .filter(|q| !q.is_empty());
    for query in queries {
        match counts.iter_mut().find(|c| c.query == query) {
            Some(existing) => existing.count += 1,
            None => counts.push(QueryCount {
                query: query.to_string(),
                count: 1,
            }),
        }
    }
    counts.sort_by_cached_key(|c| c.query.to_lowercase());
    counts
}
