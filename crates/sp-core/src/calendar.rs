//! Calendar windows over classified history.
//!
//! Windows are anchored on a caller-supplied `now`; its time zone decides
//! where days, weeks and months begin. Bounds are converted to UTC before
//! events are compared against them.

use std::fmt;

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::event::AnnotatedEvent;
use crate::label::SearchLabel;
use crate::rank::{RankedSummary, rank};
use crate::time::{
    local_end_of_day_to_utc, local_midnight_to_utc, month_end, month_start, months_between,
    week_start,
};

/// The kind of span a window covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    Week,
    Month,
    Full,
}

impl PeriodKind {
    /// Unit in which the total number of windows is reported.
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Full => "day",
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Full => "full history",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("{kind} {offset} ends before the earliest recorded event")]
    BeforeHistory { kind: PeriodKind, offset: u32 },

    #[error("{kind} {offset} is outside the supported calendar range")]
    OutOfRange { kind: PeriodKind, offset: u32 },
}

/// A calendar-anchored slice of the annotated history.
#[derive(Debug, Clone)]
pub struct Window<'a> {
    pub kind: PeriodKind,
    /// 0 is the current period; larger is further back.
    pub index: u32,
    /// First instant inside the window.
    pub start: DateTime<Utc>,
    /// Last instant inside the window (inclusive).
    pub end: DateTime<Utc>,
    /// First local calendar day covered.
    pub first_day: NaiveDate,
    /// Last local calendar day covered.
    pub last_day: NaiveDate,
    /// Events inside the window, in input order.
    pub events: Vec<&'a AnnotatedEvent>,
    /// Number of distinct periods (weeks, months or days) the whole history touches.
    pub total_windows: usize,
}

impl<'a> Window<'a> {
    /// Events a listing shows unless asked for everything.
    pub fn visible_events(&self, hide_complements: bool) -> Vec<&'a AnnotatedEvent> {
        self.events
            .iter()
            .copied()
            .filter(|e| e.included_search_entry && e.default_visible)
            .filter(|e| {
                !(hide_complements && e.search_label == SearchLabel::ChatBasedSearchComplement)
            })
            .collect()
    }

    /// Every event carrying a search query, counted or not.
    pub fn search_events(&self) -> Vec<&'a AnnotatedEvent> {
        self.events
            .iter()
            .copied()
            .filter(|e| e.is_search())
            .collect()
    }

    /// Whether no earlier window of this kind contains history.
    pub fn is_oldest(&self) -> bool {
        self.kind == PeriodKind::Full || self.index as usize + 1 >= self.total_windows
    }

    pub fn rank(&self, hide_complements: bool) -> RankedSummary {
        rank(self.events.iter().copied(), hide_complements)
    }
}

fn local_date<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Earliest and latest local dates in the history.
fn date_span<Tz: TimeZone>(events: &[AnnotatedEvent], tz: &Tz) -> Option<(NaiveDate, NaiveDate)> {
    let first = events.iter().map(|e| e.event.visited_at).min()?;
    let last = events.iter().map(|e| e.event.visited_at).max()?;
    Some((local_date(first, tz), local_date(last, tz)))
}

/// Count of distinct periods between the earliest and latest event, inclusive.
pub fn total_windows<Tz: TimeZone>(
    events: &[AnnotatedEvent],
    kind: PeriodKind,
    start_on_monday: bool,
    tz: &Tz,
) -> usize {
    let Some((first, last)) = date_span(events, tz) else {
        return 0;
    };
    let spanned = match kind {
        PeriodKind::Week => {
            (week_start(last, start_on_monday) - week_start(first, start_on_monday)).num_days() / 7
        }
        PeriodKind::Month => months_between(first, last),
        PeriodKind::Full => (last - first).num_days(),
    };
    usize::try_from(spanned).map_or(0, |n| n + 1)
}

fn build<'a, Tz: TimeZone>(
    events: &'a [AnnotatedEvent],
    kind: PeriodKind,
    offset: u32,
    first_day: NaiveDate,
    last_day: NaiveDate,
    total_windows: usize,
    tz: &Tz,
) -> Result<Window<'a>, WindowError> {
    let start = local_midnight_to_utc(tz, first_day);
    let end = local_end_of_day_to_utc(tz, last_day);

    if offset > 0 {
        let earliest = events.iter().map(|e| e.event.visited_at).min();
        if earliest.is_none_or(|earliest| end < earliest) {
            return Err(WindowError::BeforeHistory { kind, offset });
        }
    }

    let in_range: Vec<&AnnotatedEvent> = events
        .iter()
        .filter(|e| (start..=end).contains(&e.event.visited_at))
        .collect();

    tracing::debug!(%kind, offset, %start, %end, events = in_range.len(), "window");
    Ok(Window {
        kind,
        index: offset,
        start,
        end,
        first_day,
        last_day,
        events: in_range,
        total_windows,
    })
}

/// The week `offset` weeks before the one containing `now`.
pub fn window_by_week<'a, Tz: TimeZone>(
    events: &'a [AnnotatedEvent],
    offset: u32,
    start_on_monday: bool,
    now: &DateTime<Tz>,
) -> Result<Window<'a>, WindowError> {
    let kind = PeriodKind::Week;
    let tz = now.timezone();
    let current = week_start(now.date_naive(), start_on_monday);
    let first_day = current
        .checked_sub_days(Days::new(7 * u64::from(offset)))
        .ok_or(WindowError::OutOfRange { kind, offset })?;
    let last_day = first_day
        .checked_add_days(Days::new(6))
        .ok_or(WindowError::OutOfRange { kind, offset })?;
    let total = total_windows(events, kind, start_on_monday, &tz);
    build(events, kind, offset, first_day, last_day, total, &tz)
}

/// The calendar month `offset` months before the one containing `now`.
pub fn window_by_month<'a, Tz: TimeZone>(
    events: &'a [AnnotatedEvent],
    offset: u32,
    now: &DateTime<Tz>,
) -> Result<Window<'a>, WindowError> {
    let kind = PeriodKind::Month;
    let tz = now.timezone();
    let first_day =
        month_start(now.date_naive(), offset).ok_or(WindowError::OutOfRange { kind, offset })?;
    let last_day = month_end(first_day);
    let total = total_windows(events, kind, true, &tz);
    build(events, kind, offset, first_day, last_day, total, &tz)
}

/// The whole history, from its first event to its last.
///
/// Empty history yields an empty window at `now`.
pub fn full_history<'a, Tz: TimeZone>(
    events: &'a [AnnotatedEvent],
    now: &DateTime<Tz>,
) -> Window<'a> {
    let tz = now.timezone();
    let now_utc = now.with_timezone(&Utc);
    let start = events.first().map_or(now_utc, |e| e.event.visited_at);
    let end = events.last().map_or(now_utc, |e| e.event.visited_at);

    Window {
        kind: PeriodKind::Full,
        index: 0,
        start,
        end,
        first_day: local_date(start, &tz),
        last_day: local_date(end, &tz),
        events: events.iter().collect(),
        total_windows: total_windows(events, PeriodKind::Full, true, &tz),
    }
}
