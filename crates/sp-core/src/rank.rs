//! Search-system ranking.

use std::cmp::Reverse;

use serde::Serialize;

use crate::event::AnnotatedEvent;
use crate::label::SearchLabel;

/// Number of counted searches on one system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineCount {
    pub engine: String,
    pub count: usize,
}

/// Search systems ordered by share of use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RankedSummary {
    pub total_searches: usize,
    /// Descending by count; ties keep first-seen order.
    pub engines: Vec<EngineCount>,
}

impl RankedSummary {
    /// Share of `count` in the total, as a percentage.
    #[allow(clippy::cast_precision_loss)]
    pub const fn percentage(&self, count: usize) -> f64 {
        if self.total_searches == 0 {
            return 0.0;
        }
        count as f64 / self.total_searches as f64 * 100.0
    }

    /// The `n` most used systems.
    pub fn top(&self, n: usize) -> &[EngineCount] {
        &self.engines[..n.min(self.engines.len())]
    }

    /// Searches on systems below the top `n`.
    pub fn other_count(&self, n: usize) -> usize {
        self.engines.iter().skip(n).map(|e| e.count).sum()
    }

    pub fn system_count(&self) -> usize {
        self.engines.len()
    }
}

/// Whether an event contributes to the ranking.
fn counts_toward_ranking(event: &AnnotatedEvent, hide_complements: bool) -> bool {
    event.included_search_entry
        && event.search_engine.is_some()
        && event.search_label != SearchLabel::SiteSearch
        && !(hide_complements && event.search_label == SearchLabel::ChatBasedSearchComplement)
}

/// Counts searches per system and orders them by use.
pub fn rank<'a, I>(events: I, hide_complements: bool) -> RankedSummary
where
    I: IntoIterator<Item = &'a AnnotatedEvent>,
{
    let mut engines: Vec<EngineCount> = Vec::new();
    for event in events {
        if !counts_toward_ranking(event, hide_complements) {
            continue;
        }
        let Some(engine) = event.search_engine.as_deref() else {
            continue;
        };
        match engines.iter_mut().find(|e| e.engine == engine) {
            Some(existing) => existing.count += 1,
            None => engines.push(EngineCount {
                engine: engine.to_string(),
                count: 1,
            }),
        }
    }

    let total_searches = engines.iter().map(|e| e.count).sum();
    engines.sort_by_key(|e| Reverse(e.count));
    RankedSummary {
        total_searches,
        engines,
    }
}
