//! Search classification.
//!
//! Walks an ordered sequence of [`Event`]s once, oldest first, and decides for
//! each whether it is a search, which system ran it, what was asked, and
//! whether it counts toward usage statistics.
//!
//! # Algorithm Summary
//!
//! 1. Countability: included search systems always qualify; anything else
//!    needs a visit, a query-parameter pattern, and must survive the site
//!    rules, skip list and any site-specific cleanup predicate
//! 2. Query extraction from `q`, `query` or `p`, falling back to a
//!    placeholder for systems that keep the query out of the URL
//! 3. Labelling (site search, redirect, landing page)
//! 4. Rolling-window bookkeeping: near-simultaneous reloads of the same page
//!    are kept out of the window, and provider rewrites relabel the
//!    superseded event as a redirect
//!
//! The rolling window is the only state carried between events, so the
//! result depends on input order. Callers must pass events in ascending time
//! order (see [`crate::resolve_events`]).

use chrono::{DateTime, Duration, Utc};
use url::Url;

use crate::cleanup::{CleanupVerdict, strip_query, without_www};
use crate::event::{AnnotatedEvent, Event, EventError};
use crate::label::SearchLabel;
use crate::rolling::{RollingWindow, WindowEntry};
use crate::rules::RuleSet;

/// Query text recorded for systems that search without exposing the query.
pub const QUERY_PLACEHOLDER: &str = "...";

/// Default number of accepted searches remembered by the rolling window.
pub const DEFAULT_ROLLING_WINDOW: usize = 256;

/// Substrings that mark a URL as a likely search.
const SEARCH_PATTERNS: [&str; 5] = ["search?q=", "search/web?q=", "query=", "search?p=", "q="];

/// Query parameters holding the search terms, in priority order.
const QUERY_PARAMS: [&str; 3] = ["q", "query", "p"];

/// Two visits at most this far apart are the same navigation.
const SAME_NAVIGATION_MS: i64 = 1000;

/// Configuration for classification.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Capacity of the rolling window.
    /// Default: 256.
    pub rolling_window: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rolling_window: DEFAULT_ROLLING_WINDOW,
        }
    }
}

/// Classifies events with the default configuration.
pub fn classify(events: &[Event], rules: &RuleSet) -> Vec<AnnotatedEvent> {
    classify_with(events, rules, &ClassifierConfig::default())
}

/// Classifies events in order. The output has the same length and order as
/// the input.
pub fn classify_with(
    events: &[Event],
    rules: &RuleSet,
    config: &ClassifierConfig,
) -> Vec<AnnotatedEvent> {
    let mut classifier = Classifier::new(rules, config);
    for event in events {
        classifier.push(event);
    }
    let searches = classifier
        .output
        .iter()
        .filter(|e| e.included_search_entry)
        .count();
    tracing::debug!(events = events.len(), searches, "classified history");
    classifier.output
}

struct Classifier<'r> {
    rules: &'r RuleSet,
    window: RollingWindow,
    output: Vec<AnnotatedEvent>,
}

impl<'r> Classifier<'r> {
    fn new(rules: &'r RuleSet, config: &ClassifierConfig) -> Self {
        Self {
            rules,
            window: RollingWindow::with_capacity(config.rolling_window),
            output: Vec::new(),
        }
    }

    fn push(&mut self, event: &Event) {
        let annotated = match Url::parse(&event.url) {
            Ok(parsed) => self.annotate(event, &parsed),
            Err(source) => {
                let e = EventError::MalformedUrl {
                    url: event.url.clone(),
                    source,
                };
                tracing::debug!(error = %e, "not a search");
                AnnotatedEvent::not_a_search(event.clone())
            }
        };
        self.output.push(annotated);
    }

    fn cleanup_verdict(&self, url: &str) -> CleanupVerdict {
        self.rules
            .cleanup_for(url)
            .map_or(CleanupVerdict::Countable, |rule| {
                rule.handler.check(url, &rule.prefix, &self.window)
            })
    }

    fn is_countable(&self, event: &Event, verdict: CleanupVerdict) -> bool {
        let url = event.url.as_str();
        if self.rules.is_included_search_system(url) {
            return true;
        }
        event.visit_count > 0
            && SEARCH_PATTERNS.iter().any(|pattern| url.contains(pattern))
            && !self.rules.violates_site_rules(url)
            && !self.rules.is_skipped(url)
            && verdict.is_countable()
    }

    fn annotate(&mut self, event: &Event, parsed: &Url) -> AnnotatedEvent {
        let url = event.url.as_str();
        let mut annotated = AnnotatedEvent::not_a_search(event.clone());
        if parsed.host_str().is_none_or(str::is_empty) {
            return annotated;
        }

        let verdict = self.cleanup_verdict(url);
        if !self.is_countable(event, verdict) {
            return annotated;
        }

        if let Some(query) = extract_query(parsed) {
            annotated.search_query = Some(query);
        } else if self.rules.is_included_search_system(url) {
            annotated.search_query = Some(QUERY_PLACEHOLDER.to_string());
            annotated.search_label = if self.rules.is_chat_based_complement(url) {
                SearchLabel::ChatBasedSearchComplement
            } else {
                SearchLabel::NotUrlBased
            };
        }

        if self.rules.is_site_search(url) {
            annotated.search_label = SearchLabel::SiteSearch;
        }
        if !verdict.is_countable() {
            tracing::debug!(url, ?verdict, "redirect");
            annotated.search_label = SearchLabel::Redirect;
        }

        if annotated
            .search_query
            .as_deref()
            .is_some_and(|q| !q.is_empty())
        {
            annotated.search_engine = engine_name(parsed);
        }

        if self.rules.is_landing_page(url) {
            annotated.search_label = if self.rules.is_landing_page_only(url) {
                SearchLabel::LandingPageOnlySearchSystem
            } else {
                SearchLabel::LandingPage
            };
        }

        annotated.included_search_entry = annotated.search_label.is_countable();
        annotated.default_visible = annotated.search_label != SearchLabel::SiteSearch;

        if annotated.is_search() {
            self.remember(event, annotated.search_label);
        }
        annotated
    }

    /// Adds an accepted search to the rolling window.
    ///
    /// A reload of the same page within a second is not remembered. A
    /// different URL within a second under the same cleanup prefix means the
    /// provider rewrote the previous URL, so the previous event becomes a
    /// redirect.
    fn remember(&mut self, event: &Event, label: SearchLabel) {
        let url = event.url.as_str();
        let index = self.output.len();

        if let Some(last) = self.window.last() {
            let close = within_same_navigation(event.visited_at, last.visited_at);
            if close && strip_query(url) == strip_query(&last.url) {
                return;
            }
            if close
                && label != SearchLabel::Redirect
                && self.shares_cleanup_prefix(url, &last.url)
            {
                let previous = last.index;
                if let Some(prev) = self.output.get_mut(previous) {
                    tracing::debug!(url = %prev.event.url, "superseded by provider rewrite");
                    prev.mark_redirect();
                }
            }
        }

        self.window.push(WindowEntry {
            index,
            url: url.to_string(),
            visited_at: event.visited_at,
        });
    }

    fn shares_cleanup_prefix(&self, url: &str, previous: &str) -> bool {
        let (url, previous) = (without_www(url), without_www(previous));
        self.rules.cleanup_handlers.iter().any(|rule| {
            let prefix = without_www(&rule.prefix);
            url.starts_with(&prefix) && previous.starts_with(&prefix)
        })
    }
}

fn within_same_navigation(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    (a - b).abs() <= Duration::milliseconds(SAME_NAVIGATION_MS)
}

/// The first non-empty value of `q`, `query` or `p`, form-decoded.
fn extract_query(parsed: &Url) -> Option<String> {
    QUERY_PARAMS.iter().find_map(|name| {
        parsed
            .query_pairs()
            .find(|(key, value)| key == name && !value.is_empty())
            .map(|(_, value)| value.into_owned())
    })
}

/// Host without a leading `www.`, keeping any explicit port.
fn engine_name(parsed: &Url) -> Option<String> {
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    Some(match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
