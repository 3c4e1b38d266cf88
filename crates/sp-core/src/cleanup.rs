//! Site-specific duplicate and redirect predicates.
//!
//! Some search providers rewrite their URL one or more times after a query is
//! submitted. Each handler inspects a candidate URL against the rolling
//! window and decides whether the candidate is a fresh search or an artifact
//! of the one before it.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::rolling::RollingWindow;

/// Named predicate variants, selected by prefix in the rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupHandler {
    /// perplexity.ai: `/search/?q=...` is rewritten to `/search/<slug>-<guid>`.
    Perplexity,
}

/// Outcome of a cleanup predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupVerdict {
    /// A fresh search.
    Countable,
    /// Identical to the previous entry, ignoring `www.`.
    SameUrl,
    /// Same page as the previous entry with a different query string.
    SamePage,
    /// The slugged rewrite of the previous entry's query.
    GuidVariant,
    /// Any other follow-up navigation inside an ongoing session.
    FollowUp,
}

impl CleanupVerdict {
    pub const fn is_countable(self) -> bool {
        matches!(self, Self::Countable)
    }
}

impl CleanupHandler {
    /// Runs this handler's predicate. `prefix` is the rule prefix that routed here.
    pub fn check(self, url: &str, prefix: &str, window: &RollingWindow) -> CleanupVerdict {
        match self {
            Self::Perplexity => perplexity(url, prefix, window),
        }
    }
}

/// The URL up to (not including) its query string.
pub(crate) fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

pub(crate) fn without_www(url: &str) -> String {
    url.replace("www.", "")
}

/// Host named by a handler prefix, without `www.`.
fn provider_host(prefix: &str) -> String {
    Url::parse(prefix)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .map_or_else(|| without_www(prefix), |host| without_www(&host))
}

fn perplexity(url: &str, prefix: &str, window: &RollingWindow) -> CleanupVerdict {
    let Some(last) = window.last() else {
        return CleanupVerdict::Countable;
    };
    if window.len() <= 1 {
        return CleanupVerdict::Countable;
    }
    if without_www(url) == without_www(&last.url) {
        return CleanupVerdict::SameUrl;
    }

    let host = provider_host(prefix);
    let session_active = window.recent(3).any(|entry| entry.url.contains(&host));
    if !session_active && !window.contains_url(url) {
        return CleanupVerdict::Countable;
    }

    // the provider toggles a `copilot` flag in the query string; comparing
    // bases ignores it along with every other parameter
    if strip_query(url).trim_end_matches('/') == strip_query(&last.url).trim_end_matches('/') {
        return CleanupVerdict::SamePage;
    }
    if is_guid_variant(url, &last.url, prefix) {
        return CleanupVerdict::GuidVariant;
    }
    CleanupVerdict::FollowUp
}

/// Whether `candidate` (`<prefix>?q=<terms>`) is the query that `reference`
/// (`<prefix><slug>-<guid>`) was slugged from.
///
/// The reference's path after `prefix` is split on `-`, its last token
/// dropped, and the remainder compared against the start of the candidate's
/// decoded query with spaces written as `-`.
pub fn is_guid_variant(candidate: &str, reference: &str, prefix: &str) -> bool {
    let slugged = reference.strip_prefix(prefix).unwrap_or(reference);
    let tokens: Vec<&str> = slugged.split('-').collect();
    let stem = tokens[..tokens.len().saturating_sub(1)].join("-");

    let query = candidate
        .split_once('?')
        .and_then(|(_, query)| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, value)| key == "q" && !value.is_empty())
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_default();

    query.replace(' ', "-").starts_with(&stem)
}
