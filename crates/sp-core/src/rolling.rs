//! Bounded buffer of recently accepted search events.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

/// One accepted search in the rolling window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowEntry {
    /// Position of the annotated event in the classifier output.
    pub index: usize,
    pub url: String,
    pub visited_at: DateTime<Utc>,
}

/// The last `capacity` search-bearing events, oldest first.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    entries: VecDeque<WindowEntry>,
    capacity: usize,
}

impl RollingWindow {
    /// Creates an empty window. A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&WindowEntry> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WindowEntry> {
        self.entries.iter()
    }

    /// The newest `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &WindowEntry> {
        self.entries
            .iter()
            .skip(self.entries.len().saturating_sub(n))
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.entries.iter().any(|entry| entry.url == url)
    }

    /// Appends an entry, evicting the oldest one when full.
    pub fn push(&mut self, entry: WindowEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::with_capacity(crate::classify::DEFAULT_ROLLING_WINDOW)
    }
}
