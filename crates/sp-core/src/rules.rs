//! Static rule tables that drive classification.
//!
//! A [`RuleSet`] is loaded once (built-in defaults, optionally extended from
//! configuration) and read-only for the rest of a run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cleanup::CleanupHandler;

/// Errors from validating a rule set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("empty prefix in {table}")]
    EmptyPrefix { table: &'static str },

    #[error("landing-page-only system {url} is not an included search system")]
    LandingPageNotIncluded { url: String },

    #[error("chat-based complement {url} is not an included search system")]
    ComplementNotIncluded { url: String },
}

/// A site prefix paired with a stricter prefix that URLs on the site must
/// (inclusion) or must not (exclusion) start with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixRule {
    pub site: String,
    pub prefix: String,
}

impl PrefixRule {
    fn new(site: &str, prefix: &str) -> Self {
        Self {
            site: site.to_string(),
            prefix: prefix.to_string(),
        }
    }
}

/// Routes URLs under `prefix` to a site-specific duplicate predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupRule {
    pub prefix: String,
    pub handler: CleanupHandler,
}

/// All rule classes consulted by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Prefixes that disqualify a URL. A leading `*` makes the rest a substring match.
    pub skip_domains: Vec<String>,
    /// Prefixes labelled `site_search`.
    pub site_search_domains: Vec<String>,
    /// Systems that search without a recoverable query string.
    pub included_search_systems: Vec<String>,
    /// Conversational systems among the included ones.
    pub chat_based_search_complements: Vec<String>,
    /// Exact URLs whose bare visit still counts.
    pub landing_page_only_search_systems: Vec<String>,
    pub inclusion_rules: Vec<PrefixRule>,
    pub exclusion_rules: Vec<PrefixRule>,
    pub cleanup_handlers: Vec<CleanupRule>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            skip_domains: strings(&[
                "http://localhost",
                "https://instantdomains.com",
                "*.vercel.app",
            ]),
            site_search_domains: strings(&[
                "https://searchjunct.com",
                "https://instantdomains.com",
                "https://danielsgriffin.com",
                "https://twitter.com",
                "https://www.tiktok.com",
                "https://github.com",
            ]),
            included_search_systems: strings(&[
                "https://www.findera.ai/",
                "https://you.com/",
                "https://chat.openai.com/",
                "https://copilot.microsoft.com/",
                "https://andisearch.com/",
                "https://www.perplexity.ai/search",
                "https://komo.ai/",
                "https://coral.cohere.com/",
                "https://app.tavily.com/playground",
                "https://huggingface.co/chat/",
                "https://search.lepton.run/",
                "https://morphic.sh/",
                "https://gemini.google.com/app",
                "https://claude.ai/chat/",
            ]),
            chat_based_search_complements: strings(&[
                "https://claude.ai/chat/",
                "https://chat.openai.com/",
                "https://gemini.google.com/app",
            ]),
            landing_page_only_search_systems: strings(&["https://copilot.microsoft.com/"]),
            inclusion_rules: vec![
                PrefixRule::new("https://www.tiktok.com", "https://www.tiktok.com/search?q="),
                PrefixRule::new(
                    "https://www.perplexity.ai",
                    "https://www.perplexity.ai/search",
                ),
            ],
            // Google wraps outbound links from other products in /url?q=
            exclusion_rules: vec![PrefixRule::new(
                "https://www.google.com/",
                "https://www.google.com/url?q=",
            )],
            cleanup_handlers: vec![CleanupRule {
                prefix: "https://www.perplexity.ai/search/".to_string(),
                handler: CleanupHandler::Perplexity,
            }],
        }
    }
}

fn starts_with_any(url: &str, prefixes: &[String]) -> bool {
    prefixes
        .iter()
        .any(|prefix| url.starts_with(prefix.as_str()))
}

impl RuleSet {
    /// An empty rule set: nothing is included, skipped or cleaned up.
    pub const fn empty() -> Self {
        Self {
            skip_domains: Vec::new(),
            site_search_domains: Vec::new(),
            included_search_systems: Vec::new(),
            chat_based_search_complements: Vec::new(),
            landing_page_only_search_systems: Vec::new(),
            inclusion_rules: Vec::new(),
            exclusion_rules: Vec::new(),
            cleanup_handlers: Vec::new(),
        }
    }

    pub fn is_included_search_system(&self, url: &str) -> bool {
        starts_with_any(url, &self.included_search_systems)
    }

    pub fn is_chat_based_complement(&self, url: &str) -> bool {
        starts_with_any(url, &self.chat_based_search_complements)
    }

    pub fn is_site_search(&self, url: &str) -> bool {
        starts_with_any(url, &self.site_search_domains)
    }

    /// Whether the URL is exactly the bare entry point of an included system.
    pub fn is_landing_page(&self, url: &str) -> bool {
        self.included_search_systems.iter().any(|item| item == url)
    }

    pub fn is_landing_page_only(&self, url: &str) -> bool {
        self.landing_page_only_search_systems
            .iter()
            .any(|item| item == url)
    }

    pub fn is_skipped(&self, url: &str) -> bool {
        self.skip_domains.iter().any(|skip| {
            url.starts_with(skip.as_str())
                || skip
                    .strip_prefix('*')
                    .is_some_and(|suffix| url.contains(suffix))
        })
    }

    /// Whether a site-specific inclusion or exclusion rule rejects the URL.
    pub fn violates_site_rules(&self, url: &str) -> bool {
        let misses_required = self
            .inclusion_rules
            .iter()
            .any(|rule| {
                url.starts_with(rule.site.as_str()) && !url.starts_with(rule.prefix.as_str())
            });
        let hits_forbidden = self
            .exclusion_rules
            .iter()
            .any(|rule| {
                url.starts_with(rule.site.as_str()) && url.starts_with(rule.prefix.as_str())
            });
        misses_required || hits_forbidden
    }

    /// The first cleanup rule whose prefix the URL starts with.
    pub fn cleanup_for(&self, url: &str) -> Option<&CleanupRule> {
        self.cleanup_handlers
            .iter()
            .find(|rule| url.starts_with(rule.prefix.as_str()))
    }

    /// Checks the tables for entries that could never match consistently.
    pub fn validate(&self) -> Result<(), RuleError> {
        let tables: [(&'static str, &[String]); 5] = [
            ("skip_domains", &self.skip_domains),
            ("site_search_domains", &self.site_search_domains),
            ("included_search_systems", &self.included_search_systems),
            (
                "chat_based_search_complements",
                &self.chat_based_search_complements,
            ),
            (
                "landing_page_only_search_systems",
                &self.landing_page_only_search_systems,
            ),
        ];
        for (table, entries) in tables {
            if entries
                .iter()
                .any(|entry| entry.trim_start_matches('*').is_empty())
            {
                return Err(RuleError::EmptyPrefix { table });
            }
        }

        let rule_prefixes = self
            .inclusion_rules
            .iter()
            .chain(&self.exclusion_rules)
            .flat_map(|rule| [&rule.site, &rule.prefix])
            .chain(self.cleanup_handlers.iter().map(|rule| &rule.prefix));
        for prefix in rule_prefixes {
            if prefix.is_empty() {
                return Err(RuleError::EmptyPrefix {
                    table: "site rules",
                });
            }
        }

        if let Some(url) = self
            .landing_page_only_search_systems
            .iter()
            .find(|url| !self.is_landing_page(url))
        {
            return Err(RuleError::LandingPageNotIncluded { url: url.clone() });
        }
        if let Some(url) = self
            .chat_based_search_complements
            .iter()
            .find(|url| !self.is_included_search_system(url))
        {
            return Err(RuleError::ComplementNotIncluded { url: url.clone() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(RuleSet::default().validate(), Ok(()));
        assert_eq!(RuleSet::empty().validate(), Ok(()));
    }

    #[test]
    fn included_systems_match_by_prefix() {
        let rules = RuleSet::default();
        assert!(rules.is_included_search_system("https://claude.ai/chat/0b1c"));
        assert!(rules.is_included_search_system("https://www.perplexity.ai/search/foo-abc"));
        assert!(!rules.is_included_search_system("https://claude.ai/"));
    }

    #[test]
    fn landing_pages_match_exactly() {
        let rules = RuleSet::default();
        assert!(rules.is_landing_page("https://you.com/"));
        assert!(!rules.is_landing_page("https://you.com/search?q=x"));
        assert!(rules.is_landing_page_only("https://copilot.microsoft.com/"));
        assert!(!rules.is_landing_page_only("https://you.com/"));
    }

    #[test]
    fn wildcard_skip_entries_match_anywhere() {
        let rules = RuleSet::default();
        assert!(rules.is_skipped("https://my-app.vercel.app/search?q=test"));
        assert!(rules.is_skipped("http://localhost:3000/?q=x"));
        assert!(!rules.is_skipped("https://www.google.com/search?q=vercel"));
    }

    #[test]
    fn site_rules() {
        let rules = RuleSet::default();
        // inclusion: tiktok URLs must be searches
        assert!(rules.violates_site_rules("https://www.tiktok.com/@someone?q=x"));
        assert!(!rules.violates_site_rules("https://www.tiktok.com/search?q=x"));
        // exclusion: google redirect wrappers
        assert!(rules.violates_site_rules("https://www.google.com/url?q=https://example.com"));
        assert!(!rules.violates_site_rules("https://www.google.com/search?q=cats"));
    }

    #[test]
    fn cleanup_lookup_uses_prefix() {
        let rules = RuleSet::default();
        let rule = rules
            .cleanup_for("https://www.perplexity.ai/search/?q=rust")
            .unwrap();
        assert_eq!(rule.handler, CleanupHandler::Perplexity);
        assert!(rules.cleanup_for("https://www.perplexity.ai/search").is_none());
    }

    #[test]
    fn validate_rejects_empty_prefix() {
        let mut rules = RuleSet::default();
        rules.skip_domains.push("*".to_string());
        assert_eq!(
            rules.validate(),
            Err(RuleError::EmptyPrefix {
                table: "skip_domains"
            })
        );
    }

    #[test]
    fn validate_rejects_unreachable_landing_page() {
        let mut rules = RuleSet::default();
        rules
            .landing_page_only_search_systems
            .push("https://example.com/".to_string());
        let err = rules.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "landing-page-only system https://example.com/ is not an included search system"
        );
    }

    #[test]
    fn partial_table_keeps_remaining_defaults() {
        let rules: RuleSet =
            serde_json::from_str(r#"{"skip_domains": ["https://intranet.example"]}"#).unwrap();
        assert_eq!(rules.skip_domains, ["https://intranet.example"]);
        assert_eq!(rules.included_search_systems.len(), 14);
        assert_eq!(rules.cleanup_handlers.len(), 1);
    }
}
