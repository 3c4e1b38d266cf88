//! Search label enum as the single source of truth for label strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Why an event is, or is not, counted as a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SearchLabel {
    /// Ordinary search with nothing special about it.
    #[default]
    None,
    /// A search inside a single site rather than a search system.
    SiteSearch,
    /// A duplicate or redirect artifact of the preceding search.
    Redirect,
    /// A conversational system that complements search.
    ChatBasedSearchComplement,
    /// A search system that does not expose the query in its URL.
    NotUrlBased,
    /// The bare landing page of a search system.
    LandingPage,
    /// The bare landing page of a system that only ever searches from there.
    LandingPageOnlySearchSystem,
}

impl SearchLabel {
    /// String representation used in output and configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::SiteSearch => "site_search",
            Self::Redirect => "redirect",
            Self::ChatBasedSearchComplement => "chat_based_search_complement",
            Self::NotUrlBased => "not_url_based",
            Self::LandingPage => "landing_page",
            Self::LandingPageOnlySearchSystem => "landing_page_only_search_system",
        }
    }

    /// Whether an event carrying this label may count toward usage statistics.
    #[must_use]
    pub const fn is_countable(self) -> bool {
        !matches!(self, Self::Redirect | Self::LandingPage)
    }
}

impl fmt::Display for SearchLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SearchLabel {
    type Err = UnknownSearchLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" | "" => Ok(Self::None),
            "site_search" => Ok(Self::SiteSearch),
            "redirect" => Ok(Self::Redirect),
            // hyphenated spellings appear in older cached histories
            "chat_based_search_complement" | "chat-based-search-complement" => {
                Ok(Self::ChatBasedSearchComplement)
            }
            "not_url_based" | "not-url-based" => Ok(Self::NotUrlBased),
            "landing_page" => Ok(Self::LandingPage),
            "landing_page_only_search_system" => Ok(Self::LandingPageOnlySearchSystem),
            _ => Err(UnknownSearchLabel(s.to_string())),
        }
    }
}

impl Serialize for SearchLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SearchLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown label strings.
#[derive(Debug, Clone)]
pub struct UnknownSearchLabel(String);

impl fmt::Display for UnknownSearchLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown search label: {}", self.0)
    }
}

impl std::error::Error for UnknownSearchLabel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_variants() {
        let variants = [
            SearchLabel::None,
            SearchLabel::SiteSearch,
            SearchLabel::Redirect,
            SearchLabel::ChatBasedSearchComplement,
            SearchLabel::NotUrlBased,
            SearchLabel::LandingPage,
            SearchLabel::LandingPageOnlySearchSystem,
        ];

        for variant in &variants {
            let s = variant.to_string();
            let parsed: SearchLabel = s.parse().expect("should parse");
            assert_eq!(parsed, *variant, "roundtrip failed for {variant:?}");
        }
    }

    #[test]
    fn hyphenated_aliases_parse() {
        let complement: SearchLabel = "chat-based-search-complement"
            .parse()
            .expect("should parse");
        assert_eq!(complement, SearchLabel::ChatBasedSearchComplement);

        let not_url: SearchLabel = "not-url-based".parse().expect("should parse");
        assert_eq!(not_url, SearchLabel::NotUrlBased);
    }

    #[test]
    fn unknown_label_errors() {
        let err = "duplicate".parse::<SearchLabel>().unwrap_err();
        assert_eq!(err.to_string(), "unknown search label: duplicate");
    }

    #[test]
    fn redirect_and_bare_landing_pages_are_not_countable() {
        assert!(!SearchLabel::Redirect.is_countable());
        assert!(!SearchLabel::LandingPage.is_countable());
        assert!(SearchLabel::LandingPageOnlySearchSystem.is_countable());
        assert!(SearchLabel::SiteSearch.is_countable());
    }

    #[test]
    fn serializes_as_snake_case_string() {
        let json = serde_json::to_string(&SearchLabel::ChatBasedSearchComplement).unwrap();
        assert_eq!(json, "\"chat_based_search_complement\"");
    }
}
