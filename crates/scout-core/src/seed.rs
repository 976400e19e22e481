//! Seed selection by title tokens

use crate::types::SeedItem;

/// AND-combined, case-insensitive title filter
///
/// An empty filter keeps every seed. Seeds without a title only pass an
/// empty filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedFilter {
    tokens: Vec<String>,
}

impl SeedFilter {
    /// Create filter from tokens; blank tokens are ignored
    #[must_use]
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { tokens }
    }

    /// Parse whitespace-separated tokens
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::new(text.split_whitespace())
    }

    /// Whether the filter keeps everything
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Check one seed
    #[must_use]
    pub fn matches(&self, seed: &SeedItem) -> bool {
        if self.tokens.is_empty() {
            return true;
        }
        let title = seed.title_text().to_lowercase();
        self.tokens.iter().all(|t| title.contains(t.as_str()))
    }

    /// Keep the matching seeds, preserving order
    #[must_use]
    pub fn apply(&self, seeds: Vec<SeedItem>) -> Vec<SeedItem> {
        let before = seeds.len();
        let kept: Vec<SeedItem> = seeds.into_iter().filter(|s| self.matches(s)).collect();
        if kept.len() != before {
            tracing::debug!(before, after = kept.len(), "seeds filtered by title");
        }
        kept
    }
}
