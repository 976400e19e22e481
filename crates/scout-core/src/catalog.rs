//! Catalog structures handed back to the caller

use crate::troupe::Troupe;
use crate::types::{SeedItem, VerifiedHit};
use chrono::NaiveDate;
use indexmap::IndexMap;
use scout_convention::ConventionKind;
use serde::Serialize;

/// Sort key for presenting seeds most-recent-first
///
/// Any date sorts after (is more recent than) any bare code number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Recency {
    /// Numeric part of a monotonically assigned code
    Code(u64),
    /// Observed or inferred date
    Date(NaiveDate),
}

impl Recency {
    /// Recency key of `seed`, if it carries one
    ///
    /// The seed's base date is preferred. Without one, the last run of
    /// digits in the code is used.
    #[must_use]
    pub fn of(seed: &SeedItem) -> Option<Self> {
        seed.base_date()
            .map(Self::Date)
            .or_else(|| code_number(&seed.id).map(Self::Code))
    }
}

fn code_number(code: &str) -> Option<u64> {
    code.split(|c: char| !c.is_ascii_digit())
        .rfind(|run| !run.is_empty())
        .and_then(|run| run.parse().ok())
}

/// Hits of one sequence run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceGroup {
    /// Producing convention
    pub convention: String,
    /// Kind of the producing convention
    pub kind: ConventionKind,
    /// Shared prefix
    pub prefix_value: String,
    /// Date shift of the prefix (0 for the primary prefix)
    pub date_offset_days: i32,
    /// Troupe of the seed, for display grouping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub troupe: Option<Troupe>,
    /// Hits in ascending sequence index
    pub hits: Vec<VerifiedHit>,
}

/// Classified hits of one seed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerSeedCatalog {
    /// Seed the hits belong to
    pub seed_id: String,
    /// Troupe inferred from the title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub troupe: Option<Troupe>,
    /// Presentation sort key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recency: Option<Recency>,
    /// Direct-asset hits
    pub direct: Vec<VerifiedHit>,
    /// Sequence groups, primary prefixes first
    pub sequences: Vec<SequenceGroup>,
    /// Hits found only through operator-supplied prefixes
    pub unknown_prefix_hits: Vec<VerifiedHit>,
}

impl PerSeedCatalog {
    /// Empty catalog for `seed_id`
    #[must_use]
    pub fn empty(seed_id: impl Into<String>) -> Self {
        Self {
            seed_id: seed_id.into(),
            troupe: None,
            recency: None,
            direct: Vec::new(),
            sequences: Vec::new(),
            unknown_prefix_hits: Vec::new(),
        }
    }

    /// Total number of hits
    #[must_use]
    pub fn hit_count(&self) -> usize {
        self.direct.len()
            + self.sequences.iter().map(|g| g.hits.len()).sum::<usize>()
            + self.unknown_prefix_hits.len()
    }

    /// Whether nothing was found
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hit_count() == 0
    }

    /// All hits in catalog order: direct, sequences, then unknown
    pub fn hits(&self) -> impl Iterator<Item = &VerifiedHit> {
        self.direct
            .iter()
            .chain(self.sequences.iter().flat_map(|g| g.hits.iter()))
            .chain(self.unknown_prefix_hits.iter())
    }
}

/// Session catalog across all seeds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    /// Per-seed catalogs in presentation order
    pub per_seed: IndexMap<String, PerSeedCatalog>,
    /// Every verified locator once, in presentation order
    pub merged_order: Vec<String>,
    /// Whether results may be incomplete
    pub truncated: bool,
}

impl Catalog {
    /// Catalog for one seed
    #[inline]
    #[must_use]
    pub fn seed(&self, seed_id: &str) -> Option<&PerSeedCatalog> {
        self.per_seed.get(seed_id)
    }

    /// Number of distinct verified locators
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.merged_order.len()
    }

    /// Whether nothing was found
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.merged_order.is_empty()
    }
}
