//! Core types for a probing session
//!
//! Defines the request-scoped values flowing through the pipeline:
//! - Seed items handed in by the listing collaborator
//! - Candidates produced by the generator
//! - Probe outcomes and verified hits

use chrono::NaiveDate;
use scout_convention::{infer_date, ConventionKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Known reference to a product or listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedItem {
    /// Opaque product or card code
    pub id: String,
    /// Listing page the seed was found on
    pub source_url: String,
    /// Free-text title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Date observed on the listing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_date: Option<NaiveDate>,
}

impl SeedItem {
    /// Create new seed
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source_url: source_url.into(),
            title: None,
            observed_date: None,
        }
    }

    /// With title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// With observed date
    #[inline]
    #[must_use]
    pub fn with_observed_date(mut self, date: NaiveDate) -> Self {
        self.observed_date = Some(date);
        self
    }

    /// Title, or empty string
    #[inline]
    #[must_use]
    pub fn title_text(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// Base date for date-keyed conventions
    ///
    /// The observed date wins; otherwise a date embedded in the code, then
    /// one in the title.
    #[must_use]
    pub fn base_date(&self) -> Option<NaiveDate> {
        self.observed_date
            .or_else(|| infer_date(&self.id))
            .or_else(|| self.title.as_deref().and_then(infer_date))
    }
}

/// Generation tier, in priority order
///
/// Lower tiers survive truncation first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Direct asset for the code
    Direct,
    /// Sequence under an auto-derived prefix
    Derived,
    /// Sequence under a date-shifted prefix
    DateShifted,
    /// Sequence under an operator-supplied prefix
    Manual,
}

impl Tier {
    /// Stable lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Derived => "derived",
            Self::DateShifted => "date_shifted",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guessed, unverified asset locator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    /// Fully resolved locator
    pub locator: String,
    /// Name of the producing convention
    pub convention: String,
    /// Kind of the producing convention
    pub convention_kind: ConventionKind,
    /// Tier that produced it
    pub tier: Tier,
    /// Seed the candidate was generated for
    pub source_seed_id: String,
    /// Index within a sequence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_index: Option<u32>,
    /// Date shift applied to the prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_offset_days: Option<i32>,
    /// Sequence prefix (or code, for direct conventions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_value: Option<String>,
    /// Position in the seed's generated list
    pub ordinal: usize,
}

impl Candidate {
    /// Whether the candidate belongs to a numbered sequence
    #[inline]
    #[must_use]
    pub fn is_sequence(&self) -> bool {
        self.convention_kind.is_sequence()
    }

    /// Key identifying the sequence run this candidate belongs to
    #[must_use]
    pub fn run_key(&self) -> Option<(&str, &str)> {
        if !self.is_sequence() {
            return None;
        }
        self.prefix_value
            .as_deref()
            .map(|prefix| (self.convention.as_str(), prefix))
    }
}

/// Outcome reported by an existence check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Asset exists
    Found,
    /// Asset confirmed absent
    NotFound,
    /// Could not verify (transport failure)
    Error(String),
}

/// How much an operator can trust a hit without looking at it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Found via the product code or its own derived prefix
    Strong,
    /// Found via a date-shifted prefix; may belong to another production
    Plausible,
    /// Found via an operator hint
    Hinted,
}

impl From<Tier> for Confidence {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Direct | Tier::Derived => Self::Strong,
            Tier::DateShifted => Self::Plausible,
            Tier::Manual => Self::Hinted,
        }
    }
}

/// Candidate confirmed to resolve to a real asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedHit {
    /// The candidate that resolved
    pub candidate: Candidate,
    /// Trust level derived from the candidate's tier
    pub confidence: Confidence,
}

impl VerifiedHit {
    /// Create a hit from a confirmed candidate
    #[inline]
    #[must_use]
    pub fn new(candidate: Candidate) -> Self {
        let confidence = Confidence::from(candidate.tier);
        Self {
            candidate,
            confidence,
        }
    }

    /// Resolved locator
    #[inline]
    #[must_use]
    pub fn locator(&self) -> &str {
        &self.candidate.locator
    }
}
