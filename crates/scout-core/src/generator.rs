//! Candidate generation
//!
//! Turns one seed into an ordered, deduplicated list of candidate
//! locators. Tiers are emitted in priority order:
//! 1. direct assets for the code (primary, then alternate)
//! 2. auto-derived prefixes × sequence range
//! 3. date-shifted prefixes × sequence range
//! 4. operator prefixes × sequence range
//!
//! The first occurrence of a locator wins, so a locator reachable from two
//! tiers keeps the more trusted one. The list is then capped; capping is
//! reported through [`CandidateList::truncated`], never as an error.

use crate::config::GenerateOptions;
use crate::error::ConfigError;
use crate::types::{Candidate, SeedItem, Tier};
use scout_convention::{Convention, ConventionKind, ConventionRegistry, PrefixInput};
use std::collections::HashSet;

/// Ordered candidates for one seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateList {
    /// Seed the list was generated for
    pub seed_id: String,
    /// Candidates in priority order, locators unique
    pub candidates: Vec<Candidate>,
    /// Whether the cap removed candidates
    pub truncated: bool,
    /// Number of candidates removed by the cap
    pub dropped: usize,
}

impl CandidateList {
    /// Number of candidates kept
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether no candidate was produced
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Candidate generator bound to a registry and validated options
#[derive(Debug, Clone)]
pub struct CandidateGenerator<'r> {
    registry: &'r ConventionRegistry,
    options: GenerateOptions,
    shifts: Vec<i32>,
    extra_prefixes: Vec<String>,
}

impl<'r> CandidateGenerator<'r> {
    /// Create generator
    ///
    /// # Errors
    /// Returns `ConfigError` if `options` are invalid.
    pub fn new(registry: &'r ConventionRegistry, options: GenerateOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self::from_validated(registry, options))
    }

    pub(crate) fn from_validated(registry: &'r ConventionRegistry, options: GenerateOptions) -> Self {
        Self {
            registry,
            shifts: options.ordered_shifts(),
            extra_prefixes: options.cleaned_extra_prefixes(),
            options,
        }
    }

    /// Generate candidates for `seed`
    #[must_use]
    pub fn generate(&self, seed: &SeedItem) -> CandidateList {
        let mut list = ListBuilder::new(&seed.id);

        for direct in self.registry.direct(&seed.id) {
            list.push(Draft {
                locator: direct.locator,
                convention: direct.convention,
                tier: Tier::Direct,
                sequence_index: None,
                date_offset_days: None,
                prefix_value: Some(direct.code),
            });
        }
        let direct_count = list.len();

        let input = PrefixInput::new(&seed.id, seed.base_date());
        let derived = self.registry.derive_prefixes(&input, &self.shifts);

        for prefix in derived.iter().filter(|p| p.offset_days == 0) {
            self.push_sequence(&mut list, prefix.convention, &prefix.value, 0, Tier::Derived);
        }
        let derived_count = list.len() - direct_count;

        for prefix in derived.iter().filter(|p| p.offset_days != 0) {
            self.push_sequence(
                &mut list,
                prefix.convention,
                &prefix.value,
                prefix.offset_days,
                Tier::DateShifted,
            );
        }
        let shifted_count = list.len() - direct_count - derived_count;

        let derived_runs: HashSet<(&str, &str)> = derived
            .iter()
            .map(|p| (p.convention.name.as_str(), p.value.as_str()))
            .collect();
        for prefix in &self.extra_prefixes {
            for convention in self.registry.of_kind(ConventionKind::Sequence) {
                // an already derived run would only repeat its locators
                if derived_runs.contains(&(convention.name.as_str(), prefix.as_str())) {
                    continue;
                }
                self.push_sequence(&mut list, convention, prefix, 0, Tier::Manual);
            }
        }
        let manual_count = list.len() - direct_count - derived_count - shifted_count;

        let result = list.finish(self.options.max_candidates);
        tracing::debug!(
            seed = %seed.id,
            direct = direct_count,
            derived = derived_count,
            shifted = shifted_count,
            manual = manual_count,
            kept = result.len(),
            dropped = result.dropped,
            "generated candidates"
        );
        result
    }

    fn push_sequence(
        &self,
        list: &mut ListBuilder<'_>,
        convention: &Convention,
        prefix: &str,
        offset_days: i32,
        tier: Tier,
    ) {
        let base = self.registry.base_url();
        for index in self.options.sequence_range.indices() {
            list.push(Draft {
                locator: convention.sequence_locator(base, prefix, index),
                convention,
                tier,
                sequence_index: Some(index),
                date_offset_days: Some(offset_days),
                prefix_value: Some(prefix.to_string()),
            });
        }
    }
}

/// Generate candidates for one seed with a one-off generator
///
/// # Errors
/// Returns `ConfigError` if `options` are invalid.
pub fn generate(
    registry: &ConventionRegistry,
    seed: &SeedItem,
    options: &GenerateOptions,
) -> Result<CandidateList, ConfigError> {
    Ok(CandidateGenerator::new(registry, options.clone())?.generate(seed))
}

struct Draft<'c> {
    locator: String,
    convention: &'c Convention,
    tier: Tier,
    sequence_index: Option<u32>,
    date_offset_days: Option<i32>,
    prefix_value: Option<String>,
}

struct ListBuilder<'s> {
    seed_id: &'s str,
    seen: HashSet<String>,
    candidates: Vec<Candidate>,
}

impl<'s> ListBuilder<'s> {
    fn new(seed_id: &'s str) -> Self {
        Self {
            seed_id,
            seen: HashSet::new(),
            candidates: Vec::new(),
        }
    }

    fn len(&self) -> usize {
        self.candidates.len()
    }

    fn push(&mut self, draft: Draft<'_>) {
        if !self.seen.insert(draft.locator.clone()) {
            return;
        }
        self.candidates.push(Candidate {
            locator: draft.locator,
            convention: draft.convention.name.clone(),
            convention_kind: draft.convention.kind,
            tier: draft.tier,
            source_seed_id: self.seed_id.to_string(),
            sequence_index: draft.sequence_index,
            date_offset_days: draft.date_offset_days,
            prefix_value: draft.prefix_value,
            ordinal: self.candidates.len(),
        });
    }

    fn finish(mut self, cap: usize) -> CandidateList {
        let dropped = self.candidates.len().saturating_sub(cap);
        self.candidates.truncate(cap);
        CandidateList {
            seed_id: self.seed_id.to_string(),
            candidates: self.candidates,
            truncated: dropped > 0,
            dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use scout_convention::PrefixRule;

    const BASE: &str = "https://shop.example";

    fn registry() -> ConventionRegistry {
        ConventionRegistry::with_defaults(BASE)
    }

    fn count_tier(list: &CandidateList, tier: Tier) -> usize {
        list.candidates.iter().filter(|c| c.tier == tier).count()
    }

    #[test]
    fn code_only_seed_yields_direct_and_gallery() {
        let reg = registry();
        let seed = SeedItem::new("AB100", "u");
        let list = generate(&reg, &seed, &GenerateOptions::new().with_range(1, 5)).unwrap();

        assert_eq!(count_tier(&list, Tier::Direct), 2);
        assert_eq!(count_tier(&list, Tier::Derived), 5);
        assert_eq!(count_tier(&list, Tier::DateShifted), 0);
        assert!(!list.truncated);

        assert_eq!(list.candidates[0].locator, "https://shop.example/goods/AB100.jpg");
        assert_eq!(list.candidates[2].locator, "https://shop.example/goods/AB100_01.jpg");
        assert_eq!(list.candidates[6].locator, "https://shop.example/goods/AB100_05.jpg");
    }

    #[test]
    fn dated_seed_adds_programme_and_shifted_tiers() {
        let reg = registry();
        let seed = SeedItem::new("AB100", "u")
            .with_observed_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        let opts = GenerateOptions::new()
            .with_range(1, 3)
            .with_date_shifts(vec![1, -1]);
        let list = generate(&reg, &seed, &opts).unwrap();

        // gallery + programme
        assert_eq!(count_tier(&list, Tier::Derived), 6);
        assert_eq!(count_tier(&list, Tier::DateShifted), 6);

        let shifted: Vec<_> = list
            .candidates
            .iter()
            .filter(|c| c.tier == Tier::DateShifted)
            .map(|c| (c.date_offset_days, c.sequence_index))
            .collect();
        assert_eq!(shifted[0], (Some(-1), Some(1)));
        assert_eq!(shifted[3], (Some(1), Some(1)));
        assert_eq!(
            list.candidates.last().unwrap().locator,
            "https://shop.example/program/20240316/003.jpg"
        );
    }

    #[test]
    fn tiers_are_emitted_in_priority_order() {
        let reg = registry();
        let seed = SeedItem::new("AB100", "u")
            .with_observed_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        let opts = GenerateOptions::new()
            .with_range(1, 2)
            .with_extra_prefixes(["special"]);
        let list = generate(&reg, &seed, &opts).unwrap();

        let tiers: Vec<Tier> = list.candidates.iter().map(|c| c.tier).collect();
        let mut sorted = tiers.clone();
        sorted.sort();
        assert_eq!(tiers, sorted);
        assert_eq!(list.candidates.last().unwrap().tier, Tier::Manual);

        for (i, c) in list.candidates.iter().enumerate() {
            assert_eq!(c.ordinal, i);
            assert_eq!(c.source_seed_id, "AB100");
        }
    }

    #[test]
    fn extra_prefix_is_manual_outside_its_derived_run() {
        let reg = registry();
        let seed = SeedItem::new("AB100", "u");
        let opts = GenerateOptions::new()
            .with_range(1, 3)
            .with_extra_prefixes(["AB100"]);
        let list = generate(&reg, &seed, &opts).unwrap();

        // the gallery run is already derived; the programme run is not
        assert_eq!(count_tier(&list, Tier::Derived), 3);
        assert_eq!(count_tier(&list, Tier::Manual), 3);
        assert_eq!(list.len(), 2 + 3 + 3);
        assert!(list
            .candidates
            .iter()
            .filter(|c| c.tier == Tier::Manual)
            .all(|c| c.convention == "programme"));
    }

    #[test]
    fn extra_prefix_equal_to_shifted_date_stays_manual() {
        let reg = registry();
        let seed = SeedItem::new("AB100", "u")
            .with_observed_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        let opts = GenerateOptions::new()
            .with_range(1, 2)
            .with_date_shifts(vec![-1])
            .with_extra_prefixes(["20240314"]);
        let list = generate(&reg, &seed, &opts).unwrap();

        let gallery = list
            .candidates
            .iter()
            .find(|c| c.locator == "https://shop.example/goods/20240314_01.jpg")
            .unwrap();
        assert_eq!(gallery.tier, Tier::Manual);
        let programme = list
            .candidates
            .iter()
            .find(|c| c.locator == "https://shop.example/program/20240314/001.jpg")
            .unwrap();
        assert_eq!(programme.tier, Tier::DateShifted);
    }

    #[test]
    fn duplicate_locators_keep_first_tier() {
        let reg = ConventionRegistry::new(
            BASE,
            vec![
                Convention::direct("photo", "{base}/{code}.jpg"),
                Convention::sequence("run", "{base}/{prefix}{index}.jpg", PrefixRule::Code)
                    .with_pad_width(1),
            ],
        )
        .unwrap();
        let seed = SeedItem::new("X1", "u");
        let opts = GenerateOptions::new()
            .with_range(1, 3)
            .with_extra_prefixes(["X"]);
        let list = generate(&reg, &seed, &opts).unwrap();

        let hits: Vec<_> = list
            .candidates
            .iter()
            .filter(|c| c.locator == "https://shop.example/X1.jpg")
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].tier, Tier::Direct);
        // manual "X" yields X1 (dropped), X2, X3
        assert_eq!(count_tier(&list, Tier::Manual), 2);
    }

    #[test]
    fn cap_truncates_lowest_priority_first() {
        let reg = registry();
        let seed = SeedItem::new("AB100", "u");
        let opts = GenerateOptions::new()
            .with_range(1, 10)
            .with_extra_prefixes(["sp"])
            .with_max_candidates(7);
        let list = generate(&reg, &seed, &opts).unwrap();

        assert!(list.truncated);
        assert_eq!(list.len(), 7);
        assert_eq!(list.dropped, 2 + 10 + 2 * 10 - 7);
        assert_eq!(count_tier(&list, Tier::Direct), 2);
        assert_eq!(count_tier(&list, Tier::Manual), 0);
    }

    #[test]
    fn invalid_options_are_rejected() {
        let reg = registry();
        let seed = SeedItem::new("AB100", "u");
        let err = generate(&reg, &seed, &GenerateOptions::new().with_range(9, 1)).unwrap_err();
        assert_eq!(err, ConfigError::InvalidSequenceRange { min: 9, max: 1 });
    }
}
