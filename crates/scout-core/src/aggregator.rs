//! Catalog aggregation across seeds

use crate::catalog::{Catalog, PerSeedCatalog};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Merge per-seed catalogs into one session catalog
///
/// Seeds carrying a recency key come first, most recent first; the rest
/// keep discovery order. A seed id seen twice keeps its first catalog.
/// `merged_order` lists each verified locator once, at its first
/// position in presentation order.
#[must_use]
pub fn aggregate(per_seed: Vec<PerSeedCatalog>, truncated: bool) -> Catalog {
    let mut ordered = per_seed;
    ordered.sort_by(|a, b| match (a.recency, b.recency) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let mut seen = HashSet::new();
    let mut merged_order = Vec::new();
    let mut map = IndexMap::with_capacity(ordered.len());
    for catalog in ordered {
        if map.contains_key(&catalog.seed_id) {
            tracing::debug!(seed = %catalog.seed_id, "duplicate seed catalog ignored");
            continue;
        }
        for hit in catalog.hits() {
            if seen.insert(hit.locator().to_string()) {
                merged_order.push(hit.locator().to_string());
            }
        }
        map.insert(catalog.seed_id.clone(), catalog);
    }

    Catalog {
        per_seed: map,
        merged_order,
        truncated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Recency;
    use crate::types::{Candidate, Tier, VerifiedHit};
    use chrono::NaiveDate;
    use scout_convention::ConventionKind;

    fn direct_hit(seed: &str, locator: &str) -> VerifiedHit {
        VerifiedHit::new(Candidate {
            locator: locator.to_string(),
            convention: "goods-photo".to_string(),
            convention_kind: ConventionKind::Direct,
            tier: Tier::Direct,
            source_seed_id: seed.to_string(),
            sequence_index: None,
            date_offset_days: None,
            prefix_value: Some(seed.to_string()),
            ordinal: 0,
        })
    }

    fn seed_catalog(id: &str, recency: Option<Recency>, locators: &[&str]) -> PerSeedCatalog {
        PerSeedCatalog {
            recency,
            direct: locators.iter().map(|l| direct_hit(id, l)).collect(),
            ..PerSeedCatalog::empty(id)
        }
    }

    fn date(y: i32, m: u32, d: u32) -> Option<Recency> {
        NaiveDate::from_ymd_opt(y, m, d).map(Recency::Date)
    }

    #[test]
    fn most_recent_first_then_discovery_order() {
        let catalog = aggregate(
            vec![
                seed_catalog("plain-a", None, &["a"]),
                seed_catalog("old", date(2023, 1, 1), &["b"]),
                seed_catalog("code", Some(Recency::Code(500)), &["c"]),
                seed_catalog("plain-b", None, &["d"]),
                seed_catalog("new", date(2024, 6, 1), &["e"]),
            ],
            false,
        );

        let ids: Vec<&str> = catalog.per_seed.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["new", "old", "code", "plain-a", "plain-b"]);
        assert_eq!(catalog.merged_order, vec!["e", "b", "c", "a", "d"]);
    }

    #[test]
    fn shared_locator_appears_once() {
        let catalog = aggregate(
            vec![
                seed_catalog("AB100", None, &["shared", "x"]),
                seed_catalog("AB101", None, &["shared", "y"]),
            ],
            true,
        );
        assert_eq!(catalog.merged_order, vec!["shared", "x", "y"]);
        assert_eq!(catalog.seed("AB101").map(PerSeedCatalog::hit_count), Some(2));
        assert!(catalog.truncated);
    }

    #[test]
    fn duplicate_seed_ids_keep_first() {
        let catalog = aggregate(
            vec![
                seed_catalog("AB100", None, &["first"]),
                seed_catalog("AB100", None, &["second"]),
            ],
            false,
        );
        assert_eq!(catalog.per_seed.len(), 1);
        assert_eq!(catalog.merged_order, vec!["first"]);
    }

    #[test]
    fn empty_input_is_empty_catalog() {
        let catalog = aggregate(Vec::new(), false);
        assert!(catalog.is_empty());
        assert!(catalog.per_seed.is_empty());
    }
}
