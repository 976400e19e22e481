//! Hit classification
//!
//! Buckets the verified hits of one seed into a [`PerSeedCatalog`]:
//! - direct-asset hits
//! - sequence groups keyed by `(convention, prefix)`
//! - hits reachable only through an operator prefix
//!
//! Ordering is derived from candidate fields alone, so the result does not
//! depend on the order hits were verified in.

use crate::catalog::{PerSeedCatalog, Recency, SequenceGroup};
use crate::troupe::Troupe;
use crate::types::{SeedItem, Tier, VerifiedHit};
use indexmap::IndexMap;

/// Classify the hits of `seed`
#[must_use]
pub fn classify(hits: impl IntoIterator<Item = VerifiedHit>, seed: &SeedItem) -> PerSeedCatalog {
    let troupe = Troupe::infer(seed.title_text());
    let mut catalog = PerSeedCatalog {
        troupe,
        recency: Recency::of(seed),
        ..PerSeedCatalog::empty(&seed.id)
    };

    let mut groups: IndexMap<(String, String), SequenceGroup> = IndexMap::new();
    for hit in hits {
        let candidate = &hit.candidate;
        if !candidate.is_sequence() {
            catalog.direct.push(hit);
            continue;
        }
        if candidate.tier == Tier::Manual {
            catalog.unknown_prefix_hits.push(hit);
            continue;
        }

        let prefix = candidate.prefix_value.clone().unwrap_or_default();
        groups
            .entry((candidate.convention.clone(), prefix.clone()))
            .or_insert_with(|| SequenceGroup {
                convention: candidate.convention.clone(),
                kind: candidate.convention_kind,
                prefix_value: prefix,
                date_offset_days: candidate.date_offset_days.unwrap_or_default(),
                troupe,
                hits: Vec::new(),
            })
            .hits
            .push(hit);
    }

    catalog.direct.sort_by_key(|h| h.candidate.ordinal);
    catalog.unknown_prefix_hits.sort_by_key(|h| h.candidate.ordinal);

    let mut sequences: Vec<SequenceGroup> = groups.into_values().collect();
    for group in &mut sequences {
        group
            .hits
            .sort_by_key(|h| (h.candidate.sequence_index, h.candidate.ordinal));
    }
    sequences.sort_by_key(|g| {
        let first = g.hits.iter().map(|h| h.candidate.ordinal).min();
        (g.date_offset_days.unsigned_abs(), g.date_offset_days, first)
    });
    catalog.sequences = sequences;

    tracing::debug!(
        seed = %seed.id,
        troupe = ?troupe,
        direct = catalog.direct.len(),
        groups = catalog.sequences.len(),
        unknown = catalog.unknown_prefix_hits.len(),
        "classified hits"
    );
    catalog
}
