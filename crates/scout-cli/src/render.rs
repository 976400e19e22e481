//! Plain-text rendering of session results

use scout_core::{CandidateList, ConventionRegistry, PerSeedCatalog, SessionOutput, VerifiedHit};
use std::fmt::Write;

/// Render a session as indented text
#[must_use]
pub fn session_text(output: &SessionOutput) -> String {
    let mut out = String::new();
    if output.catalog.truncated {
        out.push_str("warning: results may be incomplete (candidate cap, deadline or cancellation)\n\n");
    }

    for catalog in output.catalog.per_seed.values() {
        seed_text(&mut out, catalog);
        out.push('\n');
    }

    let d = &output.diagnostics;
    let _ = writeln!(
        out,
        "{} seeds, {} candidates, {} verified, {} not found, {} timed out, {} errors, {} skipped, {} unprobed",
        d.seed_count,
        d.total_candidates,
        d.verified_count,
        d.not_found_count,
        d.timed_out_count,
        d.error_count,
        d.skipped_count,
        d.unprobed_count,
    );
    out
}

fn seed_text(out: &mut String, catalog: &PerSeedCatalog) {
    let _ = write!(out, "{}", catalog.seed_id);
    if let Some(troupe) = catalog.troupe {
        let _ = write!(out, " [{} {}]", troupe.label(), troupe);
    }
    out.push('\n');

    if catalog.is_empty() {
        out.push_str("  none found\n");
        return;
    }

    if !catalog.direct.is_empty() {
        out.push_str("  direct\n");
        hits_text(out, &catalog.direct);
    }
    for group in &catalog.sequences {
        let _ = writeln!(
            out,
            "  {} {} ({:+}d, {} hits)",
            group.convention,
            group.prefix_value,
            group.date_offset_days,
            group.hits.len()
        );
        hits_text(out, &group.hits);
    }
    if !catalog.unknown_prefix_hits.is_empty() {
        out.push_str("  hinted prefixes\n");
        hits_text(out, &catalog.unknown_prefix_hits);
    }
}

fn hits_text(out: &mut String, hits: &[VerifiedHit]) {
    for hit in hits {
        let _ = writeln!(out, "    {}", hit.locator());
    }
}

/// Render the convention table
#[must_use]
pub fn conventions_text(registry: &ConventionRegistry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "base: {}", registry.base_url());
    for convention in registry.conventions() {
        let _ = writeln!(
            out,
            "{:<16} {:<22} {}",
            convention.name,
            convention.kind.as_str(),
            convention.template
        );
    }
    out
}

/// Render a candidate list, one locator per line with its tier
#[must_use]
pub fn candidates_text(list: &CandidateList) -> String {
    let mut out = String::new();
    for candidate in &list.candidates {
        let _ = writeln!(out, "{:<12} {}", candidate.tier.as_str(), candidate.locator);
    }
    if list.truncated {
        let _ = writeln!(out, "({} more dropped by the candidate cap)", list.dropped);
    }
    out
}
