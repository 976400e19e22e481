//! Probing session
//!
//! A [`ProbeSession`] runs the whole pipeline for a batch of seeds:
//! generate per seed, probe every distinct locator once, fan outcomes back
//! out to the seeds that generated them, classify, and aggregate.
//!
//! Nothing survives a run; the returned [`SessionOutput`] is the only
//! artifact.

use crate::aggregator::aggregate;
use crate::catalog::Catalog;
use crate::classifier::classify;
use crate::config::{GenerateOptions, ScoutConfig};
use crate::error::ScoutError;
use crate::generator::{CandidateGenerator, CandidateList};
use crate::prober::{ExistenceCheck, ProbeStats, Prober};
use crate::types::{Candidate, SeedItem, VerifiedHit};
use scout_convention::ConventionRegistry;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Aggregate counters for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionDiagnostics {
    /// Distinct seeds processed
    pub seed_count: usize,
    /// Distinct locators handed to the prober
    pub total_candidates: usize,
    /// Distinct locators verified to exist
    pub verified_count: usize,
    /// Checks that confirmed absence
    pub not_found_count: usize,
    /// Checks that hit the per-request timeout
    pub timed_out_count: usize,
    /// Checks that failed in transport
    pub error_count: usize,
    /// Candidates skipped by the sequence short-circuit
    pub skipped_count: usize,
    /// Candidates never checked
    pub unprobed_count: usize,
    /// Candidates removed by the per-seed cap
    pub candidates_dropped: usize,
    /// Whether results may be incomplete
    pub truncated: bool,
}

impl SessionDiagnostics {
    fn from_stats(stats: &ProbeStats) -> Self {
        Self {
            total_candidates: stats.total,
            verified_count: stats.found,
            not_found_count: stats.not_found,
            timed_out_count: stats.timed_out,
            error_count: stats.errors,
            skipped_count: stats.skipped,
            unprobed_count: stats.unprobed,
            ..Self::default()
        }
    }
}

/// Session result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionOutput {
    /// Classified, aggregated hits
    pub catalog: Catalog,
    /// Counters
    pub diagnostics: SessionDiagnostics,
}

/// Validated pipeline configuration
#[derive(Debug, Clone)]
pub struct ProbeSession {
    registry: ConventionRegistry,
    generate: GenerateOptions,
    prober: Prober,
}

impl ProbeSession {
    /// Create session over `registry`
    ///
    /// # Errors
    /// Returns `ScoutError::Config` if any option in `config` is invalid.
    /// Nothing is generated or probed in that case.
    pub fn new(registry: ConventionRegistry, config: &ScoutConfig) -> Result<Self, ScoutError> {
        config.generate.validate()?;
        let prober = Prober::new(config.probe.clone())?;
        Ok(Self {
            registry,
            generate: config.generate.clone(),
            prober,
        })
    }

    /// Create session with the registry described by `config`
    ///
    /// # Errors
    /// Returns `ScoutError::Registry` for a malformed convention table and
    /// `ScoutError::Config` for invalid options.
    pub fn from_config(config: &ScoutConfig) -> Result<Self, ScoutError> {
        let registry = config.build_registry()?;
        Self::new(registry, config)
    }

    /// Registry in use
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &ConventionRegistry {
        &self.registry
    }

    /// Candidates that would be generated for `seed`
    #[must_use]
    pub fn candidates(&self, seed: &SeedItem) -> CandidateList {
        self.generator().generate(seed)
    }

    /// Run the pipeline without external cancellation
    pub async fn run(&self, seeds: Vec<SeedItem>, check: Arc<dyn ExistenceCheck>) -> SessionOutput {
        self.run_with_cancel(seeds, check, &CancellationToken::new())
            .await
    }

    /// Run the pipeline, stopping early if `cancel` fires
    ///
    /// On cancellation the catalog holds everything verified so far and is
    /// marked truncated.
    pub async fn run_with_cancel(
        &self,
        seeds: Vec<SeedItem>,
        check: Arc<dyn ExistenceCheck>,
        cancel: &CancellationToken,
    ) -> SessionOutput {
        let seeds = dedup_seeds(seeds);
        tracing::info!(seeds = seeds.len(), "probe session started");

        let generator = self.generator();
        let lists: Vec<CandidateList> = seeds.iter().map(|s| generator.generate(s)).collect();

        let capped = lists.iter().any(|l| l.truncated);
        let dropped: usize = lists.iter().map(|l| l.dropped).sum();
        if capped {
            tracing::warn!(dropped, "candidate cap reached; results may be incomplete");
        }

        let report = self
            .prober
            .probe(unique_candidates(&lists), check, cancel)
            .await;
        let found: HashSet<&str> = report.hits.iter().map(VerifiedHit::locator).collect();

        let per_seed = seeds
            .iter()
            .zip(lists)
            .map(|(seed, list)| {
                let hits = list
                    .candidates
                    .into_iter()
                    .filter(|c| found.contains(c.locator.as_str()))
                    .map(VerifiedHit::new);
                classify(hits, seed)
            })
            .collect();

        let truncated = capped || report.truncated;
        let catalog = aggregate(per_seed, truncated);

        let diagnostics = SessionDiagnostics {
            seed_count: seeds.len(),
            candidates_dropped: dropped,
            truncated,
            ..SessionDiagnostics::from_stats(&report.stats)
        };

        tracing::info!(
            seeds = diagnostics.seed_count,
            candidates = diagnostics.total_candidates,
            verified = diagnostics.verified_count,
            timed_out = diagnostics.timed_out_count,
            errors = diagnostics.error_count,
            truncated,
            "probe session finished"
        );

        SessionOutput {
            catalog,
            diagnostics,
        }
    }

    fn generator(&self) -> CandidateGenerator<'_> {
        CandidateGenerator::from_validated(&self.registry, self.generate.clone())
    }
}

fn dedup_seeds(seeds: Vec<SeedItem>) -> Vec<SeedItem> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(seeds.len());
    for seed in seeds {
        if seen.insert(seed.id.clone()) {
            out.push(seed);
        } else {
            tracing::warn!(seed = %seed.id, "duplicate seed id ignored");
        }
    }
    out
}

/// First occurrence of every locator across all lists, in seed order
fn unique_candidates(lists: &[CandidateList]) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    lists
        .iter()
        .flat_map(|l| l.candidates.iter())
        .filter(|c| seen.insert(c.locator.as_str()))
        .cloned()
        .collect()
}
