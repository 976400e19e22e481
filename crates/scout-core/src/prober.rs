//! Concurrent existence probing
//!
//! The prober runs a fixed pool of workers over a shared queue of
//! candidates. Each worker asks the injected [`ExistenceCheck`] whether a
//! locator resolves, bounded by a per-request timeout.
//!
//! # Guarantees
//!
//! - Every candidate is dequeued at most once
//! - Individual failures never abort the run; they are counted
//! - On deadline expiry or cancellation, in-flight checks are abandoned
//!   and the hits collected so far are returned with `truncated` set
//! - Hits are returned in candidate order, independent of completion order

use crate::config::ProbeOptions;
use crate::error::ConfigError;
use crate::types::{Candidate, ProbeOutcome, VerifiedHit};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Existence check supplied by the caller
///
/// This is the only network-shaped boundary of the engine. Implementations
/// map transport failures to [`ProbeOutcome::Error`] instead of panicking.
#[async_trait::async_trait]
pub trait ExistenceCheck: Send + Sync {
    /// Check whether `locator` resolves to a real asset
    async fn exists(&self, locator: &str) -> ProbeOutcome;
}

/// [`ExistenceCheck`] backed by an async closure
pub struct FnCheck<F> {
    f: F,
}

/// Wrap an async closure as an [`ExistenceCheck`]
///
/// ```
/// use scout_core::prober::{from_fn, ExistenceCheck};
/// use scout_core::ProbeOutcome;
///
/// let check = from_fn(|locator: String| async move {
///     if locator.ends_with("_01.jpg") {
///         ProbeOutcome::Found
///     } else {
///         ProbeOutcome::NotFound
///     }
/// });
/// # let _ = &check as &dyn ExistenceCheck;
/// ```
pub fn from_fn<F, Fut>(f: F) -> FnCheck<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = ProbeOutcome> + Send,
{
    FnCheck { f }
}

#[async_trait::async_trait]
impl<F, Fut> ExistenceCheck for FnCheck<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = ProbeOutcome> + Send,
{
    async fn exists(&self, locator: &str) -> ProbeOutcome {
        (self.f)(locator.to_string()).await
    }
}

/// Counters for one probe run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProbeStats {
    /// Candidates handed to the prober
    pub total: usize,
    /// Checks that found the asset
    pub found: usize,
    /// Checks that confirmed absence
    pub not_found: usize,
    /// Checks that hit the per-request timeout
    pub timed_out: usize,
    /// Checks that failed in transport
    pub errors: usize,
    /// Candidates skipped by the sequence short-circuit
    pub skipped: usize,
    /// Candidates never checked (deadline, cancellation, worker panic)
    pub unprobed: usize,
}

impl ProbeStats {
    /// Candidates with a completed check
    #[inline]
    #[must_use]
    pub fn completed(&self) -> usize {
        self.found + self.not_found + self.timed_out + self.errors
    }
}

/// Result of a probe run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    /// Verified hits in candidate order
    pub hits: Vec<VerifiedHit>,
    /// Outcome counters
    pub stats: ProbeStats,
    /// Whether the run stopped before every candidate was settled
    pub truncated: bool,
}

/// Bounded-concurrency prober
#[derive(Debug, Clone)]
pub struct Prober {
    options: ProbeOptions,
}

impl Prober {
    /// Create prober
    ///
    /// # Errors
    /// Returns `ConfigError` if `options` are invalid.
    pub fn new(options: ProbeOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Probe `candidates` with `check`
    ///
    /// Returns when every candidate is settled, the overall deadline
    /// passes, or `cancel` fires.
    pub async fn probe(
        &self,
        candidates: Vec<Candidate>,
        check: Arc<dyn ExistenceCheck>,
        cancel: &CancellationToken,
    ) -> ProbeReport {
        let total = candidates.len();
        if total == 0 {
            return ProbeReport::default();
        }

        let deadline = self.options.overall_deadline().map(|d| Instant::now() + d);
        let candidates = Arc::new(candidates);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let shared = Arc::new(Shared {
            queue: Mutex::new((0..total).collect()),
            runs: Mutex::new(HashMap::new()),
            short_circuit_after: self.options.short_circuit_after,
        });

        let worker_count = self.options.concurrency.min(total);
        let mut workers = JoinSet::new();
        for id in 0..worker_count {
            let worker = Worker {
                id,
                candidates: Arc::clone(&candidates),
                shared: Arc::clone(&shared),
                check: Arc::clone(&check),
                timeout: self.options.request_timeout(),
                spacing: self.options.request_spacing(),
                tx: tx.clone(),
            };
            workers.spawn(worker.run());
        }
        drop(tx);

        tracing::debug!(total, workers = worker_count, "probe started");

        let mut tally = Tally::new(total);
        let mut interrupted = false;
        loop {
            tokio::select! {
                record = rx.recv() => match record {
                    Some(record) => tally.record(record),
                    None => break,
                },
                () = wait_for(deadline) => {
                    tracing::warn!(settled = tally.settled(), total, "probe deadline expired");
                    interrupted = true;
                    break;
                }
                () = cancel.cancelled() => {
                    tracing::warn!(settled = tally.settled(), total, "probe cancelled");
                    interrupted = true;
                    break;
                }
            }
        }

        if interrupted {
            workers.abort_all();
        }
        while let Some(joined) = workers.join_next().await {
            if let Err(err) = joined {
                if err.is_panic() {
                    tracing::warn!(error = %err, "probe worker panicked");
                }
            }
        }
        // records sent between the last recv and the abort
        while let Ok(record) = rx.try_recv() {
            tally.record(record);
        }

        let report = tally.finish(&candidates, interrupted);
        tracing::debug!(
            found = report.stats.found,
            not_found = report.stats.not_found,
            timed_out = report.stats.timed_out,
            errors = report.stats.errors,
            skipped = report.stats.skipped,
            unprobed = report.stats.unprobed,
            "probe finished"
        );
        report
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Verdict {
    Found,
    NotFound,
    TimedOut,
    Error(String),
    Skipped,
}

impl Verdict {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::NotFound => "not_found",
            Self::TimedOut => "timed_out",
            Self::Error(_) => "error",
            Self::Skipped => "skipped",
        }
    }
}

#[derive(Debug)]
struct Record {
    slot: usize,
    verdict: Verdict,
}

#[derive(Debug, Default)]
struct RunState {
    consecutive_misses: u32,
    /// Indices above this are skipped
    cutoff: Option<u32>,
}

struct Shared {
    queue: Mutex<VecDeque<usize>>,
    runs: Mutex<HashMap<(String, String), RunState>>,
    short_circuit_after: Option<u32>,
}

impl Shared {
    fn next(&self) -> Option<usize> {
        self.queue.lock().pop_front()
    }

    fn is_cut_off(&self, candidate: &Candidate) -> bool {
        if self.short_circuit_after.is_none() {
            return false;
        }
        let (Some((convention, prefix)), Some(index)) =
            (candidate.run_key(), candidate.sequence_index)
        else {
            return false;
        };
        self.runs
            .lock()
            .get(&(convention.to_string(), prefix.to_string()))
            .and_then(|run| run.cutoff)
            .is_some_and(|cutoff| index > cutoff)
    }

    fn note(&self, candidate: &Candidate, verdict: &Verdict) {
        let Some(limit) = self.short_circuit_after else {
            return;
        };
        let (Some((convention, prefix)), Some(index)) =
            (candidate.run_key(), candidate.sequence_index)
        else {
            return;
        };

        let mut runs = self.runs.lock();
        let run = runs
            .entry((convention.to_string(), prefix.to_string()))
            .or_default();
        match verdict {
            Verdict::Found => {
                run.consecutive_misses = 0;
                return;
            }
            Verdict::NotFound => run.consecutive_misses += 1,
            // unverified checks neither confirm nor break a run
            Verdict::TimedOut | Verdict::Error(_) | Verdict::Skipped => return,
        }
        if run.consecutive_misses >= limit && run.cutoff.is_none() {
            tracing::debug!(convention, prefix, index, "sequence run short-circuited");
            run.cutoff = Some(index);
        }
    }
}

struct Worker {
    id: usize,
    candidates: Arc<Vec<Candidate>>,
    shared: Arc<Shared>,
    check: Arc<dyn ExistenceCheck>,
    timeout: Duration,
    spacing: Duration,
    tx: mpsc::UnboundedSender<Record>,
}

impl Worker {
    async fn run(self) {
        while let Some(slot) = self.shared.next() {
            let candidate = &self.candidates[slot];

            let verdict = if self.shared.is_cut_off(candidate) {
                Verdict::Skipped
            } else {
                if !self.spacing.is_zero() {
                    tokio::time::sleep(self.spacing).await;
                }
                let verdict = match tokio::time::timeout(
                    self.timeout,
                    self.check.exists(&candidate.locator),
                )
                .await
                {
                    Ok(ProbeOutcome::Found) => Verdict::Found,
                    Ok(ProbeOutcome::NotFound) => Verdict::NotFound,
                    Ok(ProbeOutcome::Error(msg)) => Verdict::Error(msg),
                    Err(_) => Verdict::TimedOut,
                };
                self.shared.note(candidate, &verdict);
                verdict
            };

            tracing::debug!(
                worker = self.id,
                locator = %candidate.locator,
                outcome = verdict.as_str(),
                "probe"
            );
            if self.tx.send(Record { slot, verdict }).is_err() {
                break;
            }
        }
    }
}

struct Tally {
    stats: ProbeStats,
    found: Vec<usize>,
}

impl Tally {
    fn new(total: usize) -> Self {
        Self {
            stats: ProbeStats {
                total,
                ..ProbeStats::default()
            },
            found: Vec::new(),
        }
    }

    fn settled(&self) -> usize {
        self.stats.completed() + self.stats.skipped
    }

    fn record(&mut self, record: Record) {
        match record.verdict {
            Verdict::Found => {
                self.stats.found += 1;
                self.found.push(record.slot);
            }
            Verdict::NotFound => self.stats.not_found += 1,
            Verdict::TimedOut => self.stats.timed_out += 1,
            Verdict::Error(msg) => {
                tracing::debug!(slot = record.slot, error = %msg, "existence check failed");
                self.stats.errors += 1;
            }
            Verdict::Skipped => self.stats.skipped += 1,
        }
    }

    fn finish(mut self, candidates: &[Candidate], interrupted: bool) -> ProbeReport {
        self.stats.unprobed = self.stats.total - self.settled();
        self.found.sort_unstable();
        let hits = self
            .found
            .into_iter()
            .map(|slot| VerifiedHit::new(candidates[slot].clone()))
            .collect();
        ProbeReport {
            hits,
            truncated: interrupted || self.stats.unprobed > 0,
            stats: self.stats,
        }
    }
}
