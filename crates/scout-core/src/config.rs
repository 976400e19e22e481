//! Session configuration
//!
//! Every option has a default and is validated before any work begins.
//! Durations are stored as milliseconds so the structs map directly onto
//! the TOML config file.

use crate::error::ConfigError;
use scout_convention::{Convention, ConventionRegistry, RegistryError};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

/// Widest sequence range accepted
pub const MAX_SEQUENCE_SPAN: u64 = 1000;

/// Largest accepted date shift, in days
pub const MAX_DATE_SHIFT_DAYS: i32 = 366;

/// Largest accepted worker count
pub const MAX_CONCURRENCY: usize = 64;

/// Base URL used when none is configured
pub const DEFAULT_BASE_URL: &str = "https://shop.example";

/// Inclusive range of sequence indices to probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRange {
    /// First index
    pub min: u32,
    /// Last index
    pub max: u32,
}

impl SequenceRange {
    /// Create a validated range
    ///
    /// # Errors
    /// See [`SequenceRange::validate`].
    pub fn new(min: u32, max: u32) -> Result<Self, ConfigError> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// Check bounds
    ///
    /// # Errors
    /// - `ConfigError::InvalidSequenceRange` if `min > max`
    /// - `ConfigError::SequenceSpanTooLarge` if the span exceeds [`MAX_SEQUENCE_SPAN`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvalidSequenceRange {
                min: self.min,
                max: self.max,
            });
        }
        if self.len() > MAX_SEQUENCE_SPAN {
            return Err(ConfigError::SequenceSpanTooLarge {
                span: self.len(),
                limit: MAX_SEQUENCE_SPAN,
            });
        }
        Ok(())
    }

    /// Number of indices (`max - min + 1`)
    #[inline]
    #[must_use]
    pub fn len(&self) -> u64 {
        if self.min > self.max {
            0
        } else {
            u64::from(self.max - self.min) + 1
        }
    }

    /// Whether the range is empty (only for unvalidated ranges)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indices in ascending order
    #[inline]
    #[must_use]
    pub fn indices(&self) -> RangeInclusive<u32> {
        self.min..=self.max
    }
}

impl Default for SequenceRange {
    fn default() -> Self {
        Self { min: 1, max: 40 }
    }
}

/// Candidate generation options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Sequence indices to enumerate under each prefix
    pub sequence_range: SequenceRange,
    /// Operator-supplied prefixes
    pub extra_prefixes: Vec<String>,
    /// Hard cap on candidates per seed
    pub max_candidates: usize,
    /// Day offsets for date-shifted prefixes
    pub date_shifts: Vec<i32>,
}

impl GenerateOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With sequence range
    #[inline]
    #[must_use]
    pub fn with_range(mut self, min: u32, max: u32) -> Self {
        self.sequence_range = SequenceRange { min, max };
        self
    }

    /// With extra prefixes
    #[must_use]
    pub fn with_extra_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// With candidate cap
    #[inline]
    #[must_use]
    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = max;
        self
    }

    /// With date shifts
    #[inline]
    #[must_use]
    pub fn with_date_shifts(mut self, shifts: Vec<i32>) -> Self {
        self.date_shifts = shifts;
        self
    }

    /// Check options
    ///
    /// # Errors
    /// Returns the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sequence_range.validate()?;
        if self.max_candidates == 0 {
            return Err(ConfigError::InvalidCandidateCap);
        }
        if let Some(&bad) = self
            .date_shifts
            .iter()
            .find(|s| **s == 0 || s.abs() > MAX_DATE_SHIFT_DAYS)
        {
            return Err(ConfigError::InvalidDateShift(bad));
        }
        Ok(())
    }

    /// Shifts deduplicated and ordered by absolute size, negative first
    #[must_use]
    pub fn ordered_shifts(&self) -> Vec<i32> {
        let mut shifts = self.date_shifts.clone();
        shifts.sort_by_key(|s| (s.unsigned_abs(), *s));
        shifts.dedup();
        shifts
    }

    /// Extra prefixes trimmed, without blanks or repeats, in given order
    #[must_use]
    pub fn cleaned_extra_prefixes(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.extra_prefixes.len());
        for prefix in &self.extra_prefixes {
            let prefix = prefix.trim();
            if !prefix.is_empty() && !out.iter().any(|p| p == prefix) {
                out.push(prefix.to_string());
            }
        }
        out
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            sequence_range: SequenceRange::default(),
            extra_prefixes: Vec::new(),
            max_candidates: 2000,
            date_shifts: vec![-1, 1, -7, 7],
        }
    }
}

/// Prober options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeOptions {
    /// Worker count
    pub concurrency: usize,
    /// Per-check timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Session wall-clock budget in milliseconds (`None` = unlimited)
    pub overall_deadline_ms: Option<u64>,
    /// Delay each worker waits before every check, in milliseconds
    pub min_request_spacing_ms: u64,
    /// Stop a sequence run after this many consecutive not-found results (`None` = never)
    pub short_circuit_after: Option<u32>,
}

impl ProbeOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With worker count
    #[inline]
    #[must_use]
    pub fn with_concurrency(mut self, workers: usize) -> Self {
        self.concurrency = workers;
        self
    }

    /// With per-check timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = duration_ms(timeout);
        self
    }

    /// With overall deadline
    #[inline]
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.overall_deadline_ms = Some(duration_ms(deadline));
        self
    }

    /// Without overall deadline
    #[inline]
    #[must_use]
    pub fn without_deadline(mut self) -> Self {
        self.overall_deadline_ms = None;
        self
    }

    /// With per-worker spacing between checks
    #[inline]
    #[must_use]
    pub fn with_request_spacing(mut self, spacing: Duration) -> Self {
        self.min_request_spacing_ms = duration_ms(spacing);
        self
    }

    /// With sequence short-circuit after `misses` consecutive not-found results
    #[inline]
    #[must_use]
    pub fn with_short_circuit(mut self, misses: u32) -> Self {
        self.short_circuit_after = Some(misses);
        self
    }

    /// Per-check timeout
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Overall deadline, if bounded
    #[inline]
    #[must_use]
    pub fn overall_deadline(&self) -> Option<Duration> {
        self.overall_deadline_ms.map(Duration::from_millis)
    }

    /// Per-worker spacing
    #[inline]
    #[must_use]
    pub fn request_spacing(&self) -> Duration {
        Duration::from_millis(self.min_request_spacing_ms)
    }

    /// Check options
    ///
    /// # Errors
    /// Returns the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(ConfigError::InvalidConcurrency {
                value: self.concurrency,
                max: MAX_CONCURRENCY,
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.short_circuit_after == Some(0) {
            return Err(ConfigError::InvalidShortCircuit);
        }
        Ok(())
    }
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            concurrency: 8,
            request_timeout_ms: 5_000,
            overall_deadline_ms: Some(120_000),
            min_request_spacing_ms: 0,
            short_circuit_after: None,
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Full session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    /// Storefront base URL substituted for `{base}`
    pub base_url: String,
    /// Convention table; `None` uses the built-in conventions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conventions: Option<Vec<Convention>>,
    /// Generation options
    pub generate: GenerateOptions,
    /// Probe options
    pub probe: ProbeOptions,
}

impl ScoutConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With generation options
    #[inline]
    #[must_use]
    pub fn with_generate(mut self, generate: GenerateOptions) -> Self {
        self.generate = generate;
        self
    }

    /// With probe options
    #[inline]
    #[must_use]
    pub fn with_probe(mut self, probe: ProbeOptions) -> Self {
        self.probe = probe;
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// `ConfigError::Load` on syntax or type errors; validation errors
    /// otherwise.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Load(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// `ConfigError::Load` if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Validate generation and probe options
    ///
    /// # Errors
    /// Returns the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generate.validate()?;
        self.probe.validate()
    }

    /// Build the convention registry this config describes
    ///
    /// # Errors
    /// Any [`RegistryError`] from a malformed convention table.
    pub fn build_registry(&self) -> Result<ConventionRegistry, RegistryError> {
        let conventions = self
            .conventions
            .clone()
            .unwrap_or_else(ConventionRegistry::default_conventions);
        ConventionRegistry::new(self.base_url.clone(), conventions)
    }
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            conventions: None,
            generate: GenerateOptions::default(),
            probe: ProbeOptions::default(),
        }
    }
}
