//! Error types for Scout Core
//!
//! Only configuration problems are errors. Probe failures, deadline
//! expiry and classification ambiguity degrade into session diagnostics
//! and never surface here.

use scout_convention::RegistryError;

/// Main error type
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    /// Invalid per-call options
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed convention registry
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl ScoutError {
    /// Check if the error stems from configuration
    #[inline]
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Registry(_))
    }
}

/// Invalid configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Sequence range with `min > max`
    #[error("invalid sequence range: min {min} > max {max}")]
    InvalidSequenceRange {
        /// Lower bound
        min: u32,
        /// Upper bound
        max: u32,
    },

    /// Sequence range too wide to probe
    #[error("sequence range spans {span} indices (limit {limit})")]
    SequenceSpanTooLarge {
        /// Requested span
        span: u64,
        /// Accepted maximum
        limit: u64,
    },

    /// Candidate cap of zero
    #[error("max candidates must be at least 1")]
    InvalidCandidateCap,

    /// Date shift of zero or out of range
    #[error("invalid date shift {0} (must be non-zero and within ±{max} days)", max = crate::config::MAX_DATE_SHIFT_DAYS)]
    InvalidDateShift(i32),

    /// Concurrency outside the accepted range
    #[error("concurrency {value} outside 1..={max}")]
    InvalidConcurrency {
        /// Requested worker count
        value: usize,
        /// Accepted maximum
        max: usize,
    },

    /// Zero per-request timeout
    #[error("per-request timeout must be positive")]
    InvalidTimeout,

    /// Zero short-circuit threshold
    #[error("short-circuit threshold must be at least 1 when enabled")]
    InvalidShortCircuit,

    /// Config file could not be read or parsed
    #[error("failed to load configuration: {0}")]
    Load(String),
}
