//! Scout Core - asset locator discovery engine
//!
//! Guesses where a storefront publishes media for a product, checks which
//! guesses resolve, and organises the hits into a catalog:
//! - Generates tiered, deduplicated candidate locators per seed
//! - Probes candidates concurrently through an injected existence check
//! - Classifies hits into direct assets, sequence groups and hinted hits
//! - Aggregates seeds into one catalog, most recent first
//!
//! The engine performs no I/O of its own. Callers supply an
//! [`ExistenceCheck`] implementation.
//!
//! # Example
//!
//! ```rust
//! use scout_core::prelude::*;
//! use scout_core::prober::from_fn;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), ScoutError> {
//! let config = ScoutConfig::new()
//!     .with_generate(GenerateOptions::new().with_range(1, 5));
//! let session = ProbeSession::from_config(&config)?;
//!
//! let check = Arc::new(from_fn(|locator: String| async move {
//!     if locator.ends_with("_01.jpg") {
//!         ProbeOutcome::Found
//!     } else {
//!         ProbeOutcome::NotFound
//!     }
//! }));
//!
//! let seed = SeedItem::new("AB100", "https://shop.example/p/AB100").with_title("花組 Goethe");
//! let output = session.run(vec![seed], check).await;
//!
//! println!("verified {} locators", output.diagnostics.verified_count);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod aggregator;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod error;
pub mod generator;
pub mod prober;
pub mod seed;
pub mod session;
pub mod troupe;
pub mod types;

// Re-exports for convenience
pub use aggregator::aggregate;
pub use catalog::{Catalog, PerSeedCatalog, Recency, SequenceGroup};
pub use classifier::classify;
pub use config::{
    GenerateOptions, ProbeOptions, ScoutConfig, SequenceRange, DEFAULT_BASE_URL,
    MAX_CONCURRENCY, MAX_DATE_SHIFT_DAYS, MAX_SEQUENCE_SPAN,
};
pub use error::{ConfigError, ScoutError};
pub use generator::{generate, CandidateGenerator, CandidateList};
pub use prober::{ExistenceCheck, ProbeReport, ProbeStats, Prober};
pub use seed::SeedFilter;
pub use session::{ProbeSession, SessionDiagnostics, SessionOutput};
pub use troupe::Troupe;
pub use types::{Candidate, Confidence, ProbeOutcome, SeedItem, Tier, VerifiedHit};

pub use scout_convention::{Convention, ConventionKind, ConventionRegistry, RegistryError};
pub use tokio_util::sync::CancellationToken;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running probe sessions
    pub use crate::{
        Catalog, ConventionRegistry, ExistenceCheck, GenerateOptions, ProbeOptions, ProbeOutcome,
        ProbeSession, ScoutConfig, ScoutError, SeedItem, SessionOutput, Troupe,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::prober::from_fn;
    use std::sync::Arc;

    #[tokio::test]
    async fn full_pipeline_with_defaults() {
        let config = ScoutConfig::new()
            .with_generate(GenerateOptions::new().with_range(1, 4))
            .with_probe(ProbeOptions::new().with_concurrency(3));
        let session = ProbeSession::from_config(&config).unwrap();

        let check = Arc::new(from_fn(|locator: String| async move {
            let hit = locator.ends_with("/goods/AB100.jpg")
                || locator.ends_with("/goods/AB100_01.jpg")
                || locator.ends_with("/goods/AB100_02.jpg");
            if hit {
                ProbeOutcome::Found
            } else {
                ProbeOutcome::NotFound
            }
        }));

        let seed = SeedItem::new("AB100", "https://shop.example/p/AB100").with_title("月組 revue");
        let output = session.run(vec![seed], check).await;

        let seed = output.catalog.seed("AB100").unwrap();
        assert_eq!(seed.troupe, Some(Troupe::Moon));
        assert_eq!(seed.direct.len(), 1);
        assert_eq!(seed.direct[0].confidence, Confidence::Strong);
        assert_eq!(seed.sequences.len(), 1);
        assert_eq!(seed.sequences[0].hits.len(), 2);
        assert_eq!(output.catalog.merged_order.len(), 3);
        assert_eq!(output.diagnostics.verified_count, 3);
        assert_eq!(output.diagnostics.total_candidates, 2 + 4);
        assert!(!output.catalog.truncated);
    }

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
