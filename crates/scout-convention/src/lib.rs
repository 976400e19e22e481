//! Scout Convention Registry
//!
//! Known asset-naming conventions of a storefront, as pure data plus the
//! functions that turn metadata into locators.
//!
//! # Overview
//!
//! - **Convention**: a named rule (`Direct`, `Sequence`,
//!   `DateShiftedSequence`) with a locator template
//! - **ConventionRegistry**: the validated table of conventions
//! - **dates**: base-date inference from codes and titles
//!
//! # Example
//!
//! ```rust
//! use scout_convention::{ConventionRegistry, PrefixInput};
//!
//! let registry = ConventionRegistry::with_defaults("https://shop.example");
//!
//! let direct = registry.direct("AB100");
//! assert_eq!(direct[0].locator, "https://shop.example/goods/AB100.jpg");
//!
//! let prefixes = registry.derive_prefixes(&PrefixInput::new("AB100", None), &[]);
//! assert_eq!(prefixes[0].value, "AB100");
//! ```

#![warn(missing_docs)]

pub mod convention;
pub mod dates;
pub mod error;
pub mod registry;

// Re-exports
pub use convention::{
    CodeTransform, Convention, ConventionKind, PrefixInput, PrefixRule, DEFAULT_PAD_WIDTH,
    MAX_PAD_WIDTH,
};
pub use dates::{infer_date, parse_compact};
pub use error::RegistryError;
pub use registry::{ConventionRegistry, DerivedPrefix, DirectLocator};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for registry operations
    pub use crate::{
        Convention, ConventionKind, ConventionRegistry, DerivedPrefix, DirectLocator, PrefixInput,
        PrefixRule, RegistryError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
