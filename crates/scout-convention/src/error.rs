//! Error types for the convention registry
//!
//! Every variant describes a malformed registry entry. These are
//! programmer or configuration mistakes caught when a registry is built,
//! never runtime failures of locator generation.

/// Malformed convention or registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Convention has no name
    #[error("convention name must not be empty")]
    EmptyName,

    /// Two conventions share a name
    #[error("duplicate convention name `{0}`")]
    DuplicateName(String),

    /// Template lacks a placeholder its kind requires
    #[error("convention `{name}`: template is missing the `{placeholder}` placeholder")]
    MissingPlaceholder {
        /// Convention name
        name: String,
        /// Placeholder that was expected
        placeholder: &'static str,
    },

    /// Zero-padding width out of range
    #[error("convention `{name}`: pad width {width} outside 1..={max}")]
    InvalidPadWidth {
        /// Convention name
        name: String,
        /// Configured width
        width: usize,
        /// Largest accepted width
        max: usize,
    },

    /// Prefix rule missing, misplaced or unusable
    #[error("convention `{name}`: {reason}")]
    InvalidPrefixRule {
        /// Convention name
        name: String,
        /// What is wrong with the rule
        reason: String,
    },

    /// Registry built without any convention
    #[error("registry has no conventions")]
    Empty,
}
