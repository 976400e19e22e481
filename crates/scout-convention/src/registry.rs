//! Convention registry
//!
//! Provides [`ConventionRegistry`], the fixed table of naming conventions
//! a probing session generates candidates from. The table is validated
//! once when built and never mutated afterwards.

use crate::convention::{CodeTransform, Convention, ConventionKind, PrefixInput, PrefixRule};
use crate::error::RegistryError;
use serde::Serialize;
use std::collections::HashSet;

/// Direct locator produced for a code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectLocator<'r> {
    /// Convention that produced it
    pub convention: &'r Convention,
    /// Code rendered into the template (primary or alternate)
    pub code: String,
    /// Fully resolved locator
    pub locator: String,
    /// Whether `code` is the alternate form
    pub alternate: bool,
}

/// Prefix derived for a sequence convention
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedPrefix<'r> {
    /// Convention the prefix belongs to
    pub convention: &'r Convention,
    /// Prefix value
    pub value: String,
    /// Date shift applied (0 for the primary prefix)
    pub offset_days: i32,
}

/// Fixed table of naming conventions
#[derive(Debug, Clone, Serialize)]
pub struct ConventionRegistry {
    base_url: String,
    conventions: Vec<Convention>,
}

impl ConventionRegistry {
    /// Build a registry, validating every entry
    ///
    /// # Errors
    /// - `RegistryError::Empty` if `conventions` is empty
    /// - `RegistryError::DuplicateName` if two entries share a name
    /// - any error from [`Convention::validate`]
    pub fn new(
        base_url: impl Into<String>,
        conventions: Vec<Convention>,
    ) -> Result<Self, RegistryError> {
        if conventions.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut names = HashSet::with_capacity(conventions.len());
        for convention in &conventions {
            convention.validate()?;
            if !names.insert(convention.name.as_str()) {
                return Err(RegistryError::DuplicateName(convention.name.clone()));
            }
        }

        Ok(Self {
            base_url: base_url.into(),
            conventions,
        })
    }

    /// Registry with the built-in storefront conventions
    #[must_use]
    pub fn with_defaults(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            conventions: Self::default_conventions(),
        }
    }

    /// The built-in conventions
    ///
    /// - `goods-photo`: `{base}/goods/{code}.jpg`, lowercase alternate
    /// - `goods-gallery`: `{base}/goods/{prefix}_{index}.jpg`, prefix from the code
    /// - `programme`: `{base}/program/{prefix}/{index}.jpg`, prefix from the date
    /// - `programme-alt`: same layout, date shifted for alternate productions
    #[must_use]
    pub fn default_conventions() -> Vec<Convention> {
        vec![
            Convention::direct("goods-photo", "{base}/goods/{code}.jpg")
                .with_alternate(CodeTransform::Lowercase),
            Convention::sequence(
                "goods-gallery",
                "{base}/goods/{prefix}_{index}.jpg",
                PrefixRule::Code,
            ),
            Convention::sequence(
                "programme",
                "{base}/program/{prefix}/{index}.jpg",
                PrefixRule::Date {
                    format: "%Y%m%d".to_string(),
                },
            )
            .with_pad_width(3),
            Convention::date_shifted("programme-alt", "{base}/program/{prefix}/{index}.jpg", "%Y%m%d")
                .with_pad_width(3),
        ]
    }

    /// Base URL substituted for `{base}`
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// All conventions in registration order
    #[inline]
    #[must_use]
    pub fn conventions(&self) -> &[Convention] {
        &self.conventions
    }

    /// Look up a convention by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Convention> {
        self.conventions.iter().find(|c| c.name == name)
    }

    /// Conventions of one kind, in registration order
    pub fn of_kind(&self, kind: ConventionKind) -> impl Iterator<Item = &Convention> {
        self.conventions.iter().filter(move |c| c.kind == kind)
    }

    /// Number of conventions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.conventions.len()
    }

    /// Whether the registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conventions.is_empty()
    }

    /// Direct locators for `code`
    ///
    /// For each direct convention the primary code comes first, followed
    /// by its alternate form when the convention defines one.
    #[must_use]
    pub fn direct(&self, code: &str) -> Vec<DirectLocator<'_>> {
        let code = code.trim();
        if code.is_empty() {
            return Vec::new();
        }

        let mut out = Vec::new();
        for convention in self.of_kind(ConventionKind::Direct) {
            out.push(DirectLocator {
                convention,
                code: code.to_string(),
                locator: convention.direct_locator(&self.base_url, code),
                alternate: false,
            });
            if let Some(alt) = convention.alternate_code(code) {
                out.push(DirectLocator {
                    convention,
                    locator: convention.direct_locator(&self.base_url, &alt),
                    code: alt,
                    alternate: true,
                });
            }
        }
        out
    }

    /// Locator of item `index` under `prefix` for the named convention
    ///
    /// Returns `None` if the convention is unknown or not a sequence.
    #[must_use]
    pub fn sequence(&self, name: &str, prefix: &str, index: u32) -> Option<String> {
        self.get(name)
            .filter(|c| c.kind.is_sequence())
            .map(|c| c.sequence_locator(&self.base_url, prefix, index))
    }

    /// Candidate prefixes for a seed
    ///
    /// Primary prefixes (offset 0) of every `Sequence` convention come
    /// first, in registration order. Then, for each shift in the order
    /// given, one prefix per `DateShiftedSequence` convention. Zero shifts
    /// are ignored here: the unshifted date belongs to the plain sequence
    /// conventions. Duplicate `(convention, value)` pairs are dropped.
    #[must_use]
    pub fn derive_prefixes(&self, input: &PrefixInput<'_>, shifts: &[i32]) -> Vec<DerivedPrefix<'_>> {
        let primary = self.of_kind(ConventionKind::Sequence).map(|c| (c, 0));
        let shifted = shifts
            .iter()
            .copied()
            .filter(|shift| *shift != 0)
            .flat_map(|shift| {
                self.of_kind(ConventionKind::DateShiftedSequence)
                    .map(move |c| (c, shift))
            });

        let mut seen: HashSet<(&str, String)> = HashSet::new();
        let mut out = Vec::new();
        for (convention, offset_days) in primary.chain(shifted) {
            let Some(value) = convention.prefix_for(input, offset_days) else {
                continue;
            };
            if seen.insert((convention.name.as_str(), value.clone())) {
                out.push(DerivedPrefix {
                    convention,
                    value,
                    offset_days,
                });
            }
        }

        out
    }
}
