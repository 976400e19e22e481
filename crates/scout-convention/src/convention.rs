//! Naming conventions and locator templates
//!
//! A [`Convention`] turns metadata into a locator. Templates are plain
//! strings with `{base}`, `{code}`, `{prefix}` and `{index}` placeholders,
//! rendered in a single pass so substituted values are never re-expanded.

use crate::error::RegistryError;
use chrono::format::{Item, StrftimeItems};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest accepted zero-padding width for sequence indices
pub const MAX_PAD_WIDTH: usize = 8;

/// Default zero-padding width for sequence indices
pub const DEFAULT_PAD_WIDTH: usize = 2;

/// Placeholder for the registry base URL
pub const BASE_PLACEHOLDER: &str = "{base}";
/// Placeholder for the product code
pub const CODE_PLACEHOLDER: &str = "{code}";
/// Placeholder for a sequence prefix
pub const PREFIX_PLACEHOLDER: &str = "{prefix}";
/// Placeholder for a zero-padded sequence index
pub const INDEX_PLACEHOLDER: &str = "{index}";

/// Kind of naming rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConventionKind {
    /// One asset per product code
    Direct,
    /// Numbered sequence under a derived prefix
    Sequence,
    /// Numbered sequence under a date prefix shifted by some days
    DateShiftedSequence,
}

impl ConventionKind {
    /// Whether this kind enumerates indices under a prefix
    #[inline]
    #[must_use]
    pub fn is_sequence(self) -> bool {
        !matches!(self, Self::Direct)
    }

    /// Stable lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Sequence => "sequence",
            Self::DateShiftedSequence => "date_shifted_sequence",
        }
    }
}

impl fmt::Display for ConventionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transform deriving an alternate product code from the primary one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "transform", content = "value", rename_all = "snake_case")]
pub enum CodeTransform {
    /// `AB100` → `ab100`
    Lowercase,
    /// `ab100` → `AB100`
    Uppercase,
    /// `AB100` → `AB100{suffix}`
    Suffix(String),
}

impl CodeTransform {
    /// Apply the transform
    #[must_use]
    pub fn apply(&self, code: &str) -> String {
        match self {
            Self::Lowercase => code.to_lowercase(),
            Self::Uppercase => code.to_uppercase(),
            Self::Suffix(suffix) => format!("{code}{suffix}"),
        }
    }
}

/// Where a sequence convention takes its prefix from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "snake_case")]
pub enum PrefixRule {
    /// The product code as-is
    Code,
    /// The product code, lowercased
    CodeLowercase,
    /// The base date rendered with a chrono format string, e.g. `%Y%m%d`
    Date {
        /// chrono `strftime` format
        format: String,
    },
}

impl PrefixRule {
    /// Whether the rule needs a base date
    #[inline]
    #[must_use]
    pub fn needs_date(&self) -> bool {
        matches!(self, Self::Date { .. })
    }
}

/// Metadata a prefix is derived from
#[derive(Debug, Clone, Copy)]
pub struct PrefixInput<'a> {
    /// Product or card code
    pub code: &'a str,
    /// Base date, observed or inferred
    pub base_date: Option<NaiveDate>,
}

impl<'a> PrefixInput<'a> {
    /// Create input from a code and optional date
    #[inline]
    #[must_use]
    pub fn new(code: &'a str, base_date: Option<NaiveDate>) -> Self {
        Self { code, base_date }
    }
}

/// A named rule for building locators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Convention {
    /// Unique name within a registry
    pub name: String,
    /// Rule kind
    pub kind: ConventionKind,
    /// Locator template
    pub template: String,
    /// Zero-padding width of `{index}`
    #[serde(default = "default_pad_width")]
    pub pad_width: usize,
    /// Alternate code transform (direct conventions only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate: Option<CodeTransform>,
    /// Prefix source (sequence kinds only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_rule: Option<PrefixRule>,
}

fn default_pad_width() -> usize {
    DEFAULT_PAD_WIDTH
}

impl Convention {
    /// Direct convention: one asset per code
    #[must_use]
    pub fn direct(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ConventionKind::Direct,
            template: template.into(),
            pad_width: DEFAULT_PAD_WIDTH,
            alternate: None,
            prefix_rule: None,
        }
    }

    /// Sequence convention with the given prefix rule
    #[must_use]
    pub fn sequence(
        name: impl Into<String>,
        template: impl Into<String>,
        prefix_rule: PrefixRule,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ConventionKind::Sequence,
            template: template.into(),
            pad_width: DEFAULT_PAD_WIDTH,
            alternate: None,
            prefix_rule: Some(prefix_rule),
        }
    }

    /// Date-shifted sequence convention keyed by a date format
    #[must_use]
    pub fn date_shifted(
        name: impl Into<String>,
        template: impl Into<String>,
        date_format: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ConventionKind::DateShiftedSequence,
            template: template.into(),
            pad_width: DEFAULT_PAD_WIDTH,
            alternate: None,
            prefix_rule: Some(PrefixRule::Date {
                format: date_format.into(),
            }),
        }
    }

    /// With zero-padding width
    #[inline]
    #[must_use]
    pub fn with_pad_width(mut self, width: usize) -> Self {
        self.pad_width = width;
        self
    }

    /// With alternate code transform
    #[inline]
    #[must_use]
    pub fn with_alternate(mut self, transform: CodeTransform) -> Self {
        self.alternate = Some(transform);
        self
    }

    /// Check the entry is well formed
    ///
    /// # Errors
    /// Returns [`RegistryError`] describing the first problem found.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let required: &[&'static str] = match self.kind {
            ConventionKind::Direct => &[CODE_PLACEHOLDER],
            ConventionKind::Sequence | ConventionKind::DateShiftedSequence => {
                &[PREFIX_PLACEHOLDER, INDEX_PLACEHOLDER]
            }
        };
        for &placeholder in required {
            if !self.template.contains(placeholder) {
                return Err(RegistryError::MissingPlaceholder {
                    name: self.name.clone(),
                    placeholder,
                });
            }
        }

        if self.kind.is_sequence() && !(1..=MAX_PAD_WIDTH).contains(&self.pad_width) {
            return Err(RegistryError::InvalidPadWidth {
                name: self.name.clone(),
                width: self.pad_width,
                max: MAX_PAD_WIDTH,
            });
        }

        match (self.kind, &self.prefix_rule) {
            (ConventionKind::Direct, Some(_)) => Err(self.rule_error("direct conventions take no prefix rule")),
            (ConventionKind::Direct, None) => Ok(()),
            (_, None) => Err(self.rule_error("sequence conventions need a prefix rule")),
            (ConventionKind::DateShiftedSequence, Some(rule)) if !rule.needs_date() => {
                Err(self.rule_error("date-shifted conventions need a date prefix rule"))
            }
            (_, Some(PrefixRule::Date { format })) => {
                let broken = format.is_empty()
                    || StrftimeItems::new(format).any(|item| matches!(item, Item::Error));
                if broken {
                    Err(self.rule_error(&format!("invalid date format `{format}`")))
                } else {
                    Ok(())
                }
            }
            (_, Some(_)) => Ok(()),
        }
    }

    fn rule_error(&self, reason: &str) -> RegistryError {
        RegistryError::InvalidPrefixRule {
            name: self.name.clone(),
            reason: reason.to_string(),
        }
    }

    /// Locator of the single asset for `code`
    #[must_use]
    pub fn direct_locator(&self, base: &str, code: &str) -> String {
        render(&self.template, base, &[(CODE_PLACEHOLDER, code)])
    }

    /// Alternate code, if a transform is set and changes the code
    #[must_use]
    pub fn alternate_code(&self, code: &str) -> Option<String> {
        self.alternate
            .as_ref()
            .map(|t| t.apply(code))
            .filter(|alt| alt != code)
    }

    /// Locator of item `index` under `prefix`, index zero-padded
    #[must_use]
    pub fn sequence_locator(&self, base: &str, prefix: &str, index: u32) -> String {
        let padded = format!("{index:0width$}", width = self.pad_width);
        render(
            &self.template,
            base,
            &[(PREFIX_PLACEHOLDER, prefix), (INDEX_PLACEHOLDER, &padded)],
        )
    }

    /// Prefix this convention derives from `input`, shifted by `offset_days`
    ///
    /// Returns `None` when the rule needs a date the input does not carry,
    /// or the code is blank.
    #[must_use]
    pub fn prefix_for(&self, input: &PrefixInput<'_>, offset_days: i32) -> Option<String> {
        match self.prefix_rule.as_ref()? {
            PrefixRule::Code => Some(input.code.trim().to_string()).filter(|p| !p.is_empty()),
            PrefixRule::CodeLowercase => {
                Some(input.code.trim().to_lowercase()).filter(|p| !p.is_empty())
            }
            PrefixRule::Date { format } => {
                let date = input
                    .base_date?
                    .checked_add_signed(Duration::days(i64::from(offset_days)))?;
                Some(date.format(format).to_string())
            }
        }
    }
}

/// Single-pass placeholder substitution
///
/// Unknown `{...}` sequences are copied through untouched.
fn render(template: &str, base: &str, values: &[(&str, &str)]) -> String {
    let base = base.trim_end_matches('/');
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let matched = std::iter::once((BASE_PLACEHOLDER, base))
            .chain(values.iter().copied())
            .find(|(placeholder, _)| tail.starts_with(placeholder));
        match matched {
            Some((placeholder, value)) => {
                out.push_str(value);
                rest = &tail[placeholder.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
