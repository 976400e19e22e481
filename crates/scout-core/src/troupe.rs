//! Troupe labels inferred from listing titles
//!
//! A troupe is a display-only grouping label. Inference is a keyword
//! lookup against a fixed token table; no match means no troupe.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of troupes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Troupe {
    /// 花組
    Flower,
    /// 月組
    Moon,
    /// 雪組
    Snow,
    /// 星組
    Star,
    /// 宙組
    Cosmos,
    /// 専科
    Superior,
}

impl Troupe {
    /// All troupes in canonical order
    pub const ALL: [Troupe; 6] = [
        Troupe::Flower,
        Troupe::Moon,
        Troupe::Snow,
        Troupe::Star,
        Troupe::Cosmos,
        Troupe::Superior,
    ];

    /// Short label as printed on programmes
    #[inline]
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Flower => "花",
            Self::Moon => "月",
            Self::Snow => "雪",
            Self::Star => "星",
            Self::Cosmos => "宙",
            Self::Superior => "専科",
        }
    }

    /// English display name
    #[inline]
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Flower => "Flower",
            Self::Moon => "Moon",
            Self::Snow => "Snow",
            Self::Star => "Star",
            Self::Cosmos => "Cosmos",
            Self::Superior => "Superior",
        }
    }

    /// Theme colour as `#rrggbb`
    #[inline]
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Flower => "#e85a9b",
            Self::Moon => "#f2c200",
            Self::Snow => "#2fa36b",
            Self::Star => "#2f6fd6",
            Self::Cosmos => "#8a4fc7",
            Self::Superior => "#8c8c8c",
        }
    }

    /// Infer the troupe named in `text`
    ///
    /// The earliest keyword occurrence wins. CJK tokens match as
    /// substrings; romanised aliases must be whole words.
    #[must_use]
    pub fn infer(text: &str) -> Option<Troupe> {
        if text.is_empty() {
            return None;
        }

        let cjk = KANJI_TOKENS
            .iter()
            .filter_map(|(token, troupe)| text.find(token).map(|pos| (pos, *troupe)));

        let words = ascii_words(text).into_iter().filter_map(|(pos, word)| {
            ALIAS_TOKENS
                .iter()
                .find(|(alias, _)| alias.eq_ignore_ascii_case(word))
                .map(|(_, troupe)| (pos, *troupe))
        });

        // ties go to the CJK token
        cjk.chain(words).min_by_key(|(pos, _)| *pos).map(|(_, t)| t)
    }
}

impl fmt::Display for Troupe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

const KANJI_TOKENS: [(&str, Troupe); 6] = [
    ("花組", Troupe::Flower),
    ("月組", Troupe::Moon),
    ("雪組", Troupe::Snow),
    ("星組", Troupe::Star),
    ("宙組", Troupe::Cosmos),
    ("専科", Troupe::Superior),
];

const ALIAS_TOKENS: [(&str, Troupe); 12] = [
    ("hanagumi", Troupe::Flower),
    ("flower", Troupe::Flower),
    ("tsukigumi", Troupe::Moon),
    ("moon", Troupe::Moon),
    ("yukigumi", Troupe::Snow),
    ("snow", Troupe::Snow),
    ("hoshigumi", Troupe::Star),
    ("star", Troupe::Star),
    ("soragumi", Troupe::Cosmos),
    ("cosmos", Troupe::Cosmos),
    ("senka", Troupe::Superior),
    ("superior", Troupe::Superior),
];

/// ASCII alphanumeric runs with their byte offsets
fn ascii_words(text: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        if c.is_ascii_alphanumeric() {
            start.get_or_insert(i);
        } else if let Some(s) = start.take() {
            words.push((s, &text[s..i]));
        }
    }
    if let Some(s) = start {
        words.push((s, &text[s..]));
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_kanji_tokens() {
        assert_eq!(Troupe::infer("花組 Goethe"), Some(Troupe::Flower));
        assert_eq!(Troupe::infer("宙組公演『シャーロック』"), Some(Troupe::Cosmos));
        assert_eq!(Troupe::infer("専科 特別出演"), Some(Troupe::Superior));
    }

    #[test]
    fn earliest_token_wins() {
        assert_eq!(Troupe::infer("星組・月組合同"), Some(Troupe::Star));
        assert_eq!(Troupe::infer("Snow troupe with 花組 guests"), Some(Troupe::Snow));
    }

    #[test]
    fn aliases_match_whole_words_only() {
        assert_eq!(Troupe::infer("Hoshigumi revue"), Some(Troupe::Star));
        assert_eq!(Troupe::infer("Starlight Express"), None);
        assert_eq!(Troupe::infer("Moonlight"), None);
    }

    #[test]
    fn unknown_titles_yield_none() {
        assert_eq!(Troupe::infer("Goethe"), None);
        assert_eq!(Troupe::infer(""), None);
        // a bare character is too common to be a troupe marker
        assert_eq!(Troupe::infer("花束"), None);
    }

    #[test]
    fn labels_and_colors() {
        assert_eq!(Troupe::Flower.label(), "花");
        assert_eq!(Troupe::Flower.to_string(), "Flower");
        for troupe in Troupe::ALL {
            assert!(troupe.color().starts_with('#'));
            assert_eq!(troupe.color().len(), 7);
        }
    }
}
