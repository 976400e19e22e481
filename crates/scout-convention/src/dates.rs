//! Date inference from free text and product codes
//!
//! Storefront codes and titles often embed the performance or release
//! date. Recognised forms:
//! - delimited: `2024-03-15`, `2024/3/15`, `2024.03.15`, `2024年3月15日`
//! - compact: an 8-digit `YYYYMMDD` run or a 6-digit `YYMMDD` run
//!
//! Impossible calendar dates are rejected rather than clamped.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static DELIMITED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"((?:19|20)[0-9]{2})\s*[-/.年]\s*([0-9]{1,2})\s*[-/.月]\s*([0-9]{1,2})")
        .unwrap_or_else(|e| unreachable!("static date pattern: {e}"))
});

static DIGIT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+").unwrap_or_else(|e| unreachable!("static digit pattern: {e}")));

/// Infer the first plausible date in `text`
///
/// Delimited forms win over compact digit runs, since a bare run of
/// digits is just as likely to be a catalogue number.
#[must_use]
pub fn infer_date(text: &str) -> Option<NaiveDate> {
    for caps in DELIMITED.captures_iter(text) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    DIGIT_RUN
        .find_iter(text)
        .find_map(|run| parse_compact(run.as_str()))
}

/// Parse an 8-digit `YYYYMMDD` or 6-digit `YYMMDD` string
///
/// Six-digit years are read as 2000-2099.
#[must_use]
pub fn parse_compact(digits: &str) -> Option<NaiveDate> {
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (year, rest) = match digits.len() {
        8 => (digits[..4].parse::<i32>().ok()?, &digits[4..]),
        6 => (2000 + digits[..2].parse::<i32>().ok()?, &digits[2..]),
        _ => return None,
    };
    if !(1900..=2099).contains(&year) {
        return None;
    }
    let month = rest[..2].parse().ok()?;
    let day = rest[2..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn infers_delimited_forms() {
        assert_eq!(infer_date("公演日 2024-03-15"), Some(ymd(2024, 3, 15)));
        assert_eq!(infer_date("2024/3/5 matinee"), Some(ymd(2024, 3, 5)));
        assert_eq!(infer_date("2023.12.01"), Some(ymd(2023, 12, 1)));
        assert_eq!(infer_date("2024年3月15日 花組"), Some(ymd(2024, 3, 15)));
    }

    #[test]
    fn infers_compact_runs() {
        assert_eq!(infer_date("PG20240315A"), Some(ymd(2024, 3, 15)));
        assert_eq!(infer_date("st240401"), Some(ymd(2024, 4, 1)));
    }

    #[test]
    fn skips_invalid_runs_and_keeps_looking() {
        assert_eq!(infer_date("99999999 then 20240229"), Some(ymd(2024, 2, 29)));
        assert_eq!(infer_date("20230229"), None);
    }

    #[test]
    fn ignores_codes_without_dates() {
        assert_eq!(infer_date("AB100"), None);
        assert_eq!(infer_date("Goethe"), None);
        assert_eq!(infer_date(""), None);
    }
}
