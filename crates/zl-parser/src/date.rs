//! Date token resolution.
//!
//! The grammar is an ordered list of independent parsers tried in fixed
//! precedence; the first success wins:
//!
//! 1. Quarter (`Q3 2025`, `2025 Q3`)
//! 2. German month name + year (`Februar 2025`, `2025 Feb`)
//! 3. Generic calendar (`2025-01-15`, `2025-01-15 14:30`, `2025/01/15`, `2025`)
//! 4. Day.Month.Year fallback (`15.1.2025`, `15.1.2025 14:30:05`)

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Outcome of resolving a single date token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedDate {
    pub instant: NaiveDateTime,
    /// Human-readable override set for quarter and month-name inputs.
    pub display_label: Option<String>,
    pub has_explicit_time: bool,
}

/// Resolve a date token. Total: returns `None` on failure, never panics.
#[must_use]
pub fn resolve(token: &str) -> Option<ResolvedDate> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    parse_quarter(token)
        .or_else(|| parse_month_name(token))
        .or_else(|| parse_calendar(token))
        .or_else(|| parse_day_month_year(token))
}

static QUARTER_FIRST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)q([1-4])\s+(\d{4})$").expect("quarter regex"));
static YEAR_FIRST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)(\d{4})\s+q([1-4])$").expect("quarter regex"));

fn parse_quarter(token: &str) -> Option<ResolvedDate> {
    let (quarter, year) = if let Some(caps) = QUARTER_FIRST.captures(token) {
        (caps[1].parse::<u32>().ok()?, caps[2].parse::<i32>().ok()?)
    } else if let Some(caps) = YEAR_FIRST.captures(token) {
        (caps[2].parse::<u32>().ok()?, caps[1].parse::<i32>().ok()?)
    } else {
        return None;
    };

    let month = (quarter - 1) * 3 + 1;
    let instant = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;
    Some(ResolvedDate {
        instant,
        display_label: Some(format!("Q{quarter} {year}")),
        has_explicit_time: false,
    })
}

/// Canonical German month names with their accepted spellings.
const MONTHS: &[(&str, u32, &[&str])] = &[
    ("Januar", 1, &["januar", "jan"]),
    ("Februar", 2, &["februar", "feb"]),
    ("März", 3, &["märz", "maerz", "mär", "mrz"]),
    ("April", 4, &["april", "apr"]),
    ("Mai", 5, &["mai"]),
    ("Juni", 6, &["juni", "jun"]),
    ("Juli", 7, &["juli", "jul"]),
    ("August", 8, &["august", "aug"]),
    ("September", 9, &["september", "sept", "sep"]),
    ("Oktober", 10, &["oktober", "okt"]),
    ("November", 11, &["november", "nov"]),
    ("Dezember", 12, &["dezember", "dez"]),
];

fn lookup_month(word: &str) -> Option<(&'static str, u32)> {
    let lower = word.to_lowercase();
    MONTHS
        .iter()
        .find(|(_, _, aliases)| aliases.contains(&lower.as_str()))
        .map(|(canonical, number, _)| (*canonical, *number))
}

fn parse_month_name(token: &str) -> Option<ResolvedDate> {
    let mut parts = token.split_whitespace();
    let first = parts.next()?;
    let second = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    // Month and year accepted in either order.
    let (month_word, year_word) = if first.chars().all(|c| c.is_ascii_digit()) {
        (second, first)
    } else {
        (first, second)
    };
    if year_word.len() != 4 {
        return None;
    }
    let year = year_word.parse::<i32>().ok()?;
    let (canonical, month) = lookup_month(month_word)?;

    let instant = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;
    Some(ResolvedDate {
        instant,
        display_label: Some(format!("{canonical} {year}")),
        has_explicit_time: false,
    })
}

/// Locale-neutral calendar forms, most specific first.
const CALENDAR_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];
const CALENDAR_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

static BARE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("year regex"));

fn parse_calendar(token: &str) -> Option<ResolvedDate> {
    let has_explicit_time = token.contains(':');

    for format in CALENDAR_DATETIME_FORMATS {
        if let Ok(instant) = NaiveDateTime::parse_from_str(token, format) {
            return Some(ResolvedDate {
                instant,
                display_label: None,
                has_explicit_time,
            });
        }
    }
    for format in CALENDAR_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(token, format) {
            return Some(ResolvedDate {
                instant: date.and_hms_opt(0, 0, 0)?,
                display_label: None,
                has_explicit_time,
            });
        }
    }
    if BARE_YEAR.is_match(token) {
        let year = token.parse::<i32>().ok()?;
        return Some(ResolvedDate {
            instant: NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?,
            display_label: None,
            has_explicit_time,
        });
    }
    None
}

static DAY_MONTH_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4})(?:\s+(\d{1,2}):(\d{2})(?::(\d{2}))?)?$")
        .expect("day.month.year regex")
});

fn parse_day_month_year(token: &str) -> Option<ResolvedDate> {
    let caps = DAY_MONTH_YEAR.captures(token)?;
    let day = caps[1].parse::<u32>().ok()?;
    let month = caps[2].parse::<u32>().ok()?;
    let year = caps[3].parse::<i32>().ok()?;

    // Out-of-range day/month values are handed to chrono, which rejects them
    // outright instead of rolling over into an adjacent month.
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let (time, has_explicit_time) = match caps.get(4) {
        Some(hour) => {
            let hour = hour.as_str().parse::<u32>().ok()?;
            let minute = caps[5].parse::<u32>().ok()?;
            let second = caps
                .get(6)
                .map_or(Some(0), |s| s.as_str().parse::<u32>().ok())?;
            (NaiveTime::from_hms_opt(hour, minute, second)?, true)
        }
        None => (NaiveTime::from_hms_opt(0, 0, 0)?, false),
    };

    Some(ResolvedDate {
        instant: date.and_time(time),
        display_label: None,
        has_explicit_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn must_resolve(token: &str) -> ResolvedDate {
        resolve(token).unwrap_or_else(|| panic!("expected {token:?} to resolve"))
    }

    #[test]
    fn resolves_iso_date_without_time() {
        let result = must_resolve("2025-01-01");
        assert_eq!(
            result.instant,
            NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert!(!result.has_explicit_time);
        assert_eq!(result.display_label, None);
    }

    #[test]
    fn resolves_iso_datetime() {
        let result = must_resolve("2025-03-14 09:26:53");
        assert_eq!(
            result.instant,
            NaiveDate::from_ymd_opt(2025, 3, 14)
                .unwrap()
                .and_hms_opt(9, 26, 53)
                .unwrap()
        );
        assert!(result.has_explicit_time);
    }

    #[test]
    fn resolves_german_day_month_year_with_time() {
        let result = must_resolve("15.01.2025 14:30");
        assert_eq!(
            result.instant,
            NaiveDate::from_ymd_opt(2025, 1, 15)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap()
        );
        assert!(result.has_explicit_time);
    }

    #[test]
    fn resolves_german_date_without_time() {
        let result = must_resolve("1.7.2025");
        assert_eq!(
            result.instant.date(),
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
        );
        assert!(!result.has_explicit_time);
    }

    #[test]
    fn resolves_quarter_in_both_orders() {
        let result = must_resolve("Q3 2025");
        assert_eq!(
            result.instant.date(),
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
        );
        assert_eq!(result.display_label.as_deref(), Some("Q3 2025"));
        assert!(!result.has_explicit_time);

        let reversed = must_resolve("2025 q1");
        assert_eq!(
            reversed.instant.date(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
        assert_eq!(reversed.display_label.as_deref(), Some("Q1 2025"));
    }

    #[test]
    fn resolves_month_name_with_canonical_label() {
        let result = must_resolve("Februar 2025");
        assert_eq!(
            result.instant.date(),
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()
        );
        assert_eq!(result.display_label.as_deref(), Some("Februar 2025"));
    }

    #[test]
    fn resolves_month_abbreviation_case_insensitive() {
        let result = must_resolve("2025 DEZ");
        assert_eq!(
            result.instant.date(),
            NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
        );
        assert_eq!(result.display_label.as_deref(), Some("Dezember 2025"));
    }

    #[test]
    fn resolves_umlaut_free_march_spelling() {
        let result = must_resolve("maerz 2026");
        assert_eq!(
            result.instant.date(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
        assert_eq!(result.display_label.as_deref(), Some("März 2026"));
    }

    #[test]
    fn resolves_bare_year_as_january_first() {
        let result = must_resolve("2031");
        assert_eq!(
            result.instant.date(),
            NaiveDate::from_ymd_opt(2031, 1, 1).unwrap()
        );
        assert!(!result.has_explicit_time);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(resolve("not-a-date"), None);
        assert_eq!(resolve(""), None);
        assert_eq!(resolve("   "), None);
        assert_eq!(resolve("Q5 2025"), None);
    }

    #[test]
    fn rejects_out_of_range_day_and_month() {
        // chrono refuses to roll these over into adjacent months.
        assert_eq!(resolve("32.01.2025"), None);
        assert_eq!(resolve("15.13.2025"), None);
        assert_eq!(resolve("2025-13-01"), None);
    }

    #[test]
    fn quarter_beats_generic_parse() {
        // Precedence: the quarter grammar claims the token before the
        // calendar parsers see it.
        let result = must_resolve("q2 2024");
        assert_eq!(result.display_label.as_deref(), Some("Q2 2024"));
        assert_eq!(
            result.instant.date(),
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
        );
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let result = must_resolve("  2025-01-01  ");
        assert_eq!(
            result.instant.date(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
    }
}
