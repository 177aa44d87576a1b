use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

const MONTH: &str = r"(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|June?|July?|Aug(?:ust)?|Sep(?:t(?:ember)?)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)\.?";

static ISO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}-\d{1,2}-\d{1,2}\b").unwrap());
static MONTH_DAY_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b{MONTH}\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}}\b")).unwrap()
});
static DAY_MONTH_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b\d{{1,2}}(?:st|nd|rd|th)?\s+{MONTH}\s+\d{{4}}\b")).unwrap()
});
static MONTH_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)\b{MONTH}\s+\d{{4}}\b")).unwrap());
static US_NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}/\d{1,2}/\d{4}\b").unwrap());

static MONTH_YEAR_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)^{MONTH}\s+\d{{4}}$")).unwrap());
static ORDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").unwrap());
static ABBREV_DOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b([a-z]{3,4})\.").unwrap());
static SEPT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bsept\b").unwrap());

/// Date shapes recognised when scanning page text for anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePattern {
    /// 2024-01-15
    Iso,
    /// January 15, 2024
    MonthDayYear,
    /// 15 January 2024
    DayMonthYear,
    /// January 2024
    MonthYear,
    /// 01/15/2024
    UsNumeric,
}

impl DatePattern {
    fn regex(&self) -> &'static Regex {
        match self {
            DatePattern::Iso => &*ISO_RE,
            DatePattern::MonthDayYear => &*MONTH_DAY_YEAR_RE,
            DatePattern::DayMonthYear => &*DAY_MONTH_YEAR_RE,
            DatePattern::MonthYear => &*MONTH_YEAR_RE,
            DatePattern::UsNumeric => &*US_NUMERIC_RE,
        }
    }
}

/// Returns the first date-looking substring of `text` that parses, trying
/// `patterns` in priority order
pub fn find_date(text: &str, patterns: &[DatePattern]) -> Option<String> {
    let text = normalize_whitespace(text);
    patterns.iter().find_map(|pattern| {
        pattern
            .regex()
            .find_iter(&text)
            .map(|m| m.as_str())
            .find(|candidate| parse_date(candidate).is_some())
            .map(str::to_string)
    })
}

/// Parses free-form English date text into a calendar date.
///
/// Formats are tried in order: ISO, `Month D, YYYY`, `Month YYYY` (day 1),
/// `D Month YYYY`, then `MM/DD/YYYY` with a `DD/MM/YYYY` fallback.
/// Anything else yields `None`; callers drop the entry.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let cleaned = clean(text);
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(&cleaned, "%Y-%m-%d") {
        return Some(date);
    }

    for fmt in ["%B %d, %Y", "%B %d %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, fmt) {
            return Some(date);
        }
    }

    if MONTH_YEAR_ONLY_RE.is_match(&cleaned) {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("1 {}", cleaned), "%d %B %Y") {
            return Some(date);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(&cleaned, "%d %B %Y") {
        return Some(date);
    }

    for fmt in ["%m/%d/%Y", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, fmt) {
            return Some(date);
        }
    }

    None
}

pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn clean(text: &str) -> String {
    let text = normalize_whitespace(text);
    let text = ORDINAL_RE.replace_all(&text, "$1");
    let text = ABBREV_DOT_RE.replace_all(&text, "$1");
    let text = SEPT_RE.replace_all(&text, "Sep");
    text.trim_matches(|c: char| c == ',' || c == '.' || c == ';' || c == ':')
        .trim()
        .to_string()
}
