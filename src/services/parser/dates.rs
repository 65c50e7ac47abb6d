use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, Weekday};
use regex::Regex;

static WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday|mon|tues?|wed|thu(?:rs?)?|fri|sat|sun)\b\.?,?",
    )
    .expect("weekday pattern")
});

static FILLER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:of|the)\b").expect("filler pattern"));

static MONTH_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\b\.?",
    )
    .expect("month pattern")
});

static ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").expect("ordinal pattern"));

static SLASHED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{2,4}$").expect("slashed pattern"));

static HYPHENATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}-\d{1,2}-\d{2,4}$").expect("hyphenated pattern"));

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("digits pattern"));

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s,./-]*$").expect("separators pattern"));

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Date text with month names turned into numbers and ordinals stripped.
struct CleanDate {
    text: String,
    /// Position, among the numeric components, of a month that was written
    /// out in words. A named month makes the component order unambiguous.
    named_month: Option<usize>,
}

fn clean(raw: &str) -> CleanDate {
    let without_weekday = WEEKDAY.replace_all(raw.trim(), "");
    let without_filler = FILLER.replace_all(&without_weekday, "");
    let s = without_filler.trim();

    let (text, named_month) = match MONTH_NAME.find(s) {
        Some(m) => {
            let prefix: String = m.as_str().to_lowercase().chars().take(3).collect();
            match MONTHS.iter().position(|name| *name == prefix) {
                Some(index) => {
                    let position = DIGITS.find_iter(&s[..m.start()]).count();
                    let text = format!("{}{:02}{}", &s[..m.start()], index + 1, &s[m.end()..]);
                    (text, Some(position))
                }
                None => (s.to_string(), None),
            }
        }
        None => (s.to_string(), None),
    };

    CleanDate {
        text: ORDINAL.replace_all(&text, "$1").trim().to_string(),
        named_month,
    }
}

/// Numeric components of a date, if the text holds exactly three of them and
/// nothing else besides separators.
fn components(text: &str) -> Option<[&str; 3]> {
    let tokens: Vec<&str> = DIGITS.find_iter(text).map(|m| m.as_str()).collect();
    if !SEPARATORS.is_match(&DIGITS.replace_all(text, "")) {
        return None;
    }
    match tokens.as_slice() {
        [a, b, c] => Some([*a, *b, *c]),
        _ => None,
    }
}

fn number(token: &str) -> Option<u32> {
    token.parse().ok()
}

fn year(token: &str) -> Option<i32> {
    let value: i32 = token.parse().ok()?;
    match token.len() {
        1 | 2 => Some(2000 + value),
        4 => Some(value),
        _ => None,
    }
}

fn ymd(year_token: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year(year_token)?, number(month)?, number(day)?)
}

/// Reads a date whose month was given by name.
fn named(text: &str, month_at: usize) -> Option<NaiveDate> {
    let [a, b, c] = components(text)?;
    match month_at {
        0 => ymd(c, a, b),
        1 if a.len() == 4 => ymd(a, b, c),
        1 => ymd(c, b, a),
        2 if a.len() == 4 => ymd(a, c, b),
        _ => None,
    }
}

/// `a/b/y` where `a > 12` can only be a day; otherwise month first.
fn day_or_month_first(a: &str, b: &str, y: &str) -> Option<NaiveDate> {
    if number(a)? > 12 {
        ymd(y, b, a)
    } else {
        ymd(y, a, b)
    }
}

fn split_three(text: &str, delimiter: char) -> Option<[&str; 3]> {
    let mut parts = text.split(delimiter);
    let parts = [parts.next()?, parts.next()?, parts.next()?];
    Some(parts)
}

/// Parses the event date the way the form's date field is filled.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let clean = clean(raw);

    if let Some(month_at) = clean.named_month {
        return named(&clean.text, month_at);
    }

    if SLASHED.is_match(&clean.text) {
        let [a, b, y] = split_three(&clean.text, '/')?;
        return day_or_month_first(a, b, y);
    }

    if HYPHENATED.is_match(&clean.text) {
        let [a, b, y] = split_three(&clean.text, '-')?;
        return day_or_month_first(a, b, y);
    }

    let [a, b, c] = components(&clean.text)?;
    if a.len() == 4 {
        ymd(a, b, c)
    } else {
        day_or_month_first(a, b, c)
    }
}

/// Re-expresses a date as `DD/Mon/YY`, e.g. `05/Apr/25`.
///
/// Text that can't be read as a date comes back unchanged.
pub fn format_date(raw: &str) -> String {
    match parse_event_date(raw) {
        Some(date) => date.format("%d/%b/%y").to_string(),
        None => {
            tracing::warn!(date = raw, "could not parse event date, keeping original text");
            raw.to_string()
        }
    }
}

/// Calendar date used for the day-of-week check. Purely numeric dates are
/// read day-first, falling back to month-first when that isn't a real date.
fn weekday_date(raw: &str) -> Option<NaiveDate> {
    let clean = clean(raw);

    if let Some(month_at) = clean.named_month {
        return named(&clean.text, month_at);
    }

    let [a, b, c] = components(&clean.text)?;
    if a.len() == 4 {
        return ymd(a, b, c);
    }
    ymd(c, b, a).or_else(|| ymd(c, a, b))
}

pub fn is_saturday(raw: &str) -> bool {
    match weekday_date(raw) {
        Some(date) => {
            let saturday = date.weekday() == Weekday::Sat;
            tracing::debug!(date = %date, saturday, "resolved booking weekday");
            saturday
        }
        None => {
            tracing::debug!(date = raw, "could not resolve weekday, assuming not Saturday");
            false
        }
    }
}
