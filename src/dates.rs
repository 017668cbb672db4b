use crate::normalize::normalize;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Canonical Spanish month names, 1-based.
const MONTHS: [(&str, u32); 12] = [
    ("ENERO", 1),
    ("FEBRERO", 2),
    ("MARZO", 3),
    ("ABRIL", 4),
    ("MAYO", 5),
    ("JUNIO", 6),
    ("JULIO", 7),
    ("AGOSTO", 8),
    ("SEPTIEMBRE", 9),
    ("OCTUBRE", 10),
    ("NOVIEMBRE", 11),
    ("DICIEMBRE", 12),
];

static SLASH_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("slash date regex must compile"));

/// Resolves a raw date fragment ("5 de enero de 2024", "05/01/2024") to an
/// instant pinned at 12:00 UTC of that calendar day. Midday keeps the stored
/// day stable under downstream day-truncation regardless of viewer offset.
///
/// Token scan first: periods and commas stripped, `de` connectives dropped,
/// the first integer <= 31 is the day, an integer > 31 is the year, and a
/// token carrying a canonical month name (or a configured misspelling alias)
/// resolves the month. Slash form `D/M/Y` is the fallback; `M/D/Y` is never
/// assumed. Two-digit years are not handled.
pub fn resolve_date(raw: &str, month_aliases: &BTreeMap<String, u32>) -> Option<DateTime<Utc>> {
    let cleaned = raw.replace(['.', ','], " ");

    let mut day: Option<u32> = None;
    let mut month: Option<u32> = None;
    let mut year: Option<i32> = None;

    for token in cleaned.split_whitespace() {
        let folded = normalize(token);
        if folded.is_empty() || folded == "DE" {
            continue;
        }

        if let Ok(number) = folded.parse::<i32>() {
            if number > 31 && year.is_none() {
                year = Some(number);
            } else if (1..=31).contains(&number) && day.is_none() {
                day = Some(number as u32);
            }
            continue;
        }

        if month.is_none() {
            month = match_month(&folded, month_aliases);
        }
    }

    if let (Some(day), Some(month), Some(year)) = (day, month, year)
        && let Some(date) = NaiveDate::from_ymd_opt(year, month, day)
    {
        return at_noon(date);
    }

    resolve_slash_date(raw.trim())
}

/// Fallback-safe variant: unparseable input resolves to today's noon. The
/// fallback is logged, never raised; downstream consumers require some date.
pub fn resolve_date_or_now(raw: &str, month_aliases: &BTreeMap<String, u32>) -> DateTime<Utc> {
    if let Some(resolved) = resolve_date(raw, month_aliases) {
        return resolved;
    }

    tracing::warn!(raw, "unparseable date; defaulting to today");
    at_noon(Utc::now().date_naive()).unwrap_or_else(Utc::now)
}

fn match_month(token: &str, aliases: &BTreeMap<String, u32>) -> Option<u32> {
    for (name, number) in MONTHS {
        if token.contains(name) {
            return Some(number);
        }
    }

    for (alias, number) in aliases {
        let alias = normalize(alias);
        if !alias.is_empty() && token.contains(&alias) && (1..=12).contains(number) {
            return Some(*number);
        }
    }

    None
}

fn resolve_slash_date(raw: &str) -> Option<DateTime<Utc>> {
    let caps = SLASH_DATE_RE.captures(raw)?;
    let day = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let month = caps.get(2)?.as_str().parse::<u32>().ok()?;
    let year = caps.get(3)?.as_str().parse::<i32>().ok()?;
    at_noon(NaiveDate::from_ymd_opt(year, month, day)?)
}

fn at_noon(date: NaiveDate) -> Option<DateTime<Utc>> {
    let noon = date.and_hms_opt(12, 0, 0)?;
    Some(Utc.from_utc_datetime(&noon))
}
