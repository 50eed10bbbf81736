use crate::types::{RawDate, RawEntry};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tracing::debug;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

/// Resolve the first usable date on an entry to a UTC instant.
///
/// Candidates are tried in order: published, updated, created, then the bare
/// date text. Candidates that fail to parse are skipped. `None` means the
/// entry carries no usable date at all.
pub fn resolve_published_at(entry: &RawEntry) -> Option<DateTime<Utc>> {
    let structured = [&entry.published, &entry.updated, &entry.created];

    structured
        .into_iter()
        .flatten()
        .find_map(to_utc)
        .or_else(|| entry.date.as_deref().and_then(parse_date_text))
}

/// Convert a single raw date representation to UTC.
pub fn to_utc(raw: &RawDate) -> Option<DateTime<Utc>> {
    match raw {
        RawDate::Instant(dt) => Some(dt.with_timezone(&Utc)),
        RawDate::Naive { value, offset } => match offset {
            Some(offset) => offset
                .from_local_datetime(value)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
            None => Some(Utc.from_utc_datetime(value)),
        },
        RawDate::Text(text) => parse_date_text(text),
    }
}

/// Parse a free-form date string. Offset-less forms are taken as UTC.
pub fn parse_date_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive));
    }

    debug!("Unparseable date candidate: {:?}", text);
    None
}
