use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use rss_news::timestamp::{parse_date_text, resolve_published_at, to_utc};
use rss_news::{RawDate, RawEntry};

#[test]
fn test_published_wins_over_updated() {
    let entry = RawEntry {
        published: Some(RawDate::Text("2024-03-01T10:00:00Z".to_string())),
        updated: Some(RawDate::Text("2024-03-02T10:00:00Z".to_string())),
        ..Default::default()
    };

    let expected = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
    assert_eq!(resolve_published_at(&entry), Some(expected));
}

#[test]
fn test_malformed_candidate_is_skipped() {
    let entry = RawEntry {
        published: Some(RawDate::Text("not a date".to_string())),
        created: Some(RawDate::Text("Tue, 05 Mar 2024 08:30:00 +0900".to_string())),
        ..Default::default()
    };

    let expected = Utc.with_ymd_and_hms(2024, 3, 4, 23, 30, 0).unwrap();
    assert_eq!(resolve_published_at(&entry), Some(expected));
}

#[test]
fn test_naive_time_uses_known_offset_else_utc() {
    let value = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    let kst = FixedOffset::east_opt(9 * 3600).unwrap();

    let with_offset = RawDate::Naive { value, offset: Some(kst) };
    let without_offset = RawDate::Naive { value, offset: None };

    assert_eq!(to_utc(&with_offset), Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
    assert_eq!(to_utc(&without_offset), Some(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()));
}

#[test]
fn test_instant_is_converted_to_utc() {
    let offset = FixedOffset::west_opt(5 * 3600).unwrap();
    let local = offset.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap();

    assert_eq!(
        to_utc(&RawDate::Instant(local)),
        Some(Utc.with_ymd_and_hms(2024, 6, 2, 1, 0, 0).unwrap())
    );
}

#[test]
fn test_bare_date_text_is_last_resort() {
    let entry = RawEntry {
        date: Some("2023-12-31".to_string()),
        ..Default::default()
    };

    assert_eq!(
        resolve_published_at(&entry),
        Some(Utc.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap())
    );
}

#[test]
fn test_naive_text_formats_are_utc() {
    assert_eq!(
        parse_date_text("2024-02-10 12:30:00"),
        Some(Utc.with_ymd_and_hms(2024, 2, 10, 12, 30, 0).unwrap())
    );
    assert_eq!(
        parse_date_text("2024/02/10 12:30:00"),
        Some(Utc.with_ymd_and_hms(2024, 2, 10, 12, 30, 0).unwrap())
    );
}

#[test]
fn test_no_parseable_date_is_none() {
    let entry = RawEntry {
        updated: Some(RawDate::Text("yesterday-ish".to_string())),
        date: Some("   ".to_string()),
        ..Default::default()
    };

    assert_eq!(resolve_published_at(&entry), None);
    assert_eq!(resolve_published_at(&RawEntry::default()), None);
}
