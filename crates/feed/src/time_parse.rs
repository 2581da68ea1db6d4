// ABOUTME: Flexible date parsing for RSS and Atom feed dates.
// ABOUTME: Tries RFC 3339, RFC 2822, and common loose variants before giving up.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parses a datetime string using the formats commonly seen in feeds.
/// Returns a UTC datetime on success, None if no format matches.
pub fn parse_flexible_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // RFC 3339 first (Atom), then RFC 2822 (RSS pubDate).
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Loose variants with a numeric offset.
    let formats_with_tz = [
        // "Mon, 2 Jan 2006 15:04:05 -0700"
        "%a, %e %b %Y %H:%M:%S %z",
        // "02 Jan 2006 15:04:05 -0700"
        "%d %b %Y %H:%M:%S %z",
        // "2006-01-02T15:04:05-0700"
        "%Y-%m-%dT%H:%M:%S%z",
    ];
    for fmt in &formats_with_tz {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // Variants without a timezone are taken as UTC.
    let formats_naive = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%d %b %Y %H:%M:%S",
        "%a, %d %b %Y %H:%M:%S",
    ];
    for fmt in &formats_naive {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    // Bare dates, midnight UTC.
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }

    None
}
