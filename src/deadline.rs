//! Deadlines: parsing what people type, and smuggling the result through a
//! channel topic.
//!
//! Deadlines are naive wall-clock times in the bot's local zone, the same
//! way editors type them.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone};

pub const DEADLINE_TAG: &str = "[deadline: ";

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parses a user supplied deadline.
///
/// Accepted, in order: `2025-09-07 23:00`, `2025-09-07`, `Sep 7 2025 23:00`
/// and `Sep 7 23:00` (the year of `now` is assumed).
pub fn parse_when(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let text = text.trim();

    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .or_else(|| NaiveDateTime::parse_from_str(text, "%b %d %Y %H:%M").ok())
        .or_else(|| {
            let with_year = format!("{text} {}", now.year());
            NaiveDateTime::parse_from_str(&with_year, "%b %d %H:%M %Y").ok()
        })
}

pub fn to_iso(deadline: NaiveDateTime) -> String {
    deadline.format(ISO_FORMAT).to_string()
}

/// Builds the channel topic carrying `deadline`.
pub fn encode(title: &str, deadline: NaiveDateTime) -> String {
    format!("Article: {title} | {DEADLINE_TAG}{}]", to_iso(deadline))
}

/// Reads the deadline back out of a channel topic.
///
/// A missing tag, missing bracket or unparsable timestamp all mean "no
/// deadline".
pub fn decode(topic: &str) -> Option<NaiveDateTime> {
    let start = topic.find(DEADLINE_TAG)? + DEADLINE_TAG.len();
    let end = start + topic[start..].find(']')?;
    parse_iso(&topic[start..end])
}

fn parse_iso(text: &str) -> Option<NaiveDateTime> {
    text.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f").ok())
        .or_else(|| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M").ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.with_timezone(&Local).naive_local())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Seconds since the epoch, treating `deadline` as local time.
pub fn unix_timestamp(deadline: NaiveDateTime) -> i64 {
    Local
        .from_local_datetime(&deadline)
        .earliest()
        .map(|dt| dt.timestamp())
        .unwrap_or_else(|| deadline.and_utc().timestamp())
}

/// Discord's `<t:…:style>` markup, e.g. `R` for relative or `F` for full.
pub fn discord_timestamp(deadline: NaiveDateTime, style: char) -> String {
    format!("<t:{}:{style}>", unix_timestamp(deadline))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{quickcheck, TestResult};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn now() -> NaiveDateTime {
        at(2026, 3, 1, 12, 0)
    }

    #[test]
    fn parses_date_and_time() {
        assert_eq!(
            parse_when("2025-09-07 23:00", now()),
            Some(at(2025, 9, 7, 23, 0))
        );
    }

    #[test]
    fn parses_date_only_as_midnight() {
        assert_eq!(parse_when("2025-09-07", now()), Some(at(2025, 9, 7, 0, 0)));
    }

    #[test]
    fn parses_month_name_with_year() {
        assert_eq!(
            parse_when("Sep 7 2025 23:00", now()),
            Some(at(2025, 9, 7, 23, 0))
        );
    }

    #[test]
    fn month_name_without_year_uses_current_year() {
        assert_eq!(
            parse_when("  Sep 7 23:00 ", now()),
            Some(at(2026, 9, 7, 23, 0))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_when("not a date", now()), None);
        assert_eq!(parse_when("", now()), None);
        assert_eq!(parse_when("2025-13-40 10:00", now()), None);
    }

    #[test]
    fn encodes_topic() {
        assert_eq!(
            encode("Q3 Budget Review", at(2025, 1, 1, 9, 0)),
            "Article: Q3 Budget Review | [deadline: 2025-01-01T09:00:00]"
        );
    }

    #[test]
    fn decode_without_deadline() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("Article: Budget"), None);
        assert_eq!(decode("Article: Budget | [deadline: 2025-01-01T09:00:00"), None);
        assert_eq!(decode("Article: Budget | [deadline: tomorrow-ish]"), None);
    }

    #[test]
    fn decode_accepts_other_iso_shapes() {
        assert_eq!(
            decode("[deadline: 2025-01-01 09:00:00]"),
            Some(at(2025, 1, 1, 9, 0))
        );
        assert_eq!(decode("[deadline: 2025-01-01]"), Some(at(2025, 1, 1, 0, 0)));
    }

    #[test]
    fn bracket_in_title_does_not_confuse_decode() {
        let topic = encode("[draft] Budget", at(2025, 1, 1, 9, 0));
        assert_eq!(decode(&topic), Some(at(2025, 1, 1, 9, 0)));
    }

    quickcheck! {
        fn topic_round_trip(title: String, secs: i64, nanos: u32) -> TestResult {
            let secs = secs.rem_euclid(253_402_300_800);
            let deadline = match DateTime::from_timestamp(secs, nanos % 1_000_000_000) {
                Some(dt) => dt.naive_utc(),
                None => return TestResult::discard(),
            };
            let topic = encode(&title, deadline);
            if topic.matches(DEADLINE_TAG).count() != 1 {
                return TestResult::discard();
            }
            TestResult::from_bool(decode(&topic) == Some(deadline))
        }
    }
}
