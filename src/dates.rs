//! Date parsing and display shared by the post repository, the feeds and the
//! publishing adapters.

use anyhow::anyhow;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Parses a frontmatter date. Accepts `2024-01-31`, `2024-1-5`,
/// `2024-01-31T10:00:00` and full RFC 3339 timestamps.
pub(crate) fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(datetime.date());
        }
    }
    Err(anyhow!("Invalid date format: {value:?}"))
}

/// `May 1, 2023`
pub(crate) fn format_long(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Short distance from `today`: `2y ago`, `3mo ago`, `5d ago` or `Today`.
pub(crate) fn format_relative(date: NaiveDate, today: NaiveDate) -> String {
    let mut months = (today.year() - date.year()) * 12 + today.month() as i32 - date.month() as i32;
    if today.day() < date.day() {
        months -= 1;
    }
    if months >= 12 {
        format!("{}y ago", months / 12)
    } else if months > 0 {
        format!("{months}mo ago")
    } else {
        let days = (today - date).num_days();
        if days > 0 {
            format!("{days}d ago")
        } else {
            "Today".to_string()
        }
    }
}

/// Midnight UTC of `date` in RFC 2822, as RSS wants it.
pub(crate) fn to_rfc2822(date: NaiveDate) -> String {
    date.and_time(NaiveTime::MIN).and_utc().to_rfc2822()
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
