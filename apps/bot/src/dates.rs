//! Publication-date helpers.
//!
//! Sources report timestamps like `2026-02-11T18:39:21+0300`. Offsets are
//! dropped and the wall-clock part is compared against local time.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime};

const MONTHS_GENITIVE: [&str; 12] = [
    "января", "февраля", "марта", "апреля", "мая", "июня", "июля", "августа", "сентября",
    "октября", "ноября", "декабря",
];

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn today() -> NaiveDate {
    now().date()
}

/// Local timestamp in the format the state files have always used.
pub fn now_iso() -> String {
    now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Date part of a published timestamp.
pub fn parse_published_date(published: &str) -> Option<NaiveDate> {
    let trimmed = published.trim();
    if trimmed.is_empty() {
        return None;
    }
    let without_zone = trimmed.split('+').next()?.split('Z').next()?;
    let date_part = without_zone.split('T').next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Full wall-clock timestamp; a bare date becomes midnight.
pub fn parse_published_datetime(published: &str) -> Option<NaiveDateTime> {
    let trimmed = published.trim();
    if trimmed.is_empty() {
        return None;
    }
    if !trimmed.contains('T') {
        return NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0));
    }
    if let Ok(dt) = DateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }
    let local_part = trimmed.split('+').next()?.trim_end_matches('Z');
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(local_part, fmt).ok())
}

/// True when the posting is at most `days` old. Postings without a
/// parseable date are kept, and so is everything when `days <= 0`.
pub fn within_days(published: &str, days: i64, today: NaiveDate) -> bool {
    if days <= 0 {
        return true;
    }
    match parse_published_date(published) {
        Some(date) => date >= today - Duration::days(days),
        None => true,
    }
}

/// Only full timestamps count; a bare date or garbage is never "today".
pub fn is_from_today(published: &str, today: NaiveDate) -> bool {
    let Some((date_part, _)) = published.split_once('T') else {
        return false;
    };
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(|d| d == today)
        .unwrap_or(false)
}

/// Russian "time ago" label shown under each posting.
pub fn format_relative(published: &str, now: NaiveDateTime) -> String {
    if published.trim().is_empty() {
        return String::new();
    }
    let Some(dt) = parse_published_datetime(published) else {
        return published
            .split_once('T')
            .map(|(date, _)| date.to_string())
            .unwrap_or_else(|| published.to_string());
    };

    let delta = now - dt;
    if delta < Duration::zero() {
        return "только что".to_string();
    }

    match delta.num_days() {
        0 => {
            let hours = delta.num_hours();
            if hours > 0 {
                return format!("{hours} ч. назад");
            }
            match delta.num_minutes() {
                0 => "только что".to_string(),
                minutes => format!("{minutes} мин. назад"),
            }
        }
        1 => "вчера".to_string(),
        days @ 2..=6 => format!("{days} дн. назад"),
        days @ 7..=29 => format!("{} нед. назад", days / 7),
        _ => {
            use chrono::Datelike;
            format!(
                "{} {} {}",
                dt.day(),
                MONTHS_GENITIVE[dt.month0() as usize],
                dt.year()
            )
        }
    }
}
