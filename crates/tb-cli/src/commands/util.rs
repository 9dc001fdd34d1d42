//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::Regex;

use tb_core::{StoreError, TimeEntry};

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Parse a time argument as RFC 3339, a bare HH:MM on the current local
/// day, or a relative time.
///
/// Supports:
/// - RFC 3339: "2026-01-15T10:30:00Z"
/// - Wall clock: "14:30" (today, local timezone)
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_datetime(s: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(time) = NaiveTime::parse_from_str(s, "%H:%M") {
        return local_to_utc(Local::now().date_naive(), time);
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid time: {s}. Use RFC 3339 (e.g., 2026-01-15T10:30:00Z), HH:MM, or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(Utc::now() - Duration::minutes(n * minutes_per_unit))
}

/// Parse a wall-clock time in 24-hour HH:MM form.
pub fn parse_hhmm(s: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|_| anyhow::anyhow!("Invalid time: {s}. Use HH:MM (24-hour) format"))
}

/// Converts a local wall-clock moment to UTC.
/// DST ambiguity resolves to the earlier time; a DST gap is an error.
pub fn local_to_utc(date: NaiveDate, time: NaiveTime) -> anyhow::Result<DateTime<Utc>> {
    match Local.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)),
        LocalResult::None => {
            anyhow::bail!("{date} {time} does not exist in the local timezone (DST gap)")
        }
    }
}

/// Label for a day in listings: Today, Yesterday, or the date.
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if today.pred_opt() == Some(date) {
        "Yesterday".to_string()
    } else {
        date.format("%a, %b %-d %Y").to_string()
    }
}

/// Unwraps a ledger read for a display flow, degrading to an empty list
/// on storage errors so views never fail outright.
pub fn entries_or_empty(result: Result<Vec<TimeEntry>, StoreError>) -> Vec<TimeEntry> {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not read ledger, showing no entries");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_datetime_accepts_rfc3339() {
        let dt = parse_datetime("2026-01-15T10:30:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 1, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn parse_datetime_accepts_offsets() {
        let dt = parse_datetime("2026-01-15T10:30:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 1, 15, 8, 30, 0).unwrap());
    }

    #[test]
    fn parse_datetime_accepts_wall_clock() {
        let dt = parse_datetime("14:30").unwrap();
        let local = dt.with_timezone(&Local);
        assert_eq!(local.date_naive(), Local::now().date_naive());
        assert_eq!(local.time(), NaiveTime::from_hms_opt(14, 30, 0).unwrap());
    }

    #[test]
    fn parse_datetime_accepts_relative() {
        let before = Utc::now();
        let dt = parse_datetime("2 hours ago").unwrap();
        let delta = before - dt;
        assert!(delta >= Duration::minutes(119) && delta <= Duration::minutes(121));
    }

    #[test]
    fn parse_datetime_rejects_noise() {
        assert!(parse_datetime("yesterday-ish").is_err());
        assert!(parse_datetime("99:99").is_err());
        assert!(parse_datetime("999999999999 hours ago").is_err());
    }

    #[test]
    fn parse_hhmm_accepts_unpadded_hours() {
        assert_eq!(
            parse_hhmm("9:05").unwrap(),
            NaiveTime::from_hms_opt(9, 5, 0).unwrap()
        );
        assert!(parse_hhmm("9").is_err());
        assert!(parse_hhmm("25:00").is_err());
    }

    #[test]
    fn day_label_names_today_and_yesterday() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
        assert_eq!(day_label(today, today), "Today");
        assert_eq!(
            day_label(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(), today),
            "Yesterday"
        );
        assert_eq!(
            day_label(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(), today),
            "Tue, Mar 4 2025"
        );
    }
}
