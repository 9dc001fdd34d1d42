//! Billing duration policy.
//!
//! Every finalization path (normal stop, idle-resume split, idle discard,
//! manual entry) goes through [`round_to_billing`]; raw elapsed time is
//! never persisted.

use chrono::{DateTime, Utc};

/// Sessions at or below this many raw minutes are billed as-is.
const SHORT_SESSION_MINUTES: u32 = 5;

/// Billing increment applied to anything longer.
const BILLING_INCREMENT_MINUTES: u32 = 15;

/// Rounds raw elapsed minutes into billed minutes.
///
/// Five minutes or less are kept unchanged (no minimum-billing floor);
/// anything longer rounds up to the next 15-minute increment:
/// 6 → 15, 16 → 30, 45 → 45, 46 → 60.
#[must_use]
pub const fn round_to_billing(raw_minutes: u32) -> u32 {
    if raw_minutes <= SHORT_SESSION_MINUTES {
        raw_minutes
    } else {
        raw_minutes.div_ceil(BILLING_INCREMENT_MINUTES) * BILLING_INCREMENT_MINUTES
    }
}

/// Elapsed minutes between two instants, rounded to the nearest whole
/// minute and clamped at zero when `end` precedes `start`.
#[must_use]
pub fn raw_minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    let ms = (end - start).num_milliseconds();
    if ms <= 0 {
        return 0;
    }
    u32::try_from((ms + 30_000) / 60_000).unwrap_or(u32::MAX)
}

/// Formats minutes as a human duration: "45m" below one hour, "1h 5m"
/// otherwise.
#[must_use]
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;

    if hours == 0 {
        format!("{mins}m")
    } else {
        format!("{hours}h {mins}m")
    }
}
