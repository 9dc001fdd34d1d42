//! Session state records and the business-hours gate.

use chrono::{DateTime, Datelike, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::Client;
use crate::rounding::raw_minutes_between;

/// The session currently accruing time. At most one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ActiveSessionRecord")]
pub struct ActiveSession {
    pub client: Client,
    pub start_time: DateTime<Utc>,
    /// Most recent confirmed activity, used for idle detection.
    pub last_activity_time: DateTime<Utc>,
}

/// On-disk shape of the active slot. Older records may lack
/// `lastActivityTime`; it falls back to the start time.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActiveSessionRecord {
    client: Client,
    start_time: DateTime<Utc>,
    #[serde(default)]
    last_activity_time: Option<DateTime<Utc>>,
}

impl From<ActiveSessionRecord> for ActiveSession {
    fn from(record: ActiveSessionRecord) -> Self {
        Self {
            client: record.client,
            start_time: record.start_time,
            last_activity_time: record.last_activity_time.unwrap_or(record.start_time),
        }
    }
}

impl ActiveSession {
    /// Opens a fresh session: start and last activity are both `now`.
    #[must_use]
    pub fn begin(client: Client, now: DateTime<Utc>) -> Self {
        Self {
            client,
            start_time: now,
            last_activity_time: now,
        }
    }

    /// Whole minutes since the last confirmed activity, clamped at zero.
    #[must_use]
    pub fn idle_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_activity_time).num_minutes().max(0)
    }

    /// Raw elapsed minutes since the session started.
    #[must_use]
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> u32 {
        raw_minutes_between(self.start_time, now)
    }
}

/// A session auto-paused after an idle gap, awaiting confirmation.
/// At most one exists, and never alongside an [`ActiveSession`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdlePause {
    /// Always true while the record exists; the record's presence is the
    /// pending sentinel. Serialized for slot-format compatibility.
    pub is_pending: bool,
    /// When the idle gap was detected.
    pub pause_time: DateTime<Utc>,
    pub client: Client,
    /// Start of the paused session.
    pub original_start_time: DateTime<Utc>,
    /// Last known activity before the gap.
    pub last_activity_time: DateTime<Utc>,
}

impl IdlePause {
    /// Captures a running session into a pending idle record.
    #[must_use]
    pub fn capture(active: &ActiveSession, now: DateTime<Utc>) -> Self {
        Self {
            is_pending: true,
            pause_time: now,
            client: active.client.clone(),
            original_start_time: active.start_time,
            last_activity_time: active.last_activity_time,
        }
    }
}

/// Business hours gate for automatic idle detection: Monday through
/// Friday, local 09:00-18:00.
#[must_use]
pub fn is_business_hours(now: DateTime<Local>) -> bool {
    let weekday = now.weekday().number_from_monday();
    weekday <= 5 && (9..18).contains(&now.hour())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn client() -> Client {
        Client::new("Acme").unwrap()
    }

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
    }

    #[test]
    fn begin_sets_activity_to_start() {
        let session = ActiveSession::begin(client(), utc(9, 0));
        assert_eq!(session.start_time, session.last_activity_time);
    }

    #[test]
    fn idle_minutes_floor_and_clamp() {
        let mut session = ActiveSession::begin(client(), utc(9, 0));
        session.last_activity_time = utc(9, 50);

        assert_eq!(session.idle_minutes(utc(11, 5)), 75);
        // Sub-minute gaps floor to zero
        assert_eq!(
            session.idle_minutes(Utc.with_ymd_and_hms(2025, 3, 10, 9, 50, 59).unwrap()),
            0
        );
        // A clock that moved backwards reads as not idle
        assert_eq!(session.idle_minutes(utc(9, 0)), 0);
    }

    #[test]
    fn capture_preserves_session_fields() {
        let mut session = ActiveSession::begin(client(), utc(9, 0));
        session.last_activity_time = utc(9, 50);

        let pause = IdlePause::capture(&session, utc(11, 5));
        assert!(pause.is_pending);
        assert_eq!(pause.pause_time, utc(11, 5));
        assert_eq!(pause.original_start_time, utc(9, 0));
        assert_eq!(pause.last_activity_time, utc(9, 50));
        assert_eq!(pause.client, session.client);
    }

    #[test]
    fn active_session_tolerates_missing_last_activity() {
        let json = r#"{"client":"Acme","startTime":"2025-03-10T09:00:00Z"}"#;
        let session: ActiveSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.last_activity_time, session.start_time);
    }

    #[test]
    fn active_session_slot_format_roundtrip() {
        let mut session = ActiveSession::begin(client(), utc(9, 0));
        session.last_activity_time = utc(9, 50);

        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"startTime\""));
        assert!(json.contains("\"lastActivityTime\""));
        let parsed: ActiveSession = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, session);
    }

    #[test]
    fn idle_pause_slot_format_roundtrip() {
        let session = ActiveSession::begin(client(), utc(9, 0));
        let pause = IdlePause::capture(&session, utc(11, 5));

        let json = serde_json::to_string(&pause).unwrap();
        assert!(json.contains("\"isPending\":true"));
        assert!(json.contains("\"originalStartTime\""));
        let parsed: IdlePause = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, pause);
    }

    #[test]
    fn business_hours_require_weekday_and_working_hour() {
        // 2025-06-03 is a Tuesday, 2025-06-07 a Saturday
        let tue_10 = Local.with_ymd_and_hms(2025, 6, 3, 10, 0, 0).unwrap();
        let tue_8 = Local.with_ymd_and_hms(2025, 6, 3, 8, 59, 0).unwrap();
        let tue_9 = Local.with_ymd_and_hms(2025, 6, 3, 9, 0, 0).unwrap();
        let tue_18 = Local.with_ymd_and_hms(2025, 6, 3, 18, 0, 0).unwrap();
        let sat_10 = Local.with_ymd_and_hms(2025, 6, 7, 10, 0, 0).unwrap();

        assert!(is_business_hours(tue_10));
        assert!(is_business_hours(tue_9));
        assert!(!is_business_hours(tue_8));
        assert!(!is_business_hours(tue_18));
        assert!(!is_business_hours(sat_10));
    }
}
