//! The tracking state machine.
//!
//! Orchestrates the entry ledger and the two session slots through three
//! states: stopped (neither slot populated), active, and idle-pending.
//! Active and idle-pending are mutually exclusive; every transition here
//! preserves that invariant.
//!
//! All operations take `now` explicitly so callers own the clock.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::entry::{Client, TimeEntry};
use crate::ledger::Ledger;
use crate::session::{ActiveSession, IdlePause};
use crate::store::{EntryStore, StateSlot, StoreError};

/// Errors from state-machine operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A transition that would create a session was attempted while an
    /// idle confirmation is pending.
    #[error("an idle confirmation is pending for \"{client}\"; resolve it first")]
    IdlePending { client: String },
}

/// Result of a start operation, distinguishing "started" from
/// "switched".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOutcome {
    /// The entry finalized for the previous session, if one was running.
    pub previous: Option<TimeEntry>,
    pub client: Client,
    pub start_time: DateTime<Utc>,
}

/// The tracking state machine over injected stores.
#[derive(Debug)]
pub struct Tracker<S, A, I> {
    ledger: Ledger<S>,
    active: A,
    idle: I,
}

impl<S, A, I> Tracker<S, A, I>
where
    S: EntryStore,
    A: StateSlot<ActiveSession>,
    I: StateSlot<IdlePause>,
{
    #[must_use]
    pub const fn new(store: S, active: A, idle: I) -> Self {
        Self {
            ledger: Ledger::new(store),
            active,
            idle,
        }
    }

    /// The entry ledger this tracker finalizes into.
    pub const fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }

    /// The currently running session, if any.
    pub fn active(&self) -> Result<Option<ActiveSession>, StoreError> {
        self.active.get()
    }

    /// The pending idle confirmation, if any.
    pub fn idle_state(&self) -> Result<Option<IdlePause>, StoreError> {
        self.idle.get()
    }

    /// Starts tracking `client`, finalizing any running session at `now`
    /// first. Refused while an idle confirmation is pending.
    pub fn start(&self, client: Client, now: DateTime<Utc>) -> Result<StartOutcome, TrackerError> {
        if let Some(pending) = self.idle.get()? {
            return Err(TrackerError::IdlePending {
                client: pending.client.to_string(),
            });
        }

        let previous = self.stop(now)?;
        self.active.set(&ActiveSession::begin(client.clone(), now))?;
        tracing::info!(client = %client, switched = previous.is_some(), "tracking started");

        Ok(StartOutcome {
            previous,
            client,
            start_time: now,
        })
    }

    /// Finalizes the running session at `end_time`: rounds the elapsed
    /// interval, appends the ledger entry, clears the active slot.
    ///
    /// Returns `Ok(None)` when nothing is running. An `end_time` earlier
    /// than the session start is caller-validated; the state machine does
    /// not clamp it.
    pub fn stop(&self, end_time: DateTime<Utc>) -> Result<Option<TimeEntry>, TrackerError> {
        let Some(active) = self.active.get()? else {
            return Ok(None);
        };

        let entry = self.finalize_interval(&active.client, active.start_time, end_time)?;
        self.active.clear()?;
        tracing::info!(client = %entry.client, minutes = entry.duration_minutes, "tracking stopped");
        Ok(Some(entry))
    }

    /// Convenience for the long-session "cap at one hour" resolution:
    /// stop with an end time exactly one hour after the session start.
    pub fn stop_capped_at_hour(&self) -> Result<Option<TimeEntry>, TrackerError> {
        let Some(active) = self.active.get()? else {
            return Ok(None);
        };
        self.stop(active.start_time + Duration::hours(1))
    }

    /// Clears the running session without producing a ledger entry.
    /// Returns the abandoned session, if one existed.
    pub fn discard_active(&self) -> Result<Option<ActiveSession>, StoreError> {
        let active = self.active.get()?;
        if active.is_some() {
            self.active.clear()?;
            tracing::info!("active session discarded");
        }
        Ok(active)
    }

    /// Records an activity ping. Returns whether a session was bumped.
    pub fn update_activity(&self, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let Some(mut active) = self.active.get()? else {
            return Ok(false);
        };
        active.last_activity_time = now;
        self.active.set(&active)?;
        Ok(true)
    }

    /// Minutes since the last confirmed activity; zero when nothing is
    /// running.
    pub fn idle_minutes(&self, now: DateTime<Utc>) -> Result<i64, StoreError> {
        Ok(self
            .active
            .get()?
            .map_or(0, |active| active.idle_minutes(now)))
    }

    /// Moves the running session into the idle-pending slot.
    ///
    /// Returns `Ok(None)` when nothing is running, and an error when an
    /// idle confirmation is already pending (the two slots must never
    /// coexist).
    pub fn pause_for_idle(&self, now: DateTime<Utc>) -> Result<Option<IdlePause>, TrackerError> {
        if let Some(pending) = self.idle.get()? {
            return Err(TrackerError::IdlePending {
                client: pending.client.to_string(),
            });
        }
        let Some(active) = self.active.get()? else {
            return Ok(None);
        };

        let pause = IdlePause::capture(&active, now);
        self.idle.set(&pause)?;
        self.active.clear()?;
        tracing::info!(client = %pause.client, "session paused for idle confirmation");
        Ok(Some(pause))
    }

    /// The user confirms they worked through the idle gap.
    ///
    /// Finalizes two entries — the confirmed-active portion up to the
    /// pause, then the gap itself — each rounded independently, and opens
    /// a fresh session at `now` for the same client. Returns both
    /// entries in append order.
    pub fn resume_from_idle(
        &self,
        idle: &IdlePause,
        now: DateTime<Utc>,
    ) -> Result<(TimeEntry, TimeEntry), TrackerError> {
        let before_pause =
            self.finalize_interval(&idle.client, idle.original_start_time, idle.pause_time)?;
        let gap = self.finalize_interval(&idle.client, idle.pause_time, now)?;

        self.active
            .set(&ActiveSession::begin(idle.client.clone(), now))?;
        self.idle.clear()?;
        tracing::info!(client = %idle.client, "resumed from idle, gap counted");
        Ok((before_pause, gap))
    }

    /// The user declines the idle gap.
    ///
    /// Only the confirmed-active portion up to the pause is finalized;
    /// the gap is never logged. No new session is opened.
    pub fn stop_from_idle(&self, idle: &IdlePause) -> Result<TimeEntry, TrackerError> {
        let entry =
            self.finalize_interval(&idle.client, idle.original_start_time, idle.pause_time)?;
        self.idle.clear()?;
        tracing::info!(client = %idle.client, "stopped from idle, gap discarded");
        Ok(entry)
    }

    /// The single finalization point: rounds an interval and appends it.
    fn finalize_interval(
        &self,
        client: &Client,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TimeEntry, StoreError> {
        let entry = TimeEntry::finalize(client.clone(), start, end);
        self.ledger.append(&entry)?;
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::memory::{MemoryEntryStore, MemorySlot};

    use super::*;

    type MemTracker = Tracker<MemoryEntryStore, MemorySlot<ActiveSession>, MemorySlot<IdlePause>>;

    fn tracker() -> MemTracker {
        Tracker::new(MemoryEntryStore::new(), MemorySlot::new(), MemorySlot::new())
    }

    fn client(name: &str) -> Client {
        Client::new(name).unwrap()
    }

    fn ts(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 11, h, m, 0).unwrap()
    }

    fn assert_exclusive(t: &MemTracker) {
        let both = t.active().unwrap().is_some() && t.idle_state().unwrap().is_some();
        assert!(!both, "active and idle-pending must never coexist");
    }

    #[test]
    fn start_opens_fresh_session() {
        let t = tracker();
        let outcome = t.start(client("Acme"), ts(9, 0)).unwrap();

        assert!(outcome.previous.is_none());
        let active = t.active().unwrap().unwrap();
        assert_eq!(active.start_time, ts(9, 0));
        assert_eq!(active.last_activity_time, ts(9, 0));
        assert!(t.ledger().all().unwrap().is_empty());
    }

    #[test]
    fn start_while_active_finalizes_exactly_one_entry() {
        let t = tracker();
        t.start(client("Acme"), ts(9, 0)).unwrap();
        let outcome = t.start(client("Initech"), ts(9, 42)).unwrap();

        let previous = outcome.previous.unwrap();
        assert_eq!(previous.client.as_str(), "Acme");
        assert_eq!(previous.end_time, ts(9, 42));
        assert_eq!(previous.duration_minutes, 45);

        let all = t.ledger().all().unwrap();
        assert_eq!(all.len(), 1);

        let active = t.active().unwrap().unwrap();
        assert_eq!(active.client.as_str(), "Initech");
        assert_eq!(active.start_time, ts(9, 42));
        assert_eq!(active.last_activity_time, ts(9, 42));
        assert_exclusive(&t);
    }

    #[test]
    fn stop_without_session_is_a_quiet_no_op() {
        let t = tracker();
        assert!(t.stop(ts(10, 0)).unwrap().is_none());
        assert!(t.ledger().all().unwrap().is_empty());
    }

    #[test]
    fn stop_finalizes_and_clears() {
        let t = tracker();
        t.start(client("Acme"), ts(9, 0)).unwrap();
        let entry = t.stop(ts(9, 42)).unwrap().unwrap();

        assert_eq!(entry.duration_minutes, 45);
        assert!(t.active().unwrap().is_none());
        assert_eq!(t.ledger().all().unwrap(), vec![entry]);
    }

    #[test]
    fn stop_capped_at_hour_uses_start_plus_one_hour() {
        let t = tracker();
        t.start(client("Acme"), ts(14, 0)).unwrap();
        // Stopping at 16:30 via the cap records exactly one hour
        let entry = t.stop_capped_at_hour().unwrap().unwrap();

        assert_eq!(entry.end_time, ts(15, 0));
        assert_eq!(entry.duration_minutes, 60);
    }

    #[test]
    fn discard_drops_the_session_without_an_entry() {
        let t = tracker();
        t.start(client("Acme"), ts(9, 0)).unwrap();

        let discarded = t.discard_active().unwrap().unwrap();
        assert_eq!(discarded.client.as_str(), "Acme");
        assert!(t.active().unwrap().is_none());
        assert!(t.ledger().all().unwrap().is_empty());

        assert!(t.discard_active().unwrap().is_none());
    }

    #[test]
    fn activity_ping_bumps_only_a_running_session() {
        let t = tracker();
        assert!(!t.update_activity(ts(9, 30)).unwrap());

        t.start(client("Acme"), ts(9, 0)).unwrap();
        assert!(t.update_activity(ts(9, 30)).unwrap());

        let active = t.active().unwrap().unwrap();
        assert_eq!(active.last_activity_time, ts(9, 30));
        assert_eq!(active.start_time, ts(9, 0));
    }

    #[test]
    fn idle_minutes_without_session_is_zero() {
        let t = tracker();
        assert_eq!(t.idle_minutes(ts(12, 0)).unwrap(), 0);
    }

    #[test]
    fn pause_for_idle_moves_the_session() {
        let t = tracker();
        t.start(client("Acme"), ts(9, 0)).unwrap();
        t.update_activity(ts(9, 50)).unwrap();

        assert_eq!(t.idle_minutes(ts(11, 5)).unwrap(), 75);
        let pause = t.pause_for_idle(ts(11, 5)).unwrap().unwrap();

        assert_eq!(pause.original_start_time, ts(9, 0));
        assert_eq!(pause.pause_time, ts(11, 5));
        assert_eq!(pause.last_activity_time, ts(9, 50));
        assert!(t.active().unwrap().is_none());
        assert!(t.ledger().all().unwrap().is_empty());
        assert_exclusive(&t);
    }

    #[test]
    fn pause_without_session_is_a_no_op() {
        let t = tracker();
        assert!(t.pause_for_idle(ts(11, 5)).unwrap().is_none());
        assert!(t.idle_state().unwrap().is_none());
    }

    #[test]
    fn start_and_pause_are_refused_while_idle_pending() {
        let t = tracker();
        t.start(client("Acme"), ts(9, 0)).unwrap();
        t.pause_for_idle(ts(11, 5)).unwrap();

        assert!(matches!(
            t.start(client("Initech"), ts(11, 6)),
            Err(TrackerError::IdlePending { .. })
        ));
        assert!(matches!(
            t.pause_for_idle(ts(11, 6)),
            Err(TrackerError::IdlePending { .. })
        ));
        assert_exclusive(&t);
    }

    #[test]
    fn resume_splits_into_two_contiguous_entries() {
        let t = tracker();
        t.start(client("Acme"), ts(9, 0)).unwrap();
        t.update_activity(ts(9, 50)).unwrap();
        let pause = t.pause_for_idle(ts(11, 5)).unwrap().unwrap();

        let (before, gap) = t.resume_from_idle(&pause, ts(11, 10)).unwrap();

        // [09:00, 11:05] is 125 raw minutes, billed 135
        assert_eq!(before.start_time, ts(9, 0));
        assert_eq!(before.end_time, ts(11, 5));
        assert_eq!(before.duration_minutes, 135);

        // [11:05, 11:10] is 5 raw minutes, billed as-is
        assert_eq!(gap.start_time, ts(11, 5));
        assert_eq!(gap.end_time, ts(11, 10));
        assert_eq!(gap.duration_minutes, 5);

        // Contiguous, no gap or overlap, appended in order
        assert_eq!(before.end_time, gap.start_time);
        assert_eq!(t.ledger().all().unwrap(), vec![before, gap]);

        let active = t.active().unwrap().unwrap();
        assert_eq!(active.client.as_str(), "Acme");
        assert_eq!(active.start_time, ts(11, 10));
        assert_eq!(active.last_activity_time, ts(11, 10));
        assert!(t.idle_state().unwrap().is_none());
        assert_exclusive(&t);
    }

    #[test]
    fn stop_from_idle_discards_the_gap() {
        let t = tracker();
        t.start(client("Acme"), ts(9, 0)).unwrap();
        let pause = t.pause_for_idle(ts(11, 5)).unwrap().unwrap();

        let entry = t.stop_from_idle(&pause).unwrap();

        assert_eq!(entry.start_time, ts(9, 0));
        assert_eq!(entry.end_time, ts(11, 5));
        assert_eq!(entry.duration_minutes, 135);

        // The gap interval never reaches the ledger
        let all = t.ledger().all().unwrap();
        assert_eq!(all.len(), 1);
        assert!(all.iter().all(|e| e.start_time != ts(11, 5)));

        assert!(t.active().unwrap().is_none());
        assert!(t.idle_state().unwrap().is_none());
    }

    #[test]
    fn slots_stay_exclusive_across_a_full_day() {
        let t = tracker();
        t.start(client("Acme"), ts(9, 0)).unwrap();
        assert_exclusive(&t);
        t.start(client("Initech"), ts(10, 0)).unwrap();
        assert_exclusive(&t);
        let pause = t.pause_for_idle(ts(12, 0)).unwrap().unwrap();
        assert_exclusive(&t);
        t.resume_from_idle(&pause, ts(12, 30)).unwrap();
        assert_exclusive(&t);
        let pause = t.pause_for_idle(ts(14, 0)).unwrap().unwrap();
        t.stop_from_idle(&pause).unwrap();
        assert_exclusive(&t);
        assert!(t.stop(ts(15, 0)).unwrap().is_none());
        assert_exclusive(&t);
    }
}
