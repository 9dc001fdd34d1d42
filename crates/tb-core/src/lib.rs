//! Core domain logic for the timebill tracker.
//!
//! This crate contains:
//! - the billing rounding policy, the single source of truth for billed
//!   durations
//! - the entry ledger operations (filters, update/delete by composite
//!   key, per-client summaries)
//! - the tracking state machine (start/stop/switch and the idle
//!   pause/resume/discard transitions)
//!
//! Everything is defined over the storage traits in [`store`], so the
//! durable stores in `tb-store` and the in-memory stores in [`memory`]
//! are interchangeable.

pub mod entry;
pub mod ledger;
pub mod memory;
pub mod rounding;
pub mod session;
pub mod store;
pub mod tracker;

pub use entry::{Client, TimeEntry, ValidationError, summary_by_client};
pub use ledger::Ledger;
pub use rounding::{format_duration, raw_minutes_between, round_to_billing};
pub use session::{ActiveSession, IdlePause, is_business_hours};
pub use store::{EntryStore, StateSlot, StoreError};
pub use tracker::{StartOutcome, Tracker, TrackerError};
