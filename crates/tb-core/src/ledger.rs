//! Ledger operations over an [`EntryStore`].
//!
//! The ledger is the ordered collection of finalized entries plus its
//! derived views. Filtering and match-by-key semantics live here; the
//! bytes-on-disk concern stays in the store implementation.

use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::entry::{Client, TimeEntry};
use crate::store::{EntryStore, StoreError};

/// The entry ledger: append-and-rewrite, identified by composite key.
#[derive(Debug)]
pub struct Ledger<S> {
    store: S,
}

impl<S: EntryStore> Ledger<S> {
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Appends an already-finalized entry.
    pub fn append(&self, entry: &TimeEntry) -> Result<(), StoreError> {
        self.store.append(entry)
    }

    /// Finalizes a manual interval (rounding its duration) and appends
    /// it.
    pub fn add(
        &self,
        client: Client,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<TimeEntry, StoreError> {
        let entry = TimeEntry::finalize(client, start_time, end_time);
        self.store.append(&entry)?;
        Ok(entry)
    }

    /// Every entry in storage order.
    pub fn all(&self) -> Result<Vec<TimeEntry>, StoreError> {
        self.store.load()
    }

    /// Entries whose start time falls on the given local calendar day.
    pub fn on_day(&self, date: NaiveDate) -> Result<Vec<TimeEntry>, StoreError> {
        let mut entries = self.store.load()?;
        entries.retain(|e| e.start_time.with_timezone(&Local).date_naive() == date);
        Ok(entries)
    }

    /// Entries whose start time falls on the current local day.
    pub fn today(&self) -> Result<Vec<TimeEntry>, StoreError> {
        self.on_day(Local::now().date_naive())
    }

    /// Entries whose start time falls within `[start, end]`, inclusive,
    /// compared at full timestamp precision.
    pub fn by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeEntry>, StoreError> {
        let mut entries = self.store.load()?;
        entries.retain(|e| e.start_time >= start && e.start_time <= end);
        Ok(entries)
    }

    /// Replaces every entry matching `target`'s composite key with
    /// `replacement`, rewriting the ledger. Returns how many entries were
    /// replaced; duplicates of the key are all affected.
    pub fn update(&self, target: &TimeEntry, replacement: &TimeEntry) -> Result<usize, StoreError> {
        let mut entries = self.store.load()?;
        let mut replaced = 0;
        for entry in &mut entries {
            if entry.same_key(target) {
                *entry = replacement.clone();
                replaced += 1;
            }
        }
        if replaced > 0 {
            self.store.rewrite(&entries)?;
            tracing::info!(client = %target.client, replaced, "ledger entries updated");
        }
        Ok(replaced)
    }

    /// Removes every entry matching `target`'s composite key, rewriting
    /// the ledger. Returns how many entries were removed.
    pub fn delete(&self, target: &TimeEntry) -> Result<usize, StoreError> {
        let mut entries = self.store.load()?;
        let before = entries.len();
        entries.retain(|e| !e.same_key(target));
        let removed = before - entries.len();
        if removed > 0 {
            self.store.rewrite(&entries)?;
            tracing::info!(client = %target.client, removed, "ledger entries deleted");
        }
        Ok(removed)
    }
}
