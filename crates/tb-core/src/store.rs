//! Storage seams for the ledger and the session slots.
//!
//! The state machine never opens files itself; it is handed an
//! [`EntryStore`] and two [`StateSlot`]s. `tb-store` provides the durable
//! implementations, [`crate::memory`] the in-memory test doubles.

use thiserror::Error;

use crate::entry::TimeEntry;

/// Errors surfaced by durable stores.
///
/// Absent state is not an error: reads return `Ok(None)` or an empty
/// list, and corrupt records are recovered locally by the store. Write
/// failures always propagate.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying storage could not be read or written.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded for storage.
    #[error("failed to encode record: {0}")]
    Encode(String),
}

/// Durable, append-and-rewrite collection of finalized time entries.
pub trait EntryStore {
    /// Appends one finalized entry; the side effect is durable.
    fn append(&self, entry: &TimeEntry) -> Result<(), StoreError>;

    /// Returns every stored entry in append order. Missing storage reads
    /// as empty, and unparseable records are skipped rather than fatal.
    fn load(&self) -> Result<Vec<TimeEntry>, StoreError>;

    /// Replaces the entire collection.
    fn rewrite(&self, entries: &[TimeEntry]) -> Result<(), StoreError>;
}

/// Durable single-slot record.
pub trait StateSlot<T> {
    /// Reads the slot. Corrupt or missing records read as absent.
    fn get(&self) -> Result<Option<T>, StoreError>;

    /// Durably overwrites the slot, all-or-nothing.
    fn set(&self, value: &T) -> Result<(), StoreError>;

    /// Deletes the slot if present. Clearing an absent slot is not an
    /// error.
    fn clear(&self) -> Result<(), StoreError>;
}
