//! In-memory stores.
//!
//! Useful for testing: the state machine and ledger run against these
//! without touching the filesystem. State is lost when the store drops.

use std::cell::RefCell;

use crate::entry::TimeEntry;
use crate::store::{EntryStore, StateSlot, StoreError};

/// An in-memory [`EntryStore`].
#[derive(Debug, Default)]
pub struct MemoryEntryStore {
    entries: RefCell<Vec<TimeEntry>>,
}

impl MemoryEntryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntryStore for MemoryEntryStore {
    fn append(&self, entry: &TimeEntry) -> Result<(), StoreError> {
        self.entries.borrow_mut().push(entry.clone());
        Ok(())
    }

    fn load(&self) -> Result<Vec<TimeEntry>, StoreError> {
        Ok(self.entries.borrow().clone())
    }

    fn rewrite(&self, entries: &[TimeEntry]) -> Result<(), StoreError> {
        *self.entries.borrow_mut() = entries.to_vec();
        Ok(())
    }
}

/// An in-memory [`StateSlot`].
#[derive(Debug)]
pub struct MemorySlot<T> {
    value: RefCell<Option<T>>,
}

impl<T> Default for MemorySlot<T> {
    fn default() -> Self {
        Self {
            value: RefCell::new(None),
        }
    }
}

impl<T> MemorySlot<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Clone> StateSlot<T> for MemorySlot<T> {
    fn get(&self) -> Result<Option<T>, StoreError> {
        Ok(self.value.borrow().clone())
    }

    fn set(&self, value: &T) -> Result<(), StoreError> {
        *self.value.borrow_mut() = Some(value.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.value.borrow_mut() = None;
        Ok(())
    }
}
