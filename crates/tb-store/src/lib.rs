//! Durable storage for the timebill tracker.
//!
//! Everything lives in one data directory:
//!
//! - `time-entries.csv` — the entry ledger, append-and-rewrite
//! - `active-tracking.json` — the running session slot
//! - `idle-state.json` — the pending idle confirmation slot
//! - `.lock` — advisory lock taken around mutating commands
//!
//! The stores implement the `tb-core` traits, so the state machine is
//! identical over these and the in-memory test stores.
//!
//! # Concurrency
//!
//! The stores themselves assume a single actor. Since every CLI
//! invocation is a separate process, callers that mutate state should
//! hold [`DataDir::lock_exclusive`] for the duration of the operation.

mod csv;
mod slot;

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use tb_core::{ActiveSession, IdlePause, StoreError, Tracker};

pub use csv::CsvLedger;
pub use slot::JsonSlot;

const ENTRIES_FILE: &str = "time-entries.csv";
const ACTIVE_FILE: &str = "active-tracking.json";
const IDLE_FILE: &str = "idle-state.json";
const LOCK_FILE: &str = ".lock";

/// The tracker wired to the file-backed stores.
pub type FileTracker = Tracker<CsvLedger, JsonSlot<ActiveSession>, JsonSlot<IdlePause>>;

/// The tracker's data directory.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Opens (creating if necessary) the data directory and the ledger
    /// file within it.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let dir = Self { root };
        dir.ledger().ensure_exists()?;
        Ok(dir)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn ledger(&self) -> CsvLedger {
        CsvLedger::new(self.root.join(ENTRIES_FILE))
    }

    #[must_use]
    pub fn active_slot(&self) -> JsonSlot<ActiveSession> {
        JsonSlot::new(self.root.join(ACTIVE_FILE))
    }

    #[must_use]
    pub fn idle_slot(&self) -> JsonSlot<IdlePause> {
        JsonSlot::new(self.root.join(IDLE_FILE))
    }

    /// A tracker over this directory's stores.
    #[must_use]
    pub fn tracker(&self) -> FileTracker {
        Tracker::new(self.ledger(), self.active_slot(), self.idle_slot())
    }

    /// Takes the directory's advisory lock, blocking until it is free.
    /// The lock is released when the returned handle drops.
    pub fn lock_exclusive(&self) -> Result<File, StoreError> {
        let file = File::create(self.root.join(LOCK_FILE))?;
        file.lock_exclusive()?;
        Ok(file)
    }
}
