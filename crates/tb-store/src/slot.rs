//! JSON single-slot files.
//!
//! Each slot holds at most one record. A corrupt record reads as absent
//! so a damaged file behaves like no session; writes go through a temp
//! file and a rename so the slot is never left partially written.

use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;

use tb_core::{StateSlot, StoreError};

/// File-backed [`StateSlot`].
#[derive(Debug, Clone)]
pub struct JsonSlot<T> {
    path: PathBuf,
    _record: PhantomData<T>,
}

impl<T> JsonSlot<T> {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self {
            path,
            _record: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> StateSlot<T> for JsonSlot<T> {
    fn get(&self) -> Result<Option<T>, StoreError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&data) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "corrupt slot, treating as absent");
                Ok(None)
            }
        }
    }

    fn set(&self, value: &T) -> Result<(), StoreError> {
        let json =
            serde_json::to_string_pretty(value).map_err(|e| StoreError::Encode(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
