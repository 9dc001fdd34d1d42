//! Finalized time entries and the client identifier.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rounding::{raw_minutes_between, round_to_billing};

/// Validation errors for caller-supplied values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The client name contains a character the ledger encoding cannot
    /// represent.
    #[error("client name cannot contain '\"'")]
    UnencodableClient,
}

/// A validated client name.
///
/// Client names are free-form, case-preserving identifiers. They must be
/// non-empty after trimming and may not contain double quotes, which the
/// ledger's quoted encoding has no escape for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Client(String);

impl Client {
    /// Creates a client name after validation, trimming surrounding
    /// whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "client" });
        }
        if trimmed.contains('"') {
            return Err(ValidationError::UnencodableClient);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Client {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Client> for String {
    fn from(client: Client) -> Self {
        client.0
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Client {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A finalized, immutable ledger record.
///
/// `duration_minutes` is always the billed value after rounding, not the
/// raw elapsed time. Entries carry no surrogate id: the composite key
/// (client, `start_time`, `end_time`) identifies them for update/delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub client: Client,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: u32,
}

impl TimeEntry {
    /// Finalizes an interval into an entry, applying the billing policy.
    #[must_use]
    pub fn finalize(client: Client, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        let raw = raw_minutes_between(start_time, end_time);
        Self {
            client,
            start_time,
            end_time,
            duration_minutes: round_to_billing(raw),
        }
    }

    /// Whether this entry and `other` share the composite key used for
    /// update and delete.
    #[must_use]
    pub fn same_key(&self, other: &Self) -> bool {
        self.client == other.client
            && self.start_time == other.start_time
            && self.end_time == other.end_time
    }
}

/// Reduces entries to per-client billed minutes, in first-occurrence
/// order.
#[must_use]
pub fn summary_by_client(entries: &[TimeEntry]) -> Vec<(String, u32)> {
    let mut summary: Vec<(String, u32)> = Vec::new();

    for entry in entries {
        match summary.iter_mut().find(|(c, _)| c == entry.client.as_str()) {
            Some((_, minutes)) => *minutes += entry.duration_minutes,
            None => summary.push((entry.client.to_string(), entry.duration_minutes)),
        }
    }

    summary
}
