//! The CSV entry ledger.
//!
//! Canonical rows are quoted: `"client","start","end",minutes` with
//! RFC 3339 millisecond timestamps. The read path also accepts the older
//! unquoted encoding; rows that parse as neither are skipped, not fatal.
//! Nothing outside this module sees the raw text.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;

use tb_core::{Client, EntryStore, StoreError, TimeEntry};

/// Header row written to every ledger file.
const HEADER: &str = "client,startTime,endTime,durationMinutes";

/// Canonical quoted row.
static QUOTED_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"([^"]*)","([^"]*)","([^"]*)",(\d+)$"#).unwrap());

/// Legacy unquoted row, read-only.
static UNQUOTED_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^,]+),([^,]+),([^,]+),(\d+)$").unwrap());

/// File-backed [`EntryStore`].
#[derive(Debug, Clone)]
pub struct CsvLedger {
    path: PathBuf,
}

impl CsvLedger {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Creates the ledger file with its header row if it does not exist.
    pub fn ensure_exists(&self) -> Result<(), StoreError> {
        if !self.path.exists() {
            fs::write(&self.path, format!("{HEADER}\n"))?;
        }
        Ok(())
    }
}

impl EntryStore for CsvLedger {
    fn append(&self, entry: &TimeEntry) -> Result<(), StoreError> {
        self.ensure_exists()?;
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{}", encode_row(entry))?;
        Ok(())
    }

    fn load(&self) -> Result<Vec<TimeEntry>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        // First line is the header
        for line in content.lines().skip(1) {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            match decode_row(line) {
                Some(entry) => entries.push(entry),
                None => tracing::warn!(line, "skipping unparseable ledger row"),
            }
        }
        Ok(entries)
    }

    fn rewrite(&self, entries: &[TimeEntry]) -> Result<(), StoreError> {
        let mut content = String::from(HEADER);
        content.push('\n');
        for entry in entries {
            content.push_str(&encode_row(entry));
            content.push('\n');
        }

        // Write the whole file aside, then swap it in
        let tmp = self.path.with_extension("csv.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn encode_row(entry: &TimeEntry) -> String {
    format!(
        "\"{}\",\"{}\",\"{}\",{}",
        entry.client,
        format_timestamp(entry.start_time),
        format_timestamp(entry.end_time),
        entry.duration_minutes
    )
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn decode_row(line: &str) -> Option<TimeEntry> {
    let caps = QUOTED_ROW
        .captures(line)
        .or_else(|| UNQUOTED_ROW.captures(line))?;

    Some(TimeEntry {
        client: Client::new(&caps[1]).ok()?,
        start_time: parse_timestamp(&caps[2])?,
        end_time: parse_timestamp(&caps[3])?,
        duration_minutes: caps[4].parse().ok()?,
    })
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
