//! Entry management: list, add, edit, delete.
//!
//! Entries are addressed by their composite key (client, start, end);
//! edits and deletes affect every entry carrying that exact key.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use tb_core::{Client, TimeEntry, format_duration};
use tb_store::DataDir;

use super::util;

pub fn list<W: Write>(writer: &mut W, dir: &DataDir, json: bool) -> Result<()> {
    let tracker = dir.tracker();
    let entries = util::entries_or_empty(tracker.ledger().all());

    if json {
        serde_json::to_writer_pretty(&mut *writer, &entries)?;
        writeln!(writer)?;
        return Ok(());
    }

    if entries.is_empty() {
        writeln!(writer, "No entries found.")?;
        return Ok(());
    }

    let today = Local::now().date_naive();
    for (date, mut day_entries) in group_by_day(entries) {
        day_entries.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        let total: u32 = day_entries.iter().map(|e| e.duration_minutes).sum();
        writeln!(
            writer,
            "{} - {}",
            util::day_label(date, today),
            format_duration(total)
        )?;
        for entry in day_entries {
            writeln!(
                writer,
                "  {}  {} - {}  {}",
                entry.client,
                entry.start_time.with_timezone(&Local).format("%H:%M"),
                entry.end_time.with_timezone(&Local).format("%H:%M"),
                format_duration(entry.duration_minutes)
            )?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

pub fn add<W: Write>(
    writer: &mut W,
    dir: &DataDir,
    client: &str,
    date: Option<NaiveDate>,
    start: &str,
    end: &str,
) -> Result<()> {
    let client = Client::new(client)?;
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let start_time = util::parse_hhmm(start)?;
    let end_time = util::parse_hhmm(end)?;

    let start_utc = util::local_to_utc(date, start_time)?;
    // An end at or before the start rolls past midnight
    let end_date = if end_time <= start_time {
        date.succ_opt().context("date out of range")?
    } else {
        date
    };
    let end_utc = util::local_to_utc(end_date, end_time)?;

    let entry = dir.tracker().ledger().add(client, start_utc, end_utc)?;
    writeln!(
        writer,
        "Added {} for \"{}\".",
        format_duration(entry.duration_minutes),
        entry.client
    )?;
    Ok(())
}

pub struct EditArgs<'a> {
    pub client: &'a str,
    pub start: &'a str,
    pub end: &'a str,
    pub set_client: Option<&'a str>,
    pub set_start: Option<&'a str>,
    pub set_end: Option<&'a str>,
}

pub fn edit<W: Write>(writer: &mut W, dir: &DataDir, args: &EditArgs<'_>) -> Result<()> {
    let target_client = Client::new(args.client)?;
    let start = util::parse_datetime(args.start)?;
    let end = util::parse_datetime(args.end)?;
    let target = TimeEntry::finalize(target_client.clone(), start, end);

    let new_client = match args.set_client {
        Some(name) => Client::new(name)?,
        None => target_client,
    };
    let new_start = args.set_start.map(util::parse_datetime).transpose()?.unwrap_or(start);
    let new_end = args.set_end.map(util::parse_datetime).transpose()?.unwrap_or(end);
    if new_end <= new_start {
        anyhow::bail!("end time must be after start time");
    }

    let replacement = TimeEntry::finalize(new_client, new_start, new_end);
    let replaced = dir.tracker().ledger().update(&target, &replacement)?;
    if replaced == 0 {
        writeln!(writer, "No entry matches that client and time range.")?;
    } else {
        writeln!(
            writer,
            "Updated {replaced} {} to \"{}\" - {}.",
            plural(replaced),
            replacement.client,
            format_duration(replacement.duration_minutes)
        )?;
    }
    Ok(())
}

pub fn delete<W: Write>(
    writer: &mut W,
    dir: &DataDir,
    client: &str,
    start: &str,
    end: &str,
) -> Result<()> {
    let client = Client::new(client)?;
    let start = util::parse_datetime(start)?;
    let end = util::parse_datetime(end)?;
    let target = TimeEntry::finalize(client, start, end);

    let removed = dir.tracker().ledger().delete(&target)?;
    if removed == 0 {
        writeln!(writer, "No entry matches that client and time range.")?;
    } else {
        writeln!(writer, "Deleted {removed} {}.", plural(removed))?;
    }
    Ok(())
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "entry" } else { "entries" }
}

/// Buckets entries by local calendar day, newest day first.
fn group_by_day(entries: Vec<TimeEntry>) -> Vec<(NaiveDate, Vec<TimeEntry>)> {
    let mut days: Vec<(NaiveDate, Vec<TimeEntry>)> = Vec::new();
    for entry in entries {
        let date = entry.start_time.with_timezone(&Local).date_naive();
        match days.iter_mut().find(|(d, _)| *d == date) {
            Some((_, bucket)) => bucket.push(entry),
            None => days.push((date, vec![entry])),
        }
    }
    days.sort_by(|a, b| b.0.cmp(&a.0));
    days
}
