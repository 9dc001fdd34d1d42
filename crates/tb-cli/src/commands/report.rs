//! Report command: per-day breakdown of recorded time.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Local, Months, NaiveDate, Utc};
use serde::Serialize;

use tb_core::{TimeEntry, format_duration, summary_by_client};
use tb_store::DataDir;

use crate::cli::ReportRange;

use super::util;

/// One reported day: per-client minutes plus the day total.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DayBreakdown {
    date: NaiveDate,
    total_minutes: u32,
    clients: Vec<ClientMinutes>,
}

#[derive(Debug, Serialize)]
struct ClientMinutes {
    client: String,
    minutes: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportJson {
    generated_at: DateTime<Utc>,
    range: String,
    total_minutes: u32,
    days: Vec<DayBreakdown>,
}

pub fn run<W: Write>(writer: &mut W, dir: &DataDir, range: ReportRange, json: bool) -> Result<()> {
    let tracker = dir.tracker();
    let ledger = tracker.ledger();
    let now = Utc::now();

    let entries = match range {
        ReportRange::Today => ledger.today(),
        ReportRange::Week => ledger.by_date_range(now - Duration::days(7), now),
        ReportRange::Month => {
            let month_ago = now
                .checked_sub_months(Months::new(1))
                .context("date out of range")?;
            ledger.by_date_range(month_ago, now)
        }
        ReportRange::All => ledger.all(),
    };
    let entries = util::entries_or_empty(entries);
    let days = group_by_day(&entries);
    let total_minutes = days.iter().map(|d| d.total_minutes).sum();

    if json {
        let report = ReportJson {
            generated_at: now,
            range: range_label(range).to_string(),
            total_minutes,
            days,
        };
        serde_json::to_writer_pretty(&mut *writer, &report)?;
        writeln!(writer)?;
        return Ok(());
    }

    writeln!(writer, "Report - {}", range_label(range))?;
    writeln!(writer)?;

    if days.is_empty() {
        writeln!(writer, "No entries found for this period.")?;
        return Ok(());
    }

    let today = Local::now().date_naive();
    for day in &days {
        writeln!(
            writer,
            "{} - {}",
            util::day_label(day.date, today),
            format_duration(day.total_minutes)
        )?;
        for entry in &day.clients {
            let pct = percentage(entry.minutes, day.total_minutes);
            writeln!(
                writer,
                "  {}  {}  {pct:.1}%",
                entry.client,
                format_duration(entry.minutes)
            )?;
        }
        writeln!(writer)?;
    }

    writeln!(writer, "Total: {}", format_duration(total_minutes))?;
    Ok(())
}

fn range_label(range: ReportRange) -> &'static str {
    match range {
        ReportRange::Today => "Today",
        ReportRange::Week => "Last 7 Days",
        ReportRange::Month => "Last 30 Days",
        ReportRange::All => "All Time",
    }
}

fn percentage(minutes: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(minutes) / f64::from(total) * 100.0
    }
}

/// Buckets entries by local day, newest first; clients within a day are
/// sorted by descending minutes.
fn group_by_day(entries: &[TimeEntry]) -> Vec<DayBreakdown> {
    let mut buckets: Vec<(NaiveDate, Vec<TimeEntry>)> = Vec::new();
    for entry in entries {
        let date = entry.start_time.with_timezone(&Local).date_naive();
        match buckets.iter_mut().find(|(d, _)| *d == date) {
            Some((_, bucket)) => bucket.push(entry.clone()),
            None => buckets.push((date, vec![entry.clone()])),
        }
    }
    buckets.sort_by(|a, b| b.0.cmp(&a.0));

    buckets
        .into_iter()
        .map(|(date, day_entries)| {
            let mut clients: Vec<ClientMinutes> = summary_by_client(&day_entries)
                .into_iter()
                .map(|(client, minutes)| ClientMinutes { client, minutes })
                .collect();
            clients.sort_by(|a, b| b.minutes.cmp(&a.minutes));
            let total_minutes = clients.iter().map(|c| c.minutes).sum();
            DayBreakdown {
                date,
                total_minutes,
                clients,
            }
        })
        .collect()
}
