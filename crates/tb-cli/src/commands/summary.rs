//! Summary command: per-client distribution and weekly breakdown.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, Local, Months, NaiveDate, Utc};

use tb_core::{TimeEntry, format_duration, summary_by_client};
use tb_store::DataDir;

use crate::cli::SummaryRange;

use super::util;

/// Width of the distribution bars.
const BAR_WIDTH: usize = 20;

pub fn run<W: Write>(writer: &mut W, dir: &DataDir, range: SummaryRange) -> Result<()> {
    let tracker = dir.tracker();
    let ledger = tracker.ledger();
    let now = Utc::now();

    let entries = match range {
        SummaryRange::Week => ledger.by_date_range(now - Duration::days(7), now),
        SummaryRange::Month => {
            let since = now
                .checked_sub_months(Months::new(1))
                .context("date out of range")?;
            ledger.by_date_range(since, now)
        }
        SummaryRange::Quarter => {
            let since = now
                .checked_sub_months(Months::new(3))
                .context("date out of range")?;
            ledger.by_date_range(since, now)
        }
        SummaryRange::All => ledger.all(),
    };
    let entries = util::entries_or_empty(entries);

    writeln!(writer, "Time Summary - {}", range_label(range))?;
    if entries.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "No time entries found for this period.")?;
        return Ok(());
    }

    let mut clients = summary_by_client(&entries);
    clients.sort_by(|a, b| b.1.cmp(&a.1));
    let total: u32 = clients.iter().map(|(_, m)| m).sum();

    writeln!(
        writer,
        "Total: {} ({:.1} hours across {} client{})",
        format_duration(total),
        f64::from(total) / 60.0,
        clients.len(),
        if clients.len() == 1 { "" } else { "s" }
    )?;
    writeln!(writer)?;

    writeln!(writer, "Distribution:")?;
    let name_width = clients.iter().map(|(c, _)| c.len()).max().unwrap_or(0);
    for (client, minutes) in &clients {
        let pct = percentage(*minutes, total);
        writeln!(
            writer,
            "  {client:<name_width$}  {}  {pct:>5.1}%  {}",
            render_bar(pct),
            format_duration(*minutes)
        )?;
    }
    writeln!(writer)?;

    writeln!(writer, "Weekly breakdown:")?;
    for (monday, week_entries) in group_by_week(&entries) {
        let mut week_clients = summary_by_client(&week_entries);
        week_clients.sort_by(|a, b| b.1.cmp(&a.1));
        let week_total: u32 = week_clients.iter().map(|(_, m)| m).sum();
        writeln!(
            writer,
            "  {} - {}",
            week_label(monday),
            format_duration(week_total)
        )?;
        for (client, minutes) in week_clients {
            let pct = percentage(minutes, week_total);
            writeln!(
                writer,
                "    {client}  {}  {pct:.1}%",
                format_duration(minutes)
            )?;
        }
    }
    Ok(())
}

fn range_label(range: SummaryRange) -> &'static str {
    match range {
        SummaryRange::Week => "Last 7 Days",
        SummaryRange::Month => "Last 30 Days",
        SummaryRange::Quarter => "Last 3 Months",
        SummaryRange::All => "All Time",
    }
}

fn percentage(minutes: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(minutes) / f64::from(total) * 100.0
    }
}

/// A 20-character block bar for the given percentage.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn render_bar(percentage: f64) -> String {
    let filled = ((percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Monday of the week the entry's local start date falls in.
fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Label for a week: its Monday through Friday.
fn week_label(monday: NaiveDate) -> String {
    let friday = monday + Duration::days(4);
    format!(
        "Week of {} to {}",
        monday.format("%b %-d"),
        friday.format("%b %-d")
    )
}

/// Buckets entries by the Monday of their week, newest week first.
fn group_by_week(entries: &[TimeEntry]) -> Vec<(NaiveDate, Vec<TimeEntry>)> {
    let mut weeks: Vec<(NaiveDate, Vec<TimeEntry>)> = Vec::new();
    for entry in entries {
        let monday = monday_of(entry.start_time.with_timezone(&Local).date_naive());
        match weeks.iter_mut().find(|(m, _)| *m == monday) {
            Some((_, bucket)) => bucket.push(entry.clone()),
            None => weeks.push((monday, vec![entry.clone()])),
        }
    }
    weeks.sort_by(|a, b| b.0.cmp(&a.0));
    weeks
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use tb_core::Client;

    use super::*;

    fn seed(dir: &DataDir, client: &str, date: NaiveDate, start_h: u32, end_h: u32) {
        let start =
            util::local_to_utc(date, NaiveTime::from_hms_opt(start_h, 0, 0).unwrap()).unwrap();
        let end = util::local_to_utc(date, NaiveTime::from_hms_opt(end_h, 0, 0).unwrap()).unwrap();
        dir.tracker()
            .ledger()
            .add(Client::new(client).unwrap(), start, end)
            .unwrap();
    }

    #[test]
    fn monday_bucketing_spans_the_work_week() {
        // 2025-06-02 is a Monday
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        for offset in 0..7 {
            assert_eq!(monday_of(monday + Duration::days(offset)), monday);
        }
        assert_eq!(week_label(monday), "Week of Jun 2 to Jun 6");
    }

    #[test]
    fn bars_scale_with_share() {
        assert_eq!(render_bar(100.0), "█".repeat(20));
        assert_eq!(render_bar(0.0), "░".repeat(20));
        assert_eq!(render_bar(50.0), format!("{}{}", "█".repeat(10), "░".repeat(10)));
    }

    #[test]
    fn summary_totals_and_sorts_clients() {
        let temp = tempfile::tempdir().unwrap();
        let dir = DataDir::open(temp.path()).unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        seed(&dir, "Acme", day, 9, 11);
        seed(&dir, "Initech", day, 12, 13);

        let mut out = Vec::new();
        run(&mut out, &dir, SummaryRange::All).unwrap();
        let output = String::from_utf8(out).unwrap();

        assert!(output.contains("Total: 3h 0m (3.0 hours across 2 clients)"), "got: {output}");
        // Acme (2h) lists before Initech (1h)
        assert!(output.find("Acme").unwrap() < output.find("Initech").unwrap());
        assert!(output.contains("Week of Mar 10 to Mar 14"), "got: {output}");
    }

    #[test]
    fn summary_of_nothing_says_so() {
        let temp = tempfile::tempdir().unwrap();
        let dir = DataDir::open(temp.path()).unwrap();

        let mut out = Vec::new();
        run(&mut out, &dir, SummaryRange::Month).unwrap();
        assert!(
            String::from_utf8(out)
                .unwrap()
                .contains("No time entries found")
        );
    }
}
