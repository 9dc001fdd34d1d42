//! Status command: current session, pending idle state, today's totals.

use std::io::Write;

use anyhow::Result;
use chrono::{Local, Utc};

use tb_core::{format_duration, summary_by_client};
use tb_store::DataDir;

use super::util;

pub fn run<W: Write>(writer: &mut W, dir: &DataDir) -> Result<()> {
    let tracker = dir.tracker();
    let now = Utc::now();

    if let Some(pending) = tracker.idle_state()? {
        writeln!(
            writer,
            "Idle confirmation pending for \"{}\" (paused {}).",
            pending.client,
            pending.pause_time.with_timezone(&Local).format("%H:%M")
        )?;
        writeln!(
            writer,
            "Run `tb idle resume` if you kept working, or `tb idle stop` to drop the gap."
        )?;
        writeln!(writer)?;
    }

    match tracker.active()? {
        Some(active) => {
            // Looking at the status counts as activity
            tracker.update_activity(now)?;
            writeln!(
                writer,
                "Tracking \"{}\" since {} ({} so far).",
                active.client,
                active.start_time.with_timezone(&Local).format("%H:%M"),
                format_duration(active.elapsed_minutes(now))
            )?;
        }
        None => writeln!(writer, "No active tracking.")?,
    }

    writeln!(writer)?;
    writeln!(writer, "Today:")?;
    let today = util::entries_or_empty(tracker.ledger().today());
    let mut summary = summary_by_client(&today);
    summary.sort_by(|a, b| b.1.cmp(&a.1));
    if summary.is_empty() {
        writeln!(writer, "  no entries")?;
    }
    for (client, minutes) in summary {
        writeln!(writer, "  {client}: {}", format_duration(minutes))?;
    }
    Ok(())
}
