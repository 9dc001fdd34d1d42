//! Idle detection and confirmation commands.
//!
//! `idle check` is meant to run from a periodic timer (cron, systemd
//! timer, launchd); the other two resolve the confirmation it raises.

use std::io::Write;

use anyhow::Result;
use chrono::{Local, Utc};

use tb_core::{format_duration, is_business_hours};
use tb_store::DataDir;

/// Minutes without activity before a session is auto-paused.
pub const IDLE_THRESHOLD_MINUTES: i64 = 60;

/// Pauses the running session when the user appears idle.
///
/// The gates apply in order: a session must be running, it must be
/// business hours, no confirmation may already be pending, and the idle
/// gap must exceed the threshold.
pub fn check<W: Write>(writer: &mut W, dir: &DataDir) -> Result<()> {
    let tracker = dir.tracker();

    if tracker.active()?.is_none() {
        writeln!(writer, "No active tracking.")?;
        return Ok(());
    }

    if !is_business_hours(Local::now()) {
        writeln!(writer, "Outside business hours; idle detection skipped.")?;
        return Ok(());
    }

    if let Some(pending) = tracker.idle_state()? {
        writeln!(
            writer,
            "Idle confirmation already pending for \"{}\".",
            pending.client
        )?;
        return Ok(());
    }

    let now = Utc::now();
    let idle = tracker.idle_minutes(now)?;
    if idle <= IDLE_THRESHOLD_MINUTES {
        writeln!(writer, "Active - {idle} minutes idle.")?;
        return Ok(());
    }

    if let Some(pause) = tracker.pause_for_idle(now)? {
        writeln!(
            writer,
            "Paused \"{}\" after {idle} idle minutes.",
            pause.client
        )?;
        writeln!(
            writer,
            "Run `tb idle resume` if you kept working, or `tb idle stop` to drop the gap."
        )?;
    }
    Ok(())
}

/// The user confirms they worked through the gap: both the pre-pause
/// portion and the gap itself are billed, and tracking continues.
pub fn resume<W: Write>(writer: &mut W, dir: &DataDir) -> Result<()> {
    let tracker = dir.tracker();
    let Some(idle) = tracker.idle_state()? else {
        writeln!(writer, "No idle confirmation pending.")?;
        return Ok(());
    };

    let now = Utc::now();
    let (before, gap) = tracker.resume_from_idle(&idle, now)?;
    writeln!(
        writer,
        "Recorded \"{}\" {} + {} (idle time counted).",
        idle.client,
        format_duration(before.duration_minutes),
        format_duration(gap.duration_minutes)
    )?;
    writeln!(
        writer,
        "Tracking \"{}\" again since {}.",
        idle.client,
        now.with_timezone(&Local).format("%H:%M")
    )?;
    Ok(())
}

/// The user declines the gap: only the pre-pause portion is billed and
/// tracking stays stopped.
pub fn stop<W: Write>(writer: &mut W, dir: &DataDir) -> Result<()> {
    let tracker = dir.tracker();
    let Some(idle) = tracker.idle_state()? else {
        writeln!(writer, "No idle confirmation pending.")?;
        return Ok(());
    };

    let entry = tracker.stop_from_idle(&idle)?;
    writeln!(
        writer,
        "Recorded \"{}\" {} (idle time not counted).",
        entry.client,
        format_duration(entry.duration_minutes)
    )?;
    Ok(())
}
