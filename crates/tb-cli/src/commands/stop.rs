//! Stop command, including the long-session resolutions.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use tb_core::{ActiveSession, format_duration};
use tb_store::DataDir;

use super::util;

/// A session that ran this long uninterrupted needs an explicit choice
/// of how to record it.
pub const LONG_SESSION_MINUTES: u32 = 60;

/// How to resolve the end time of the session being stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No explicit choice: stop at now, but refuse long sessions.
    Auto,
    /// Cap at exactly one hour from the session start.
    CapHour,
    /// Stop at an explicit end time.
    At(DateTime<Utc>),
    /// Keep the full elapsed duration.
    KeepFull,
}

impl Resolution {
    /// Builds a resolution from the CLI flags. The flags are mutually
    /// exclusive at the clap level.
    pub fn from_flags(cap_hour: bool, end: Option<&str>, keep_full: bool) -> Result<Self> {
        Ok(if cap_hour {
            Self::CapHour
        } else if let Some(end) = end {
            Self::At(util::parse_datetime(end)?)
        } else if keep_full {
            Self::KeepFull
        } else {
            Self::Auto
        })
    }
}

pub fn run<W: Write>(
    writer: &mut W,
    dir: &DataDir,
    resolution: Resolution,
    discard: bool,
) -> Result<()> {
    let tracker = dir.tracker();

    if discard {
        match tracker.discard_active()? {
            Some(session) => writeln!(
                writer,
                "Discarded session for \"{}\"; nothing was recorded.",
                session.client
            )?,
            None => writeln!(writer, "No active tracking.")?,
        }
        return Ok(());
    }

    if let Some(pending) = tracker.idle_state()? {
        anyhow::bail!(
            "an idle confirmation is pending for \"{}\"; run `tb idle resume` or `tb idle stop` first",
            pending.client
        );
    }

    let Some(active) = tracker.active()? else {
        writeln!(writer, "No active tracking.")?;
        return Ok(());
    };

    let now = Utc::now();
    let entry = match resolution {
        Resolution::CapHour => tracker.stop_capped_at_hour()?,
        Resolution::At(end) => {
            validate_end(&active, end)?;
            tracker.stop(end)?
        }
        Resolution::KeepFull => tracker.stop(now)?,
        Resolution::Auto => {
            require_short_session(&active, now)?;
            tracker.stop(now)?
        }
    };

    let entry = entry.context("session disappeared while stopping")?;
    writeln!(
        writer,
        "Stopped \"{}\" - {}.",
        entry.client,
        format_duration(entry.duration_minutes)
    )?;
    Ok(())
}

/// An explicit end time must fall after the session start; nothing is
/// mutated otherwise.
pub fn validate_end(active: &ActiveSession, end: DateTime<Utc>) -> Result<()> {
    if end <= active.start_time {
        anyhow::bail!("stop time must be after the session start");
    }
    Ok(())
}

/// Refuses to silently record a session that ran over an hour; the user
/// picks one of the three resolutions instead.
pub fn require_short_session(active: &ActiveSession, now: DateTime<Utc>) -> Result<()> {
    let elapsed = active.elapsed_minutes(now);
    if elapsed > LONG_SESSION_MINUTES {
        anyhow::bail!(
            "\"{}\" has been running for {}; pass --keep-full, --cap-hour, or --end <time> to choose how to record it",
            active.client,
            format_duration(elapsed)
        );
    }
    Ok(())
}
