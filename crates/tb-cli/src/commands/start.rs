//! Start command: begin tracking, switching away from any running
//! session.

use std::io::Write;

use anyhow::Result;
use chrono::Utc;

use tb_core::{Client, format_duration};
use tb_store::DataDir;

use super::stop::Resolution;

pub fn run<W: Write>(writer: &mut W, dir: &DataDir, client: &str, resolution: Resolution) -> Result<()> {
    let client = Client::new(client)?;
    let tracker = dir.tracker();

    if let Some(pending) = tracker.idle_state()? {
        anyhow::bail!(
            "an idle confirmation is pending for \"{}\"; run `tb idle resume` or `tb idle stop` first",
            pending.client
        );
    }

    let now = Utc::now();

    // Resolve the previous session explicitly when a flag asked for a
    // capped or custom end; otherwise start() finalizes it at now.
    if let Some(active) = tracker.active()? {
        match resolution {
            Resolution::CapHour => {
                if let Some(entry) = tracker.stop_capped_at_hour()? {
                    writeln!(
                        writer,
                        "Recorded \"{}\" as {} (capped at one hour).",
                        entry.client,
                        format_duration(entry.duration_minutes)
                    )?;
                }
            }
            Resolution::At(end) => {
                super::stop::validate_end(&active, end)?;
                if let Some(entry) = tracker.stop(end)? {
                    writeln!(
                        writer,
                        "Recorded \"{}\" - {}.",
                        entry.client,
                        format_duration(entry.duration_minutes)
                    )?;
                }
            }
            Resolution::KeepFull => {}
            Resolution::Auto => super::stop::require_short_session(&active, now)?,
        }
    }

    let outcome = tracker.start(client, now)?;
    match outcome.previous {
        Some(entry) => writeln!(
            writer,
            "Stopped \"{}\" ({}), now tracking \"{}\".",
            entry.client,
            format_duration(entry.duration_minutes),
            outcome.client
        )?,
        None => writeln!(writer, "Started tracking \"{}\".", outcome.client)?,
    }
    Ok(())
}
