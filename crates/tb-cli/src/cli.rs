//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

/// Billable time tracker.
///
/// Records work intervals against named clients, rounds them into
/// billing increments, and catches idle and long-running sessions so a
/// forgotten timer never silently misbills.
#[derive(Debug, Parser)]
#[command(name = "tb", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start tracking a client, switching from any running session.
    Start {
        /// Client to bill the time against.
        client: String,

        /// Cap the session being switched away from at one hour.
        #[arg(long, conflicts_with_all = ["end", "keep_full"])]
        cap_hour: bool,

        /// End the previous session at this time (RFC 3339, HH:MM, or
        /// e.g. "20 minutes ago").
        #[arg(long, conflicts_with = "keep_full")]
        end: Option<String>,

        /// Keep the full elapsed duration even for a long session.
        #[arg(long)]
        keep_full: bool,
    },

    /// Stop the running session and record the entry.
    Stop {
        /// Cap the session at one hour from its start.
        #[arg(long, conflicts_with_all = ["end", "keep_full", "discard"])]
        cap_hour: bool,

        /// End the session at this time (RFC 3339, HH:MM, or e.g.
        /// "20 minutes ago").
        #[arg(long, conflicts_with_all = ["keep_full", "discard"])]
        end: Option<String>,

        /// Keep the full elapsed duration even for a long session.
        #[arg(long, conflicts_with = "discard")]
        keep_full: bool,

        /// Abandon the session without recording an entry.
        #[arg(long)]
        discard: bool,
    },

    /// Show the current session and today's totals.
    Status,

    /// Record an activity heartbeat for idle detection.
    Ping,

    /// Idle detection and confirmation.
    Idle {
        #[command(subcommand)]
        action: IdleAction,
    },

    /// Inspect and edit recorded entries.
    Entries {
        #[command(subcommand)]
        action: EntriesAction,
    },

    /// Per-day breakdown of recorded time.
    Report {
        /// Period to report on.
        #[arg(long, value_enum, default_value_t = ReportRange::Week)]
        range: ReportRange,

        /// Emit JSON instead of the human-readable report.
        #[arg(long)]
        json: bool,
    },

    /// Per-client distribution and weekly breakdown.
    Summary {
        /// Period to summarize.
        #[arg(long, value_enum, default_value_t = SummaryRange::Month)]
        range: SummaryRange,
    },
}

/// Idle subcommands.
#[derive(Debug, Subcommand)]
pub enum IdleAction {
    /// Pause the session if it has gone idle (meant for a periodic
    /// timer).
    Check,

    /// Confirm you worked through the idle gap: bill it and keep
    /// tracking.
    Resume,

    /// Decline the idle gap: bill only the time before the pause.
    Stop,
}

/// Entry management subcommands.
#[derive(Debug, Subcommand)]
pub enum EntriesAction {
    /// List entries grouped by day, newest first.
    List {
        /// Emit the raw entries as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Record a manual entry.
    Add {
        /// Client to bill the time against.
        #[arg(long)]
        client: String,

        /// Day of the entry (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Start time (HH:MM, 24-hour).
        #[arg(long)]
        start: String,

        /// End time (HH:MM, 24-hour); at or before the start rolls past
        /// midnight.
        #[arg(long)]
        end: String,
    },

    /// Replace entries addressed by client and exact times.
    Edit {
        /// Client of the entry to edit.
        #[arg(long)]
        client: String,

        /// Exact start time of the entry to edit.
        #[arg(long)]
        start: String,

        /// Exact end time of the entry to edit.
        #[arg(long)]
        end: String,

        /// New client name.
        #[arg(long)]
        set_client: Option<String>,

        /// New start time.
        #[arg(long)]
        set_start: Option<String>,

        /// New end time.
        #[arg(long)]
        set_end: Option<String>,
    },

    /// Delete every entry matching client and exact times.
    Delete {
        /// Client of the entry to delete.
        #[arg(long)]
        client: String,

        /// Exact start time of the entry to delete.
        #[arg(long)]
        start: String,

        /// Exact end time of the entry to delete.
        #[arg(long)]
        end: String,
    },
}

/// Report periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportRange {
    Today,
    Week,
    Month,
    All,
}

/// Summary periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryRange {
    Week,
    Month,
    Quarter,
    All,
}
