//! Command-line interface for the timebill tracker.

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Cli, Commands, EntriesAction, IdleAction, ReportRange, SummaryRange};
pub use config::Config;
