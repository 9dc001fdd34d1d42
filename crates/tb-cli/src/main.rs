use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tb_cli::commands::{entries, idle, ping, report, start, status, stop, summary};
use tb_cli::commands::stop::Resolution;
use tb_cli::{Cli, Commands, Config, EntriesAction, IdleAction};
use tb_store::DataDir;

/// Load config and open the data directory, creating it if needed.
fn open_data_dir(config_path: Option<&Path>) -> Result<DataDir> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    DataDir::open(&config.data_dir).context("failed to open data directory")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let mut stdout = std::io::stdout();

    match &cli.command {
        Some(Commands::Start {
            client,
            cap_hour,
            end,
            keep_full,
        }) => {
            let dir = open_data_dir(cli.config.as_deref())?;
            let _lock = dir.lock_exclusive().context("failed to lock data directory")?;
            let resolution = Resolution::from_flags(*cap_hour, end.as_deref(), *keep_full)?;
            start::run(&mut stdout, &dir, client, resolution)?;
        }
        Some(Commands::Stop {
            cap_hour,
            end,
            keep_full,
            discard,
        }) => {
            let dir = open_data_dir(cli.config.as_deref())?;
            let _lock = dir.lock_exclusive().context("failed to lock data directory")?;
            let resolution = Resolution::from_flags(*cap_hour, end.as_deref(), *keep_full)?;
            stop::run(&mut stdout, &dir, resolution, *discard)?;
        }
        Some(Commands::Status) => {
            let dir = open_data_dir(cli.config.as_deref())?;
            // Status bumps the activity time, so it takes the lock too
            let _lock = dir.lock_exclusive().context("failed to lock data directory")?;
            status::run(&mut stdout, &dir)?;
        }
        Some(Commands::Ping) => {
            let dir = open_data_dir(cli.config.as_deref())?;
            let _lock = dir.lock_exclusive().context("failed to lock data directory")?;
            ping::run(&dir)?;
        }
        Some(Commands::Idle { action }) => {
            let dir = open_data_dir(cli.config.as_deref())?;
            let _lock = dir.lock_exclusive().context("failed to lock data directory")?;
            match action {
                IdleAction::Check => idle::check(&mut stdout, &dir)?,
                IdleAction::Resume => idle::resume(&mut stdout, &dir)?,
                IdleAction::Stop => idle::stop(&mut stdout, &dir)?,
            }
        }
        Some(Commands::Entries { action }) => {
            let dir = open_data_dir(cli.config.as_deref())?;
            match action {
                EntriesAction::List { json } => entries::list(&mut stdout, &dir, *json)?,
                EntriesAction::Add {
                    client,
                    date,
                    start,
                    end,
                } => {
                    let _lock = dir.lock_exclusive().context("failed to lock data directory")?;
                    entries::add(&mut stdout, &dir, client, *date, start, end)?;
                }
                EntriesAction::Edit {
                    client,
                    start,
                    end,
                    set_client,
                    set_start,
                    set_end,
                } => {
                    let _lock = dir.lock_exclusive().context("failed to lock data directory")?;
                    entries::edit(
                        &mut stdout,
                        &dir,
                        &entries::EditArgs {
                            client,
                            start,
                            end,
                            set_client: set_client.as_deref(),
                            set_start: set_start.as_deref(),
                            set_end: set_end.as_deref(),
                        },
                    )?;
                }
                EntriesAction::Delete { client, start, end } => {
                    let _lock = dir.lock_exclusive().context("failed to lock data directory")?;
                    entries::delete(&mut stdout, &dir, client, start, end)?;
                }
            }
        }
        Some(Commands::Report { range, json }) => {
            let dir = open_data_dir(cli.config.as_deref())?;
            report::run(&mut stdout, &dir, *range, *json)?;
        }
        Some(Commands::Summary { range }) => {
            let dir = open_data_dir(cli.config.as_deref())?;
            summary::run(&mut stdout, &dir, *range)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
