use std::io::{self, BufReader, IsTerminal};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pomo_cli::commands::focus::FocusOptions;
use pomo_cli::commands::terminal::{self, RawLines, TerminalGuard};
use pomo_cli::commands::{account, clear, focus, log, stats};
use pomo_cli::{Cli, Commands, Config};
use pomo_core::SystemClock;

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(pomo_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = pomo_db::Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so command output stays parseable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut stdout = io::stdout().lock();

    match &cli.command {
        Some(Commands::Register { credentials }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            account::register(&mut stdout, &mut db, credentials)?;
        }
        Some(Commands::Login { credentials }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            account::login(&mut stdout, &db, credentials)?;
        }
        Some(Commands::Focus {
            credentials,
            minutes,
            category,
        }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let user = account::authenticate(&db, credentials)?;
            let options = FocusOptions {
                minutes: minutes.unwrap_or(config.default_minutes),
                category: category.unwrap_or(config.default_category),
                tick_interval: config.tick_interval(),
            };
            if io::stdin().is_terminal() {
                // Focus loss and Ctrl-Z count as distractions
                let _guard = TerminalGuard::enable()?;
                let inputs = terminal::spawn_events();
                focus::run_with_inputs(&inputs, &mut RawLines(&mut stdout), db, user, options)?;
            } else {
                focus::run(BufReader::new(io::stdin()), &mut stdout, db, user, options)?;
            }
        }
        Some(Commands::Stats { credentials, json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            let user = account::authenticate(&db, credentials)?;
            stats::run(&mut stdout, &db, SystemClock, &user, *json)?;
        }
        Some(Commands::Log { credentials, json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            let user = account::authenticate(&db, credentials)?;
            log::run(&mut stdout, &db, &user, *json)?;
        }
        Some(Commands::Clear { credentials, yes }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            let user = account::authenticate(&db, credentials)?;
            clear::run(&mut stdout, &mut db, &user, *yes)?;
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
