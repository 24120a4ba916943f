//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pomo_core::Category;

/// Focus timer with per-user statistics.
///
/// Runs countdown focus sessions, counts distractions, and reports where the
/// time went.
#[derive(Debug, Parser)]
#[command(name = "pomo", version, about, long_about = None)]
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

/// Account credentials, checked on every command that touches user data.
#[derive(Debug, Clone, Args)]
pub struct Credentials {
    /// Account username.
    #[arg(short, long, env = "POMO_USERNAME")]
    pub username: String,

    /// Account password.
    #[arg(short, long, env = "POMO_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an account.
    Register {
        #[command(flatten)]
        credentials: Credentials,
    },

    /// Check that credentials are valid.
    Login {
        #[command(flatten)]
        credentials: Credentials,
    },

    /// Run an interactive focus session.
    ///
    /// Commands are read from stdin, one per line: pause, away, continue,
    /// finish, reset, status, help, quit.
    Focus {
        #[command(flatten)]
        credentials: Credentials,

        /// Session length in minutes (defaults to `default_minutes`).
        #[arg(short, long)]
        minutes: Option<u32>,

        /// Activity category: study, coding, project, or reading.
        #[arg(short = 'C', long)]
        category: Option<Category>,
    },

    /// Show focus statistics.
    Stats {
        #[command(flatten)]
        credentials: Credentials,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List recorded sessions, newest first.
    Log {
        #[command(flatten)]
        credentials: Credentials,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Delete every recorded session for the account.
    Clear {
        #[command(flatten)]
        credentials: Credentials,

        /// Confirm deletion.
        #[arg(long)]
        yes: bool,
    },
}
