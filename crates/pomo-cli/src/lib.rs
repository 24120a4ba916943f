//! Focus timer CLI library.
//!
//! This crate provides the CLI interface for the focus timer.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, Credentials};
pub use config::Config;
