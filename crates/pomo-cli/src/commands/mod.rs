//! CLI subcommand implementations.

pub mod account;
pub mod clear;
pub mod focus;
pub mod log;
pub mod stats;
pub mod terminal;
pub mod util;
