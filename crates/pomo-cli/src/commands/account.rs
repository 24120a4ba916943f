//! Account commands and the credential check every other command runs.

use std::io::Write;

use anyhow::{Context, Result};
use pomo_core::User;
use pomo_db::Database;

use crate::Credentials;

/// Creates an account and reports it.
pub fn register<W: Write>(
    writer: &mut W,
    db: &mut Database,
    credentials: &Credentials,
) -> Result<User> {
    let user = db
        .register(&credentials.username, &credentials.password)
        .context("registration failed")?;
    writeln!(writer, "Registered {}.", user.username)?;
    Ok(user)
}

/// Verifies credentials and reports the account they resolve to.
pub fn login<W: Write>(writer: &mut W, db: &Database, credentials: &Credentials) -> Result<User> {
    let user = authenticate(db, credentials)?;
    writeln!(writer, "Logged in as {}.", user.username)?;
    Ok(user)
}

/// Resolves credentials to a user, failing the command if they are wrong.
pub fn authenticate(db: &Database, credentials: &Credentials) -> Result<User> {
    let user = db
        .authenticate(&credentials.username, &credentials.password)
        .context("login failed")?;
    tracing::debug!(user = %user.username, id = %user.id, "authenticated");
    Ok(user)
}
