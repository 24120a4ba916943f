//! Log command for listing recorded sessions.

use std::io::Write;

use anyhow::Result;
use pomo_core::{SessionLog, User};

use super::util::format_duration;

pub fn run<W, L>(writer: &mut W, log: &L, user: &User, json: bool) -> Result<()>
where
    W: Write,
    L: SessionLog + ?Sized,
{
    let records = log.list_records_for_owner(&user.id)?;

    if json {
        serde_json::to_writer_pretty(&mut *writer, &records)?;
        writeln!(writer)?;
        return Ok(());
    }

    if records.is_empty() {
        writeln!(writer, "No sessions recorded for {}.", user.username)?;
        return Ok(());
    }

    writeln!(writer, "{:<10}  {:<8}  {:>8}  DISTRACTIONS", "DATE", "CATEGORY", "DURATION")?;
    for record in &records {
        writeln!(
            writer,
            "{:<10}  {:<8}  {:>8}  {}",
            record.date,
            record.category.as_str(),
            format_duration(u64::from(record.duration_seconds)),
            record.distraction_count
        )?;
    }

    Ok(())
}
