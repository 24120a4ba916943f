//! Stats command: today's total, all-time totals, the 7-day trend and the
//! category breakdown for one account.

use std::io::Write;

use anyhow::Result;
use pomo_core::stats::fill_week;
use pomo_core::{Clock, SessionLog, StatsSnapshot, User};
use serde::Serialize;

use super::util::{format_duration, progress_bar};

/// JSON shape of `pomo stats --json`.
#[derive(Debug, Serialize)]
struct StatsReport<'a> {
    username: &'a str,
    #[serde(flatten)]
    stats: &'a StatsSnapshot,
}

/// Computes the snapshot with the trend padded to all seven days.
pub fn generate<L, C>(log: &L, clock: C, user: &User) -> Result<StatsSnapshot>
where
    L: SessionLog + ?Sized,
    C: Clock,
{
    let mut snapshot = pomo_core::Aggregator::new(log, clock).snapshot(&user.id)?;
    snapshot.last_7_days = fill_week(&snapshot.last_7_days, snapshot.today).to_vec();
    Ok(snapshot)
}

/// Writes the human-readable report.
pub fn write_stats<W: Write>(writer: &mut W, username: &str, stats: &StatsSnapshot) -> Result<()> {
    writeln!(writer, "Focus statistics for {username}")?;

    // Zero-length sessions still count as recorded
    if stats.category_totals.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "No focus sessions recorded yet.")?;
        writeln!(writer, "Hint: Run 'pomo focus' to start one.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "Today:         {} ({})",
        format_duration(stats.today_total_seconds),
        stats.today
    )?;
    writeln!(
        writer,
        "All time:      {}",
        format_duration(stats.all_time_total_seconds)
    )?;
    writeln!(writer, "Distractions:  {}", stats.total_distractions)?;

    writeln!(writer)?;
    writeln!(writer, "LAST 7 DAYS")?;
    let busiest = stats
        .last_7_days
        .iter()
        .map(|day| day.total_seconds)
        .max()
        .unwrap_or(0);
    for day in &stats.last_7_days {
        writeln!(
            writer,
            "  {}  {}  {}",
            day.date.format("%a %m-%d"),
            progress_bar(day.total_seconds, busiest),
            format_duration(day.total_seconds)
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "BY CATEGORY")?;
    for total in &stats.category_totals {
        writeln!(
            writer,
            "  {:<8}  {}  {:>5.1}%  {}",
            total.category.as_str(),
            progress_bar(total.total_seconds, stats.all_time_total_seconds),
            total.share_percent(stats.all_time_total_seconds),
            format_duration(total.total_seconds)
        )?;
    }

    Ok(())
}

/// Writes the report as pretty-printed JSON.
pub fn write_stats_json<W: Write>(
    writer: &mut W,
    username: &str,
    stats: &StatsSnapshot,
) -> Result<()> {
    let report = StatsReport { username, stats };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

pub fn run<W, L, C>(writer: &mut W, log: &L, clock: C, user: &User, json: bool) -> Result<()>
where
    W: Write,
    L: SessionLog + ?Sized,
    C: Clock,
{
    let stats = generate(log, clock, user)?;
    if json {
        write_stats_json(writer, &user.username, &stats)
    } else {
        write_stats(writer, &user.username, &stats)
    }
}
