//! Shared utilities for CLI commands.

/// Width of [`progress_bar`] in cells.
const BAR_WIDTH: usize = 10;

/// Formats seconds as a short human duration.
///
/// Hours and minutes when over an hour, minutes and seconds under it.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    match (hours, minutes, secs) {
        (0, 0, 0) => "0m".to_string(),
        (0, 0, s) => format!("{s}s"),
        (0, m, 0) => format!("{m}m"),
        (0, m, s) => format!("{m}m {s}s"),
        (h, m, _) => format!("{h}h {m}m"),
    }
}

/// Generates a 10-character progress bar.
/// Nonzero values below 5% of max still get one block.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn progress_bar(value: u64, max: u64) -> String {
    if max == 0 {
        return "░".repeat(BAR_WIDTH);
    }

    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1
    } else {
        ((ratio * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH)
    };

    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}
