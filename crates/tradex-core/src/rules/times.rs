//! Entry and exit time handling.

use regex::Regex;

use super::patterns::{TIME_ENTRY, TIME_EXIT};

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Convert a spreadsheet time cell to `HH:MM`.
///
/// Accepts clock text (`9:30`, `09:30:15`) and fractional days in `[0, 1)`,
/// the way spreadsheets store a bare time of day. Anything else is `None`.
pub fn decode_time(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.contains(':') {
        // "2024-01-15 09:30" keeps only the clock part
        let clock = raw.rsplit(' ').next().unwrap_or(raw);
        let mut parts = clock.split(':');
        let hours: u32 = parts.next()?.trim().parse().ok()?;
        let minutes: u32 = parts.next()?.trim().parse().ok()?;
        return format_hhmm(hours, minutes);
    }

    raw.parse::<f64>().ok().and_then(fraction_to_hhmm)
}

/// Convert a fraction of a day to `HH:MM`, rounding to the nearest minute.
pub fn fraction_to_hhmm(fraction: f64) -> Option<String> {
    if !fraction.is_finite() || !(0.0..1.0).contains(&fraction) {
        return None;
    }

    let total = fraction * MINUTES_PER_DAY;
    let mut minutes = total.round();
    // Snap to the whole minute only within tolerance, otherwise truncate
    if (total - minutes).abs() > 1e-6 {
        minutes = total.floor();
    }

    let minutes = minutes as u32;
    format_hhmm((minutes / 60) % 24, minutes % 60)
}

/// Entry time mentioned in a line (`entrada 09:30`, `entry at 9:15`).
pub fn extract_entry_time(line: &str) -> Option<String> {
    capture_time(&TIME_ENTRY, line)
}

/// Exit time mentioned in a line (`salida 11:45`, `exit: 16:00`).
pub fn extract_exit_time(line: &str) -> Option<String> {
    capture_time(&TIME_EXIT, line)
}

fn capture_time(pattern: &Regex, line: &str) -> Option<String> {
    let caps = pattern.captures(line)?;
    let hours: u32 = caps[1].parse().ok()?;
    let minutes: u32 = caps[2].parse().ok()?;
    format_hhmm(hours, minutes)
}

fn format_hhmm(hours: u32, minutes: u32) -> Option<String> {
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(format!("{:02}:{:02}", hours, minutes))
}
