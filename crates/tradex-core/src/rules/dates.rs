//! Date parsing for spreadsheet cells and free-text lines.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

use super::patterns::{
    DATE_DMY, DATE_ENGLISH_LONG, DATE_LABELED, DATE_RELATIVE, DATE_SPANISH_LONG, DATE_YMD,
};

/// Canonical date layout used across the pipeline.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Format a date in the canonical `YYYY-MM-DD` layout.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse unambiguous date layouts: ISO dates and date-times, RFC 3339 and
/// long-form Spanish/English dates.
///
/// Slash-separated day/month layouts are deliberately not handled here,
/// see [`coerce_date`].
pub fn parse_date_generic(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Some(date);
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    parse_long_date(value)
}

/// Coerce a spreadsheet cell into a date.
///
/// Tries [`parse_date_generic`] first; otherwise splits on `/`, `-` or `.`
/// and decides between `YYYY/MM/DD` and `DD/MM/YYYY` by the width of the
/// first segment. Returns `None` when the result is not a real calendar date.
pub fn coerce_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Some(date) = parse_date_generic(value) {
        return Some(date);
    }

    let separator = ['/', '-', '.'].into_iter().find(|c| value.contains(*c))?;
    let parts: Vec<&str> = value.split(separator).map(str::trim).collect();
    if parts.len() != 3 {
        return None;
    }

    let numbers: Vec<u32> = parts
        .iter()
        .map(|p| p.parse::<u32>().ok())
        .collect::<Option<Vec<_>>>()?;

    if parts[0].len() == 4 {
        NaiveDate::from_ymd_opt(numbers[0] as i32, numbers[1], numbers[2])
    } else {
        NaiveDate::from_ymd_opt(parse_year(parts[2]), numbers[1], numbers[0])
    }
}

/// Find the first date mentioned in a line of text.
///
/// Layouts are tried in a fixed order; `today` anchors the relative
/// "hoy/today/ayer/yesterday" literals.
pub fn extract_date(line: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(caps) = DATE_YMD.captures(line) {
        let year: i32 = caps[1].parse().unwrap_or(0);
        let month: u32 = caps[2].parse().unwrap_or(0);
        let day: u32 = caps[3].parse().unwrap_or(0);
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    if let Some(caps) = DATE_DMY.captures(line) {
        let day: u32 = caps[1].parse().unwrap_or(0);
        let month: u32 = caps[2].parse().unwrap_or(0);
        let year: i32 = caps[3].parse().unwrap_or(0);
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    if let Some(caps) = DATE_LABELED.captures(line) {
        let day: u32 = caps[1].parse().unwrap_or(0);
        let month: u32 = caps[2].parse().unwrap_or(0);
        if let Some(date) = NaiveDate::from_ymd_opt(parse_year(&caps[3]), month, day) {
            return Some(date);
        }
    }

    if let Some(date) = parse_long_date(line) {
        return Some(date);
    }

    DATE_RELATIVE.captures(line).map(|caps| {
        match caps[1].to_lowercase().as_str() {
            "ayer" | "yesterday" => today - Duration::days(1),
            _ => today,
        }
    })
}

fn parse_long_date(text: &str) -> Option<NaiveDate> {
    if let Some(caps) = DATE_SPANISH_LONG.captures(text) {
        let day: u32 = caps[1].parse().unwrap_or(0);
        let month = spanish_month_to_number(&caps[2]);
        let year: i32 = caps[3].parse().unwrap_or(0);
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    if let Some(caps) = DATE_ENGLISH_LONG.captures(text) {
        let month = english_month_to_number(&caps[1]);
        let day: u32 = caps[2].parse().unwrap_or(0);
        let year: i32 = caps[3].parse().unwrap_or(0);
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    None
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.trim().parse().unwrap_or(0);
    if year < 100 {
        // Two-digit year: 00-50 is 2000s, 51-99 is 1900s
        if year <= 50 {
            2000 + year
        } else {
            1900 + year
        }
    } else {
        year
    }
}

fn spanish_month_to_number(month: &str) -> u32 {
    match month.to_lowercase().as_str() {
        "enero" => 1,
        "febrero" => 2,
        "marzo" => 3,
        "abril" => 4,
        "mayo" => 5,
        "junio" => 6,
        "julio" => 7,
        "agosto" => 8,
        "septiembre" | "setiembre" => 9,
        "octubre" => 10,
        "noviembre" => 11,
        "diciembre" => 12,
        _ => 0,
    }
}

fn english_month_to_number(month: &str) -> u32 {
    match month.to_lowercase().as_str() {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sept" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => 0,
    }
}
