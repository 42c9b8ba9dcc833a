//! CSV and spreadsheet readers producing raw cell strings.

use std::io::Cursor;

use calamine::{Data, Ods, Reader, Xls, Xlsx};
use chrono::{NaiveDate, TimeDelta};
use csv::ReaderBuilder;
use tracing::{debug, trace};

use super::TabularData;
use crate::error::TabularError;
use crate::format::TabularKind;
use crate::models::TabularConfig;

/// Result type for tabular operations.
pub type TabularResult<T> = std::result::Result<T, TabularError>;

/// Read a tabular upload into a header row plus data rows.
///
/// Fully empty rows are skipped. The header is the first non-empty row.
pub fn read_table(kind: TabularKind, bytes: &[u8], config: &TabularConfig) -> TabularResult<TabularData> {
    let table = match kind {
        TabularKind::Csv => read_csv(bytes, config.csv_delimiter)?,
        TabularKind::Xlsx => read_workbook::<Xlsx<_>>(bytes, config.sheet.as_deref())?,
        TabularKind::Xls => read_workbook::<Xls<_>>(bytes, config.sheet.as_deref())?,
        TabularKind::Ods => read_workbook::<Ods<_>>(bytes, config.sheet.as_deref())?,
    };

    debug!(
        "Read {:?} table: {} columns, {} rows",
        kind,
        table.headers.len(),
        table.rows.len()
    );
    Ok(table)
}

/// Read CSV bytes. The delimiter is detected from the header line unless given.
pub fn read_csv(bytes: &[u8], delimiter: Option<char>) -> TabularResult<TabularData> {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    let content = String::from_utf8_lossy(bytes);

    let delimiter = delimiter
        .filter(char::is_ascii)
        .unwrap_or_else(|| detect_delimiter(content.lines().next().unwrap_or("")));

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let fields: Vec<String> = record?.iter().map(str::to_string).collect();
        rows.push(fields);
    }

    Ok(split_header(rows))
}

/// Pick `;` or tab over `,` when the header line has more of them.
fn detect_delimiter(first_line: &str) -> char {
    let counts = [
        (',', first_line.matches(',').count()),
        (';', first_line.matches(';').count()),
        ('\t', first_line.matches('\t').count()),
    ];

    counts
        .into_iter()
        .fold((',', 0), |best, candidate| {
            if candidate.1 > best.1 { candidate } else { best }
        })
        .0
}

fn read_workbook<R>(bytes: &[u8], sheet: Option<&str>) -> TabularResult<TabularData>
where
    R: Reader<Cursor<Vec<u8>>>,
    R::Error: std::fmt::Display,
{
    let mut workbook = R::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| TabularError::Spreadsheet(e.to_string()))?;

    let sheet_names = workbook.sheet_names();
    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| TabularError::SheetNotFound(name.to_string()))?,
        None => sheet_names.first().cloned().ok_or(TabularError::NoSheets)?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| TabularError::Spreadsheet(e.to_string()))?;

    trace!("Sheet '{}' spans {:?}", sheet_name, range.get_size());

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok(split_header(rows))
}

fn split_header(rows: Vec<Vec<String>>) -> TabularData {
    let mut rows = rows
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()));

    let headers = rows
        .next()
        .map(|row| row.into_iter().map(|h| h.trim().to_string()).collect())
        .unwrap_or_default();

    TabularData {
        headers,
        rows: rows.collect(),
    }
}

/// Render a spreadsheet cell as text.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format_float(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_text(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Excel serial date-time (1899-12-30 base) as text.
///
/// Pure times of day (`< 1`) stay as the raw fraction; dates render as
/// `YYYY-MM-DD`, with ` HH:MM` appended when a time part is present.
fn excel_serial_to_text(value: f64) -> String {
    if !value.is_finite() || value < 1.0 {
        return value.to_string();
    }

    let Some(base) = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return value.to_string();
    };

    let seconds = (value * 86_400.0).round() as i64;
    let Some(datetime) = TimeDelta::try_seconds(seconds).and_then(|delta| base.checked_add_signed(delta))
    else {
        return value.to_string();
    };
    if seconds % 86_400 == 0 {
        datetime.format("%Y-%m-%d").to_string()
    } else {
        datetime.format("%Y-%m-%d %H:%M").to_string()
    }
}
