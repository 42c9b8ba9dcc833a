//! Column mapping: bind headers to logical fields and project rows into
//! candidate records.

use std::collections::BTreeMap;

use tracing::{debug, trace, warn};

use super::TabularData;
use super::synonyms::{LogicalField, synonyms};
use crate::models::CandidateRecord;
use crate::rules::{
    coerce_date, decode_time, extract_risk_reward, infer_direction_cell, infer_result_cell,
    parse_number,
};

/// A header bound to a logical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    /// Position of the column in each row.
    pub index: usize,
    /// Header text as it appeared in the file.
    pub header: String,
}

/// Logical field to column bindings for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    bindings: BTreeMap<LogicalField, ColumnBinding>,
}

impl ColumnMapping {
    pub fn get(&self, field: LogicalField) -> Option<&ColumnBinding> {
        self.bindings.get(&field)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings in field order.
    pub fn iter(&self) -> impl Iterator<Item = (LogicalField, &ColumnBinding)> {
        self.bindings.iter().map(|(field, binding)| (*field, binding))
    }
}

/// Candidates recovered from a table, plus the rows that were dropped.
#[derive(Debug, Clone, Default)]
pub struct TabularExtraction {
    pub mapping: ColumnMapping,
    pub candidates: Vec<CandidateRecord>,
    /// Rows lacking a pair or a valid trade date.
    pub rejected: usize,
}

/// Bind each logical field to the first unclaimed header matching one of its
/// synonyms. Fields are visited in [`LogicalField::ALL`] order and a header
/// is never bound twice.
pub fn map_columns(headers: &[String]) -> ColumnMapping {
    let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    let mut claimed = vec![false; headers.len()];
    let mut mapping = ColumnMapping::default();

    for field in LogicalField::ALL {
        let found = normalized
            .iter()
            .enumerate()
            .find(|(index, header)| !claimed[*index] && header_matches(header, field));

        if let Some((index, _)) = found {
            claimed[index] = true;
            trace!("Column '{}' -> {}", headers[index], field);
            mapping.bindings.insert(
                field,
                ColumnBinding {
                    index,
                    header: headers[index].clone(),
                },
            );
        }
    }

    mapping
}

fn header_matches(header: &str, field: LogicalField) -> bool {
    !header.is_empty()
        && synonyms(field)
            .iter()
            .any(|synonym| header == *synonym || header.contains(synonym))
}

/// Map the table's columns and project every row.
///
/// Rows that end up without both a pair and a trade date are dropped and
/// counted in [`TabularExtraction::rejected`].
pub fn extract_rows(table: &TabularData) -> TabularExtraction {
    let mapping = map_columns(&table.headers);
    debug!(
        "Mapped {} of {} columns: {}",
        mapping.len(),
        table.headers.len(),
        mapping
            .iter()
            .map(|(field, binding)| format!("{}='{}'", field, binding.header))
            .collect::<Vec<_>>()
            .join(", ")
    );

    if mapping.get(LogicalField::Pair).is_none() || mapping.get(LogicalField::TradeDate).is_none() {
        warn!("No pair or date column found; every row will be rejected");
    }

    let mut candidates = Vec::new();
    let mut rejected = 0;

    for (row_number, row) in table.rows.iter().enumerate() {
        let candidate = project_row(row, &mapping);
        if candidate.pair.is_some() && candidate.trade_date.is_some() {
            candidates.push(candidate);
        } else {
            trace!("Row {} lacks pair or date, dropped", row_number + 1);
            rejected += 1;
        }
    }

    TabularExtraction {
        mapping,
        candidates,
        rejected,
    }
}

/// Coerce the bound cells of one row into a candidate record.
pub fn project_row(row: &[String], mapping: &ColumnMapping) -> CandidateRecord {
    let mut candidate = CandidateRecord::new();

    for (field, binding) in mapping.iter() {
        let Some(value) = row.get(binding.index).map(|cell| cell.trim()) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }

        match field {
            LogicalField::Pair => candidate.pair = Some(value.to_uppercase()),
            LogicalField::TradeDate => {
                candidate.trade_date = coerce_date(value);
                if candidate.trade_date.is_none() {
                    trace!("Unparseable date '{}'", value);
                }
            }
            LogicalField::Direction => candidate.direction = infer_direction_cell(value),
            LogicalField::RiskPercentage => {
                candidate.risk_percentage = parse_number(value).map(|v| v.abs())
            }
            LogicalField::RiskReward => {
                candidate.risk_reward = parse_number(value)
                    .map(|v| v.abs())
                    .or_else(|| extract_risk_reward(value))
            }
            LogicalField::Result => candidate.result = Some(infer_result_cell(value)),
            LogicalField::ResultAmount => {
                candidate.result_amount = parse_number(value).map(|v| v.abs())
            }
            LogicalField::Setup => candidate.setup = Some(value.to_string()),
            LogicalField::Notes => candidate.notes = Some(value.to_string()),
            LogicalField::EntryTime => candidate.entry_time = coerce_time_cell(value),
            LogicalField::ExitTime => candidate.exit_time = coerce_time_cell(value),
        }
    }

    candidate
}

/// Fractional days and clock text become `HH:MM`; other text with a colon
/// is kept as written.
fn coerce_time_cell(value: &str) -> Option<String> {
    decode_time(value).or_else(|| value.contains(':').then(|| value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Direction, TradeResult};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn table(headers: &[&str], rows: &[&[&str]]) -> TabularData {
        TabularData {
            headers: strings(headers),
            rows: rows.iter().map(|r| strings(r)).collect(),
        }
    }

    #[test]
    fn test_spanish_headers_scenario() {
        let data = table(
            &["Par", "Fecha", "Resultado", "Cantidad"],
            &[&["EUR/USD", "15/01/2024", "loss", "-5.2"]],
        );

        let extraction = extract_rows(&data);
        assert_eq!(extraction.rejected, 0);
        assert_eq!(extraction.candidates.len(), 1);

        let candidate = &extraction.candidates[0];
        assert_eq!(candidate.pair.as_deref(), Some("EUR/USD"));
        assert_eq!(candidate.trade_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(candidate.result, Some(TradeResult::Loss));
        assert_eq!(candidate.result_amount, Some(Decimal::from_str("5.2").unwrap()));
        assert_eq!(candidate.direction, None);
    }

    #[test]
    fn test_header_claimed_once() {
        // "Ganancia" is a synonym of both result and result_amount
        let mapping = map_columns(&strings(&["Pair", "Date", "Ganancia"]));
        assert_eq!(mapping.get(LogicalField::Result).map(|b| b.index), Some(2));
        assert!(mapping.get(LogicalField::ResultAmount).is_none());
    }

    #[test]
    fn test_first_matching_header_wins() {
        let mapping = map_columns(&strings(&["Notas", "Fecha", "Fecha cierre", "Symbol"]));
        assert_eq!(mapping.get(LogicalField::TradeDate).map(|b| b.index), Some(1));
        assert_eq!(mapping.get(LogicalField::Pair).map(|b| b.index), Some(3));
        assert_eq!(mapping.get(LogicalField::Notes).map(|b| b.index), Some(0));
    }

    #[test]
    fn test_rows_without_identity_are_rejected() {
        let data = table(
            &["pair", "date", "direction"],
            &[
                &["eur/usd", "2024-01-15", "Compra"],
                &["", "2024-01-16", "short"],
                &["GBP/USD", "not a date", "short"],
            ],
        );

        let extraction = extract_rows(&data);
        assert_eq!(extraction.candidates.len(), 1);
        assert_eq!(extraction.rejected, 2);
        assert_eq!(extraction.candidates[0].pair.as_deref(), Some("EUR/USD"));
        assert_eq!(extraction.candidates[0].direction, Some(Direction::Long));
    }

    #[test]
    fn test_numeric_and_time_coercions() {
        let data = table(
            &["Symbol", "Date", "Riesgo %", "R:R", "Amount", "Hora entrada", "Hora salida"],
            &[&["EUR/USD", "2024/01/15", "1,5%", "1:3", "N/A", "0.5", "14:30"]],
        );

        let extraction = extract_rows(&data);
        let candidate = &extraction.candidates[0];
        assert_eq!(candidate.risk_percentage, Some(Decimal::from_str("1.5").unwrap()));
        assert_eq!(candidate.risk_reward, Some(Decimal::from(3)));
        assert_eq!(candidate.result_amount, None);
        assert_eq!(candidate.entry_time.as_deref(), Some("12:00"));
        assert_eq!(candidate.exit_time.as_deref(), Some("14:30"));
    }

    #[test]
    fn test_empty_cells_leave_fields_unset() {
        let data = table(&["pair", "date", "setup"], &[&["EUR/USD", "2024-01-15", "  "]]);
        let extraction = extract_rows(&data);
        assert_eq!(extraction.candidates[0].setup, None);
    }
}
