//! Line-by-line slot filling over free text.
//!
//! One candidate record is open at a time. A line naming a trading pair
//! starts a new record; every other line can only fill slots of the open
//! record that are still empty. Nothing is ever revisited, so a run is a
//! single linear pass over the text.

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tracing::{debug, trace};

use super::{ExtractionSource, TradeExtractor};
use crate::error::ExtractError;
use crate::models::{CandidateRecord, ExtractionConfig};
use crate::rules::{
    extract_date, extract_direction, extract_entry_time, extract_exit_time, extract_pair,
    extract_result, extract_result_amount, extract_risk, extract_risk_reward, extract_setup,
};

/// A field rule: tries to fill one slot from a line and reports whether the
/// line matched the rule's pattern at all, filled or not.
type FieldRule = fn(&mut CandidateRecord, &str, NaiveDate) -> bool;

/// Rules in priority order.
const FIELD_RULES: &[(&str, FieldRule)] = &[
    ("pair", pair_rule),
    ("trade_date", date_rule),
    ("direction", direction_rule),
    ("result", result_rule),
    ("result_amount", result_amount_rule),
    ("risk_percentage", risk_rule),
    ("risk_reward", risk_reward_rule),
    ("setup", setup_rule),
    ("entry_time", entry_time_rule),
    ("exit_time", exit_time_rule),
];

fn fill<T>(slot: &mut Option<T>, value: Option<T>) -> bool {
    match value {
        Some(value) => {
            if slot.is_none() {
                *slot = Some(value);
            }
            true
        }
        None => false,
    }
}

fn pair_rule(record: &mut CandidateRecord, line: &str, _: NaiveDate) -> bool {
    fill(&mut record.pair, extract_pair(line))
}

fn date_rule(record: &mut CandidateRecord, line: &str, today: NaiveDate) -> bool {
    fill(&mut record.trade_date, extract_date(line, today))
}

fn direction_rule(record: &mut CandidateRecord, line: &str, _: NaiveDate) -> bool {
    fill(&mut record.direction, extract_direction(line))
}

fn result_rule(record: &mut CandidateRecord, line: &str, _: NaiveDate) -> bool {
    fill(&mut record.result, extract_result(line))
}

fn result_amount_rule(record: &mut CandidateRecord, line: &str, _: NaiveDate) -> bool {
    fill(&mut record.result_amount, extract_result_amount(line))
}

fn risk_rule(record: &mut CandidateRecord, line: &str, _: NaiveDate) -> bool {
    fill(&mut record.risk_percentage, extract_risk(line))
}

fn risk_reward_rule(record: &mut CandidateRecord, line: &str, _: NaiveDate) -> bool {
    fill(&mut record.risk_reward, extract_risk_reward(line))
}

fn setup_rule(record: &mut CandidateRecord, line: &str, _: NaiveDate) -> bool {
    fill(&mut record.setup, extract_setup(line))
}

fn entry_time_rule(record: &mut CandidateRecord, line: &str, _: NaiveDate) -> bool {
    fill(&mut record.entry_time, extract_entry_time(line))
}

fn exit_time_rule(record: &mut CandidateRecord, line: &str, _: NaiveDate) -> bool {
    fill(&mut record.exit_time, extract_exit_time(line))
}

/// Pattern-based extractor for free text. Never fails.
#[derive(Debug, Clone)]
pub struct HeuristicExtractor {
    min_note_length: usize,
    reference_date: Option<NaiveDate>,
}

impl Default for HeuristicExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

impl HeuristicExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            min_note_length: config.min_note_length,
            reference_date: None,
        }
    }

    /// Anchor "today"/"yesterday" to a fixed date instead of the local clock.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Split text into candidate records.
    ///
    /// Fragments flushed at a pair boundary are emitted even without identity
    /// so that normalization can count them as rejected; the trailing record
    /// is emitted only when it has a pair or a date.
    pub fn extract_text(&self, text: &str) -> Vec<CandidateRecord> {
        let today = self
            .reference_date
            .unwrap_or_else(|| Local::now().date_naive());

        let mut records = Vec::new();
        let mut current = CandidateRecord::new();

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if !current.is_empty() && extract_pair(line).is_some() {
                trace!("Record boundary at '{}'", line);
                records.push(std::mem::take(&mut current));
            }

            let mut matched = false;
            for (field, rule) in FIELD_RULES {
                if rule(&mut current, line, today) {
                    trace!("'{}' matched {}", line, field);
                    matched = true;
                }
            }

            if !matched && current.notes.is_none() && line.chars().count() > self.min_note_length {
                current.notes = Some(line.to_string());
            }
        }

        if current.has_identity() {
            records.push(current);
        } else if !current.is_empty() {
            debug!("Dropping trailing fragment without pair or date");
        }

        debug!("Heuristic extraction found {} records", records.len());
        records
    }
}

#[async_trait]
impl TradeExtractor for HeuristicExtractor {
    fn source(&self) -> ExtractionSource {
        ExtractionSource::Heuristic
    }

    async fn extract(&self, text: &str) -> Result<Vec<CandidateRecord>, ExtractError> {
        Ok(self.extract_text(text))
    }
}
