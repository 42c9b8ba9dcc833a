//! Trade record models: the in-progress candidate and the canonical record.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Default for Direction {
    fn default() -> Self {
        Self::Long
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "Long"),
            Direction::Short => write!(f, "Short"),
        }
    }
}

/// Outcome of a trade. The sign of the result amount lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeResult {
    Win,
    Loss,
    Breakeven,
}

impl Default for TradeResult {
    fn default() -> Self {
        Self::Win
    }
}

impl fmt::Display for TradeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeResult::Win => write!(f, "win"),
            TradeResult::Loss => write!(f, "loss"),
            TradeResult::Breakeven => write!(f, "breakeven"),
        }
    }
}

/// A partially-filled trade, built up field by field during extraction.
///
/// Every slot is optional. Extractors fill a slot at most once; the record is
/// handed to the normalizer by value once extraction of it is finished.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CandidateRecord {
    /// Instrument symbol, e.g. `EUR/USD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pair: Option<String>,

    /// Trade date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,

    /// Risked share of the account, in percent.
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub risk_percentage: Option<Decimal>,

    /// Reward-to-risk multiple.
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub risk_reward: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TradeResult>,

    /// Absolute size of the result.
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub result_amount: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Entry time as `HH:MM`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_time: Option<String>,

    /// Exit time as `HH:MM`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<String>,
}

impl CandidateRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no slot has been filled.
    pub fn is_empty(&self) -> bool {
        self.pair.is_none()
            && self.trade_date.is_none()
            && self.direction.is_none()
            && self.risk_percentage.is_none()
            && self.risk_reward.is_none()
            && self.result.is_none()
            && self.result_amount.is_none()
            && self.setup.is_none()
            && self.notes.is_none()
            && self.entry_time.is_none()
            && self.exit_time.is_none()
    }

    /// True when at least one of the two identifying fields is present.
    pub fn has_identity(&self) -> bool {
        self.pair.is_some() || self.trade_date.is_some()
    }
}

/// A fully-defaulted trade ready for persistence. No field is undefined;
/// optional columns are explicit nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub pair: String,

    pub trade_date: NaiveDate,

    pub direction: Direction,

    #[serde(with = "rust_decimal::serde::float")]
    pub risk_percentage: Decimal,

    #[serde(with = "rust_decimal::serde::float_option")]
    pub risk_reward: Option<Decimal>,

    pub result: TradeResult,

    #[serde(with = "rust_decimal::serde::float")]
    pub result_amount: Decimal,

    pub setup: String,

    pub notes: String,

    pub entry_time: Option<String>,

    pub exit_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_candidate_emptiness_and_identity() {
        let mut candidate = CandidateRecord::new();
        assert!(candidate.is_empty());
        assert!(!candidate.has_identity());

        candidate.notes = Some("tight stop".to_string());
        assert!(!candidate.is_empty());
        assert!(!candidate.has_identity());

        candidate.trade_date = NaiveDate::from_ymd_opt(2024, 1, 15);
        assert!(candidate.has_identity());
    }

    #[test]
    fn test_canonical_serializes_numbers_and_nulls() {
        let record = CanonicalRecord {
            pair: "EUR/USD".to_string(),
            trade_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            direction: Direction::Short,
            risk_percentage: Decimal::from_str("1.5").unwrap(),
            risk_reward: None,
            result: TradeResult::Loss,
            result_amount: Decimal::from_str("5.2").unwrap(),
            setup: "Imported".to_string(),
            notes: String::new(),
            entry_time: None,
            exit_time: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["trade_date"], "2024-01-15");
        assert_eq!(json["direction"], "Short");
        assert_eq!(json["result"], "loss");
        assert_eq!(json["risk_percentage"], 1.5);
        assert_eq!(json["result_amount"], 5.2);
        assert!(json["risk_reward"].is_null());
        assert!(json["entry_time"].is_null());
    }
}
