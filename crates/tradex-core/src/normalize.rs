//! Candidate to canonical record: defaults and the admission check.

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::trace;

use crate::models::{CandidateRecord, CanonicalRecord, ExtractionConfig};

/// Why a candidate was not admitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("candidate has neither a pair nor a trade date")]
    MissingIdentity,
}

/// Defaults applied during normalization.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub default_setup: String,
    pub unknown_pair: String,
    /// Trade date given to records that only carry a pair.
    pub reference_date: NaiveDate,
}

impl NormalizeOptions {
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            default_setup: config.default_setup.clone(),
            unknown_pair: config.unknown_pair.clone(),
            reference_date: Local::now().date_naive(),
        }
    }

    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = date;
        self
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

/// Fill every default, or reject a candidate without identity.
pub fn normalize(
    candidate: CandidateRecord,
    options: &NormalizeOptions,
) -> Result<CanonicalRecord, Rejection> {
    if !candidate.has_identity() {
        return Err(Rejection::MissingIdentity);
    }

    let pair = candidate
        .pair
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| options.unknown_pair.clone());

    let setup = candidate
        .setup
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| options.default_setup.clone());

    Ok(CanonicalRecord {
        pair,
        trade_date: candidate.trade_date.unwrap_or(options.reference_date),
        direction: candidate.direction.unwrap_or_default(),
        risk_percentage: candidate.risk_percentage.map(|v| v.abs()).unwrap_or(Decimal::ZERO),
        risk_reward: candidate.risk_reward.map(|v| v.abs()),
        result: candidate.result.unwrap_or_default(),
        result_amount: candidate.result_amount.map(|v| v.abs()).unwrap_or(Decimal::ZERO),
        setup,
        notes: candidate.notes.unwrap_or_default(),
        entry_time: candidate.entry_time,
        exit_time: candidate.exit_time,
    })
}

/// Normalize a batch, returning the admitted records and how many were rejected.
pub fn normalize_batch(
    candidates: Vec<CandidateRecord>,
    options: &NormalizeOptions,
) -> (Vec<CanonicalRecord>, usize) {
    let mut records = Vec::with_capacity(candidates.len());
    let mut rejected = 0;

    for candidate in candidates {
        match normalize(candidate, options) {
            Ok(record) => records.push(record),
            Err(reason) => {
                trace!("Candidate rejected: {}", reason);
                rejected += 1;
            }
        }
    }

    (records, rejected)
}
