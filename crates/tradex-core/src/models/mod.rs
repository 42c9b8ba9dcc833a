//! Data models for trade imports.

pub mod config;
pub mod trade;

pub use config::{AiConfig, ExtractionConfig, TabularConfig, TradexConfig};
pub use trade::{CandidateRecord, CanonicalRecord, Direction, TradeResult};
