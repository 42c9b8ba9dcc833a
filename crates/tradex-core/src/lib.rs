//! Core library for importing trade journals.
//!
//! This crate provides:
//! - Format detection and text readers for PDF, DOCX and plain text
//! - CSV/spreadsheet readers with fuzzy column mapping (Spanish and English headers)
//! - Heuristic and AI-assisted extraction of trades from free text
//! - Normalization into canonical trade records and batch persistence

pub mod ai;
pub mod document;
pub mod error;
pub mod extract;
pub mod format;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod rules;
pub mod sink;
pub mod tabular;

pub use ai::CompletionClient;
#[cfg(feature = "gemini")]
pub use ai::GeminiClient;
pub use error::{AiError, DocumentError, ExtractError, ImportError, Result, SinkError, TabularError};
pub use extract::{
    AiExtractor, ExtractionChain, ExtractionSource, HeuristicExtractor, TradeExtractor,
};
pub use format::{FileFormat, TabularKind, detect_format};
pub use models::{CandidateRecord, CanonicalRecord, Direction, TradeResult, TradexConfig};
pub use normalize::{NormalizeOptions, Rejection, normalize, normalize_batch};
pub use pipeline::{FailureKind, ImportPipeline, ImportResponse, ImportSummary, Upload};
pub use sink::{JsonFileSink, MemorySink, RecordSink};
