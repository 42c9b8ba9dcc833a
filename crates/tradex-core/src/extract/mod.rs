//! Free-text extractors and the fallback chain that runs them.

pub mod ai;
pub mod heuristic;

pub use ai::{AiExtractor, build_prompt, parse_response};
pub use heuristic::HeuristicExtractor;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::models::CandidateRecord;

/// Where the candidates of an import came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionSource {
    Tabular,
    Ai,
    Heuristic,
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionSource::Tabular => write!(f, "tabular"),
            ExtractionSource::Ai => write!(f, "ai"),
            ExtractionSource::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// Turns a text stream into candidate records.
#[async_trait]
pub trait TradeExtractor: Send + Sync {
    /// Label reported in the import summary.
    fn source(&self) -> ExtractionSource;

    async fn extract(&self, text: &str) -> Result<Vec<CandidateRecord>, ExtractError>;
}

/// Output of the first extractor in a chain that succeeded.
#[derive(Debug, Clone)]
pub struct ChainOutput {
    pub source: ExtractionSource,
    pub candidates: Vec<CandidateRecord>,
}

/// Ordered extractor strategies, tried in sequence until one succeeds.
///
/// Failures are logged and skipped. The chain is meant to end with an
/// extractor that cannot fail, such as [`HeuristicExtractor`].
#[derive(Default, Clone)]
pub struct ExtractionChain {
    extractors: Vec<Arc<dyn TradeExtractor>>,
}

impl ExtractionChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an extractor to the end of the chain.
    pub fn then(mut self, extractor: Arc<dyn TradeExtractor>) -> Self {
        self.extractors.push(extractor);
        self
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Run the extractors in order and return the first success.
    pub async fn run(&self, text: &str) -> Result<ChainOutput, ExtractError> {
        for extractor in &self.extractors {
            let source = extractor.source();
            match extractor.extract(text).await {
                Ok(candidates) => {
                    debug!("{} extractor produced {} candidates", source, candidates.len());
                    return Ok(ChainOutput { source, candidates });
                }
                Err(e) => warn!("{} extraction failed, falling back: {}", source, e),
            }
        }
        Err(ExtractError::Exhausted)
    }
}
