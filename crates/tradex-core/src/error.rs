//! Error types for the tradex-core library.

use thiserror::Error;

/// Main error type for a trade import.
///
/// Every variant is fatal for the whole upload. Per-row and per-candidate
/// rejections are not errors; they are counted in the import summary.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The file extension is not one the pipeline can read.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// No text or rows could be obtained from the file.
    #[error("no data could be extracted from the file")]
    EmptyInput,

    /// Document text extraction failed.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Spreadsheet reading failed.
    #[error("tabular error: {0}")]
    Tabular(#[from] TabularError),

    /// Extraction ran but no candidate survived normalization.
    #[error("no valid trades found in the file ({rejected} rejected)")]
    NoRecords { rejected: usize },

    /// The record sink refused the batch.
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to reading text out of PDF, DOCX and plain text files.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Pdf(String),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Failed to extract text from a PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The DOCX archive or its XML could not be read.
    #[error("failed to read DOCX: {0}")]
    Docx(String),
}

/// Errors related to reading CSV and spreadsheet files.
#[derive(Error, Debug)]
pub enum TabularError {
    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook could not be opened or read.
    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),

    /// The workbook has no sheet to read.
    #[error("workbook has no sheets")]
    NoSheets,

    /// The configured sheet does not exist.
    #[error("sheet not found: {0}")]
    SheetNotFound(String),
}

/// Errors from the AI-assisted extractor and its completion client.
///
/// None of these are retried; the pipeline falls back to heuristic extraction.
#[derive(Error, Debug)]
pub enum AiError {
    /// No API key or client is configured.
    #[error("AI extraction is not configured: {0}")]
    NotConfigured(String),

    /// Transport failure talking to the service.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("AI service returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The reply did not contain a parseable JSON array.
    #[error("malformed AI response: {0}")]
    MalformedResponse(String),

    /// The reply parsed but held no trades.
    #[error("AI response contained no trades")]
    EmptyResult,
}

#[cfg(feature = "gemini")]
impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        AiError::Network(err.without_url().to_string())
    }
}

/// Failure of one free-text extractor.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("AI extraction failed: {0}")]
    Ai(#[from] AiError),

    /// No extractor in the chain produced a result.
    #[error("no extractor succeeded")]
    Exhausted,
}

/// Errors raised by a record sink during the batch insert.
#[derive(Error, Debug)]
pub enum SinkError {
    /// The sink rejected the batch (e.g. a constraint violation).
    #[error("batch rejected: {0}")]
    Rejected(String),

    /// Serialization of the batch failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error while persisting.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the tradex library.
pub type Result<T> = std::result::Result<T, ImportError>;
