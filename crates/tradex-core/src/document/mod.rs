//! Text readers for documents: PDF, DOCX and plain text.

mod docx;
mod pdf;

pub use docx::extract_docx_text;
pub use pdf::PdfTextReader;

use tracing::debug;

use crate::error::{DocumentError, ImportError, Result};
use crate::format::FileFormat;

/// Result type for document operations.
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;

/// Reduce a free-text document to a single text stream.
///
/// Returns [`ImportError::EmptyInput`] when the document holds no visible
/// text, and [`ImportError::UnsupportedFormat`] for tabular formats.
pub fn read_text(format: FileFormat, bytes: &[u8]) -> Result<String> {
    let text = match format {
        FileFormat::Pdf => {
            let mut reader = PdfTextReader::new();
            reader.load(bytes)?;
            reader.extract_text()?
        }
        FileFormat::Word => extract_docx_text(bytes)?,
        FileFormat::PlainText => decode_plain_text(bytes),
        FileFormat::Tabular(_) => {
            return Err(ImportError::UnsupportedFormat(format!(
                "{} is not a text document",
                format
            )));
        }
    };

    if text.trim().is_empty() {
        return Err(ImportError::EmptyInput);
    }

    debug!("Read {} chars of {} text", text.len(), format);
    Ok(text)
}

/// Decode bytes as UTF-8, replacing invalid sequences and dropping a BOM.
pub fn decode_plain_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
