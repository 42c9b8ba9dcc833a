//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::debug;

use super::DocumentResult;
use crate::error::DocumentError;

/// Loads a PDF once and hands its bytes to the text extractor.
///
/// Documents encrypted with an empty password are decrypted and re-saved
/// so that `pdf-extract` can read them.
pub struct PdfTextReader {
    raw_data: Vec<u8>,
    page_count: usize,
}

impl PdfTextReader {
    pub fn new() -> Self {
        Self {
            raw_data: Vec::new(),
            page_count: 0,
        }
    }

    /// Load a PDF from bytes.
    pub fn load(&mut self, data: &[u8]) -> DocumentResult<()> {
        let mut doc = Document::load_mem(data).map_err(|e| DocumentError::Pdf(e.to_string()))?;

        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(DocumentError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| DocumentError::Pdf(format!("failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted;
        } else {
            self.raw_data = data.to_vec();
        }

        self.page_count = doc.get_pages().len();
        if self.page_count == 0 {
            return Err(DocumentError::NoPages);
        }

        debug!("Loaded PDF with {} pages", self.page_count);
        Ok(())
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Extract the text of every page as one stream.
    pub fn extract_text(&self) -> DocumentResult<String> {
        if self.raw_data.is_empty() {
            return Err(DocumentError::Pdf("no document loaded".to_string()));
        }
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| DocumentError::TextExtraction(e.to_string()))
    }
}

impl Default for PdfTextReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_before_load_fails() {
        let reader = PdfTextReader::new();
        assert_eq!(reader.page_count(), 0);
        assert!(matches!(reader.extract_text(), Err(DocumentError::Pdf(_))));
    }

    #[test]
    fn test_load_rejects_non_pdf_bytes() {
        let mut reader = PdfTextReader::new();
        assert!(matches!(
            reader.load(b"EUR/USD long"),
            Err(DocumentError::Pdf(_))
        ));
    }
}
