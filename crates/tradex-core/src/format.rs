//! File format detection by extension.

use std::fmt;
use std::path::Path;

use crate::error::{ImportError, Result};

/// Spreadsheet-like formats read row by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularKind {
    Csv,
    Xlsx,
    Xls,
    Ods,
}

/// How an uploaded file is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Rows under a header line.
    Tabular(TabularKind),
    /// PDF document reduced to text.
    Pdf,
    /// Word document reduced to text.
    Word,
    /// Text as-is.
    PlainText,
}

impl FileFormat {
    pub fn is_tabular(&self) -> bool {
        matches!(self, FileFormat::Tabular(_))
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Tabular(TabularKind::Csv) => write!(f, "csv"),
            FileFormat::Tabular(TabularKind::Xlsx) => write!(f, "xlsx"),
            FileFormat::Tabular(TabularKind::Xls) => write!(f, "xls"),
            FileFormat::Tabular(TabularKind::Ods) => write!(f, "ods"),
            FileFormat::Pdf => write!(f, "pdf"),
            FileFormat::Word => write!(f, "docx"),
            FileFormat::PlainText => write!(f, "text"),
        }
    }
}

/// Classify a file name by its extension. Content is never inspected.
pub fn detect_format(file_name: &str) -> Result<FileFormat> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| ImportError::UnsupportedFormat(file_name.to_string()))?;

    let format = match extension.as_str() {
        "csv" => FileFormat::Tabular(TabularKind::Csv),
        "xlsx" | "xlsm" => FileFormat::Tabular(TabularKind::Xlsx),
        "xls" => FileFormat::Tabular(TabularKind::Xls),
        "ods" => FileFormat::Tabular(TabularKind::Ods),
        "pdf" => FileFormat::Pdf,
        "docx" => FileFormat::Word,
        "txt" | "log" | "md" => FileFormat::PlainText,
        other => return Err(ImportError::UnsupportedFormat(format!(".{}", other))),
    };

    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_known_formats() {
        assert_eq!(
            detect_format("trades.xlsx").unwrap(),
            FileFormat::Tabular(TabularKind::Xlsx)
        );
        assert_eq!(
            detect_format("journal.csv").unwrap(),
            FileFormat::Tabular(TabularKind::Csv)
        );
        assert_eq!(detect_format("report.pdf").unwrap(), FileFormat::Pdf);
        assert_eq!(detect_format("notes.docx").unwrap(), FileFormat::Word);
        assert_eq!(detect_format("NOTES.TXT").unwrap(), FileFormat::PlainText);
        assert!(detect_format("book.ODS").unwrap().is_tabular());
    }

    #[test]
    fn test_detect_rejects_unknown_extensions() {
        assert!(matches!(
            detect_format("image.png"),
            Err(ImportError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            detect_format("README"),
            Err(ImportError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            detect_format("legacy.doc"),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }
}
