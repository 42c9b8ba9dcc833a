//! Tabular input: CSV and spreadsheet readers, the field synonym table and
//! the column mapper.

pub mod mapper;
pub mod reader;
pub mod synonyms;

pub use mapper::{ColumnMapping, TabularExtraction, extract_rows, map_columns};
pub use reader::read_table;
pub use synonyms::{LogicalField, SYNONYM_TABLE_VERSION, synonyms};

/// A header row plus data rows of raw cell strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TabularData {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
