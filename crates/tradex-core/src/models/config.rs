//! Configuration structures for the import pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the tradex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TradexConfig {
    /// Extraction and normalization configuration.
    pub extraction: ExtractionConfig,

    /// Spreadsheet and CSV reading configuration.
    pub tabular: TabularConfig,

    /// AI-assisted extraction configuration.
    pub ai: AiConfig,
}

/// Extraction and normalization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Unmatched lines shorter than this never become notes.
    pub min_note_length: usize,

    /// Setup label given to records that carry none.
    pub default_setup: String,

    /// Pair given to records that only have a date.
    pub unknown_pair: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_note_length: 10,
            default_setup: "Imported".to_string(),
            unknown_pair: "UNKNOWN".to_string(),
        }
    }
}

/// Spreadsheet and CSV settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TabularConfig {
    /// Sheet to read from workbooks. The first sheet when unset.
    pub sheet: Option<String>,

    /// CSV delimiter. Detected from the header line when unset.
    pub csv_delimiter: Option<char>,
}

/// AI-assisted extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Allow AI extraction when an upload asks for it.
    pub enabled: bool,

    /// Model name passed to the service.
    pub model: String,

    /// Service base URL.
    pub base_url: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// HTTP timeout in seconds (0 = client default).
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gemini-2.5-flash-lite".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            temperature: 0.2,
            timeout_secs: 60,
        }
    }
}

impl AiConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

impl TradexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
