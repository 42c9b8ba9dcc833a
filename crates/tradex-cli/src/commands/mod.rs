//! Subcommands and the setup they share.

pub mod batch;
pub mod config;
pub mod import;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use tradex_core::sink::{JsonFileSink, MemorySink, RecordSink};
use tradex_core::{AiExtractor, GeminiClient, ImportPipeline, TradexConfig};

/// Load the config file given with `--config`, or the defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<TradexConfig> {
    match config_path {
        Some(path) => TradexConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path, e)),
        None => Ok(TradexConfig::default()),
    }
}

/// Build a pipeline persisting into `store`, or into memory when unset.
///
/// The AI extractor is attached only when asked for and an API key is
/// available; otherwise free text goes straight to the heuristics.
pub fn build_pipeline(
    config: TradexConfig,
    store: Option<&PathBuf>,
    use_ai: bool,
) -> ImportPipeline {
    let sink: Arc<dyn RecordSink> = match store {
        Some(path) => {
            debug!("Storing records in {}", path.display());
            Arc::new(JsonFileSink::new(path))
        }
        None => Arc::new(MemorySink::new()),
    };

    let client = if use_ai {
        match GeminiClient::from_config(&config.ai) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("AI extraction unavailable: {}", e);
                None
            }
        }
    } else {
        None
    };

    let pipeline = ImportPipeline::new(config, sink);
    match client {
        Some(client) => pipeline.with_ai_extractor(Arc::new(AiExtractor::new(client))),
        None => pipeline,
    }
}
