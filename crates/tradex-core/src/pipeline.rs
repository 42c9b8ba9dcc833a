//! Import orchestration: detect, extract, normalize, persist.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::document;
use crate::error::{ExtractError, ImportError, Result};
use crate::extract::{ExtractionChain, ExtractionSource, HeuristicExtractor, TradeExtractor};
use crate::format::{FileFormat, detect_format};
use crate::models::{CanonicalRecord, CandidateRecord, TradexConfig};
use crate::normalize::{NormalizeOptions, normalize_batch};
use crate::sink::RecordSink;
use crate::tabular::{extract_rows, read_table};

/// One uploaded file.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Caller asks for AI-assisted extraction of free text.
    pub use_ai: bool,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            use_ai: false,
        }
    }

    pub fn with_ai(mut self, use_ai: bool) -> Self {
        self.use_ai = use_ai;
        self
    }
}

/// Outcome of a successful import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    /// Records as returned by the sink.
    pub records: Vec<CanonicalRecord>,
    pub count: usize,
    /// Candidates that became records.
    pub accepted: usize,
    /// Rows or candidates dropped for lack of a pair and date.
    pub rejected: usize,
    pub source: ExtractionSource,
    pub message: String,
}

/// Failure categories reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnsupportedFormat,
    EmptyInput,
    Unreadable,
    EmptyExtraction,
    SinkError,
}

impl From<&ImportError> for FailureKind {
    fn from(error: &ImportError) -> Self {
        match error {
            ImportError::UnsupportedFormat(_) => FailureKind::UnsupportedFormat,
            ImportError::EmptyInput => FailureKind::EmptyInput,
            ImportError::Document(_)
            | ImportError::Tabular(_)
            | ImportError::Io(_)
            | ImportError::Config(_) => FailureKind::Unreadable,
            ImportError::NoRecords { .. } => FailureKind::EmptyExtraction,
            ImportError::Sink(_) => FailureKind::SinkError,
        }
    }
}

/// Endpoint-shaped response: `{data, count, message}` or `{error, kind}`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ImportResponse {
    Success {
        data: Vec<CanonicalRecord>,
        count: usize,
        message: String,
    },
    Failure {
        error: String,
        kind: FailureKind,
    },
}

impl From<Result<ImportSummary>> for ImportResponse {
    fn from(result: Result<ImportSummary>) -> Self {
        match result {
            Ok(summary) => ImportResponse::Success {
                data: summary.records,
                count: summary.count,
                message: summary.message,
            },
            Err(error) => ImportResponse::Failure {
                kind: FailureKind::from(&error),
                error: error.to_string(),
            },
        }
    }
}

/// Normalized records ready for the sink.
#[derive(Debug, Clone)]
pub struct PreparedImport {
    pub records: Vec<CanonicalRecord>,
    pub rejected: usize,
    pub source: ExtractionSource,
}

/// Runs uploads through detection, extraction, normalization and the sink.
pub struct ImportPipeline {
    config: TradexConfig,
    sink: Arc<dyn RecordSink>,
    ai: Option<Arc<dyn TradeExtractor>>,
    reference_date: Option<NaiveDate>,
}

impl ImportPipeline {
    pub fn new(config: TradexConfig, sink: Arc<dyn RecordSink>) -> Self {
        Self {
            config,
            sink,
            ai: None,
            reference_date: None,
        }
    }

    /// Register the AI extractor tried before the heuristic one.
    pub fn with_ai_extractor(mut self, extractor: Arc<dyn TradeExtractor>) -> Self {
        self.ai = Some(extractor);
        self
    }

    /// Fix the date used for relative dates and pair-only records.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// True when uploads asking for AI extraction will get it.
    pub fn ai_available(&self) -> bool {
        self.config.ai.enabled && self.ai.is_some()
    }

    pub fn config(&self) -> &TradexConfig {
        &self.config
    }

    /// Import an upload and persist the surviving records in one batch.
    pub async fn import(&self, upload: &Upload) -> Result<ImportSummary> {
        let prepared = self.prepare(upload).await?;
        let accepted = prepared.records.len();

        let records = self.sink.insert_batch(prepared.records).await?;
        let count = records.len();
        info!(
            "Imported {} trades from {} via {} extraction ({} rejected)",
            count, upload.file_name, prepared.source, prepared.rejected
        );

        Ok(ImportSummary {
            records,
            count,
            accepted,
            rejected: prepared.rejected,
            source: prepared.source,
            message: summary_message(count, prepared.rejected, prepared.source),
        })
    }

    /// Everything [`import`](Self::import) does except persisting.
    pub async fn prepare(&self, upload: &Upload) -> Result<PreparedImport> {
        let format = detect_format(&upload.file_name)?;
        if upload.bytes.is_empty() {
            return Err(ImportError::EmptyInput);
        }
        debug!("{} detected as {}", upload.file_name, format);

        let (source, candidates, mut rejected) = match format {
            FileFormat::Tabular(kind) => {
                let table = read_table(kind, &upload.bytes, &self.config.tabular)?;
                if table.headers.is_empty() || table.rows.is_empty() {
                    return Err(ImportError::EmptyInput);
                }
                let extraction = extract_rows(&table);
                (ExtractionSource::Tabular, extraction.candidates, extraction.rejected)
            }
            _ => {
                let text = document::read_text(format, &upload.bytes)?;
                let (source, candidates) = self.extract_free_text(&text, upload.use_ai).await?;
                (source, candidates, 0)
            }
        };

        let (records, normalize_rejected) = normalize_batch(candidates, &self.normalize_options());
        rejected += normalize_rejected;

        if records.is_empty() {
            return Err(ImportError::NoRecords { rejected });
        }

        Ok(PreparedImport {
            records,
            rejected,
            source,
        })
    }

    async fn extract_free_text(
        &self,
        text: &str,
        use_ai: bool,
    ) -> Result<(ExtractionSource, Vec<CandidateRecord>)> {
        let mut chain = ExtractionChain::new();
        if use_ai {
            match &self.ai {
                Some(ai) if self.config.ai.enabled => chain = chain.then(Arc::clone(ai)),
                _ => warn!("AI extraction requested but not configured, using heuristics"),
            }
        }

        let mut heuristic = HeuristicExtractor::new(&self.config.extraction);
        if let Some(date) = self.reference_date {
            heuristic = heuristic.with_reference_date(date);
        }
        chain = chain.then(Arc::new(heuristic));

        match chain.run(text).await {
            Ok(output) => Ok((output.source, output.candidates)),
            Err(ExtractError::Exhausted) | Err(ExtractError::Ai(_)) => {
                Err(ImportError::NoRecords { rejected: 0 })
            }
        }
    }

    fn normalize_options(&self) -> NormalizeOptions {
        let options = NormalizeOptions::from_config(&self.config.extraction);
        match self.reference_date {
            Some(date) => options.with_reference_date(date),
            None => options,
        }
    }
}

fn summary_message(count: usize, rejected: usize, source: ExtractionSource) -> String {
    let method = match source {
        ExtractionSource::Tabular => "column mapping",
        ExtractionSource::Ai => "AI-assisted parsing",
        ExtractionSource::Heuristic => "pattern parsing",
    };
    let mut message = format!("{} trade(s) imported successfully using {}", count, method);
    if rejected > 0 {
        message.push_str(&format!(", {} skipped", rejected));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::CompletionClient;
    use crate::error::AiError;
    use crate::extract::AiExtractor;
    use crate::models::{Direction, TradeResult};
    use crate::sink::MemorySink;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    struct FixedReply(std::result::Result<&'static str, &'static str>);

    #[async_trait]
    impl CompletionClient for FixedReply {
        async fn complete(&self, _prompt: &str) -> std::result::Result<String, AiError> {
            self.0
                .map(str::to_string)
                .map_err(|e| AiError::Network(e.to_string()))
        }
    }

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn pipeline(sink: Arc<MemorySink>) -> ImportPipeline {
        ImportPipeline::new(TradexConfig::default(), sink).with_reference_date(reference())
    }

    const JOURNAL: &str = "EUR/USD 2024-01-15 long\nriesgo 1% ganancia 2%\n\nGBP/USD Short, riesgo 1.5%, r:r 2, ganancia 3%\n";

    #[tokio::test]
    async fn test_csv_import_scenario() {
        let sink = Arc::new(MemorySink::new());
        let upload = Upload::new(
            "trades.csv",
            b"Par,Fecha,Resultado,Cantidad\nEUR/USD,15/01/2024,loss,-5.2\n,,win,1\n".to_vec(),
        );

        let summary = pipeline(sink.clone()).import(&upload).await.unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.source, ExtractionSource::Tabular);

        let record = &sink.records()[0];
        assert_eq!(record.pair, "EUR/USD");
        assert_eq!(record.trade_date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(record.result, TradeResult::Loss);
        assert_eq!(record.result_amount, Decimal::from_str("5.2").unwrap());
        assert_eq!(record.direction, Direction::Long);
        assert_eq!(record.setup, "Imported");
    }

    #[tokio::test]
    async fn test_text_import_uses_heuristics() {
        let sink = Arc::new(MemorySink::new());
        let upload = Upload::new("journal.txt", JOURNAL.as_bytes().to_vec());

        let summary = pipeline(sink.clone()).import(&upload).await.unwrap();
        assert_eq!(summary.source, ExtractionSource::Heuristic);
        assert_eq!(summary.count, 2);
        assert_eq!(sink.batch_count(), 1);

        let records = sink.records();
        assert_eq!(records[1].pair, "GBP/USD");
        assert_eq!(records[1].trade_date, reference());
        assert_eq!(records[1].risk_reward, Some(Decimal::from(2)));
    }

    #[tokio::test]
    async fn test_ai_failure_equals_heuristic_output() {
        let heuristic_sink = Arc::new(MemorySink::new());
        let upload = Upload::new("journal.txt", JOURNAL.as_bytes().to_vec());
        pipeline(heuristic_sink.clone()).import(&upload).await.unwrap();

        let fallback_sink = Arc::new(MemorySink::new());
        let summary = pipeline(fallback_sink.clone())
            .with_ai_extractor(Arc::new(AiExtractor::new(FixedReply(Err("timeout")))))
            .import(&upload.clone().with_ai(true))
            .await
            .unwrap();

        assert_eq!(summary.source, ExtractionSource::Heuristic);
        assert_eq!(fallback_sink.records(), heuristic_sink.records());
    }

    #[tokio::test]
    async fn test_ai_success_is_used_when_requested() {
        let reply = r#"[{"pair": "USD/JPY", "trade_date": "2024-02-01", "direction": "Short"}]"#;
        let sink = Arc::new(MemorySink::new());
        let pipeline = pipeline(sink.clone())
            .with_ai_extractor(Arc::new(AiExtractor::new(FixedReply(Ok(reply)))));
        let upload = Upload::new("journal.txt", JOURNAL.as_bytes().to_vec());

        let summary = pipeline.import(&upload.clone().with_ai(true)).await.unwrap();
        assert_eq!(summary.source, ExtractionSource::Ai);
        assert_eq!(sink.records()[0].pair, "USD/JPY");

        // Not requested: heuristics only
        let summary = pipeline.import(&upload).await.unwrap();
        assert_eq!(summary.source, ExtractionSource::Heuristic);
    }

    #[tokio::test]
    async fn test_ai_reply_without_identity_falls_back() {
        let reply = r#"[{"direction": "Long", "notes": "something"}]"#;
        let sink = Arc::new(MemorySink::new());
        let upload = Upload::new("journal.txt", b"EUR/USD 2024-01-15 long".to_vec()).with_ai(true);

        let summary = pipeline(sink.clone())
            .with_ai_extractor(Arc::new(AiExtractor::new(FixedReply(Ok(reply)))))
            .import(&upload)
            .await
            .unwrap();

        assert_eq!(summary.source, ExtractionSource::Heuristic);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.rejected, 0);
        assert_eq!(sink.records()[0].pair, "EUR/USD");
    }

    #[tokio::test]
    async fn test_rejections_before_extraction() {
        let sink = Arc::new(MemorySink::new());
        let pipeline = pipeline(sink.clone());

        let error = pipeline
            .import(&Upload::new("chart.png", vec![1, 2, 3]))
            .await
            .unwrap_err();
        assert_eq!(FailureKind::from(&error), FailureKind::UnsupportedFormat);

        let error = pipeline
            .import(&Upload::new("empty.txt", Vec::new()))
            .await
            .unwrap_err();
        assert_eq!(FailureKind::from(&error), FailureKind::EmptyInput);

        let error = pipeline
            .import(&Upload::new("headers.csv", b"Par,Fecha,Resultado\n,,\n".to_vec()))
            .await
            .unwrap_err();
        assert_eq!(FailureKind::from(&error), FailureKind::EmptyInput);
        assert_eq!(sink.batch_count(), 0);
    }

    #[tokio::test]
    async fn test_no_survivors_is_empty_extraction() {
        let sink = Arc::new(MemorySink::new());
        let upload = Upload::new("notes.txt", b"Nothing but a long line of prose".to_vec());

        let error = pipeline(sink.clone()).import(&upload).await.unwrap_err();
        assert!(matches!(error, ImportError::NoRecords { .. }));
        assert_eq!(sink.batch_count(), 0);
    }

    #[tokio::test]
    async fn test_sink_failure_is_fatal() {
        let sink = Arc::new(MemorySink::rejecting("constraint violation"));
        let upload = Upload::new("journal.txt", JOURNAL.as_bytes().to_vec());

        let result = pipeline(sink.clone()).import(&upload).await;
        let response = ImportResponse::from(result);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["kind"], "sink_error");
        assert!(json["error"].as_str().unwrap().contains("constraint violation"));
        assert!(sink.records().is_empty());
    }

    #[tokio::test]
    async fn test_success_response_shape() {
        let sink = Arc::new(MemorySink::new());
        let upload = Upload::new("journal.txt", JOURNAL.as_bytes().to_vec());

        let response = ImportResponse::from(pipeline(sink).import(&upload).await);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["count"], 2);
        assert_eq!(json["data"].as_array().unwrap().len(), 2);
        assert!(json["message"].as_str().unwrap().starts_with("2 trade(s)"));
    }
}
