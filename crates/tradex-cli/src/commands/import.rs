//! Import command - extract trades from a single file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use tradex_core::{CanonicalRecord, FailureKind, ImportResponse, Upload};

use super::{build_pipeline, load_config};

/// Arguments for the import command.
#[derive(Args)]
pub struct ImportArgs {
    /// Input file (csv, xlsx, xls, ods, pdf, docx, txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Try AI-assisted extraction for documents before the pattern parser
    #[arg(long)]
    ai: bool,

    /// Append imported trades to this JSON file
    #[arg(long, value_name = "FILE.json")]
    store: Option<PathBuf>,

    /// Extract and normalize without storing anything
    #[arg(long)]
    dry_run: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Endpoint-style JSON response
    Json,
    /// One CSV row per trade
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ImportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Importing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Reading file...");
    pb.set_position(10);
    let file_name = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let bytes = fs::read(&args.input)?;
    let upload = Upload::new(file_name, bytes).with_ai(args.ai);

    let pipeline = build_pipeline(config, args.store.as_ref(), args.ai);

    pb.set_message("Extracting trades...");
    pb.set_position(40);

    let response = if args.dry_run {
        pipeline.prepare(&upload).await.map(|prepared| {
            let count = prepared.records.len();
            ImportResponse::Success {
                message: format!(
                    "{} trade(s) found using {} extraction, nothing stored ({} skipped)",
                    count, prepared.source, prepared.rejected
                ),
                data: prepared.records,
                count,
            }
        })
    } else {
        pipeline
            .import(&upload)
            .await
            .map(|summary| ImportResponse::Success {
                data: summary.records,
                count: summary.count,
                message: summary.message,
            })
    };

    let response = match response {
        Ok(response) => {
            pb.finish_with_message("Done");
            response
        }
        Err(e) => {
            pb.abandon_with_message("Failed");
            if matches!(args.format, OutputFormat::Json) {
                let failure = ImportResponse::Failure {
                    kind: FailureKind::from(&e),
                    error: e.to_string(),
                };
                println!("{}", serde_json::to_string_pretty(&failure)?);
            }
            return Err(e.into());
        }
    };

    let ImportResponse::Success { data, message, .. } = &response else {
        anyhow::bail!("Unexpected import response");
    };

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&response)?,
        OutputFormat::Csv => format_csv(data)?,
        OutputFormat::Text => format_text(data, message),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    eprintln!("{} {}", style("✓").green(), message);
    if let Some(store) = &args.store {
        if !args.dry_run {
            eprintln!("{} Stored in {}", style("ℹ").blue(), store.display());
        }
    }

    debug!("Total import time: {:?}", start.elapsed());

    Ok(())
}

const CSV_HEADER: [&str; 11] = [
    "pair",
    "trade_date",
    "direction",
    "risk_percentage",
    "risk_reward",
    "result",
    "result_amount",
    "setup",
    "notes",
    "entry_time",
    "exit_time",
];

fn csv_row(record: &CanonicalRecord) -> [String; 11] {
    [
        record.pair.clone(),
        record.trade_date.format("%Y-%m-%d").to_string(),
        record.direction.to_string(),
        record.risk_percentage.normalize().to_string(),
        record
            .risk_reward
            .map(|rr| rr.normalize().to_string())
            .unwrap_or_default(),
        record.result.to_string(),
        record.result_amount.normalize().to_string(),
        record.setup.clone(),
        record.notes.clone(),
        record.entry_time.clone().unwrap_or_default(),
        record.exit_time.clone().unwrap_or_default(),
    ]
}

fn format_csv(records: &[CanonicalRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(CSV_HEADER)?;
    for record in records {
        wtr.write_record(csv_row(record))?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(records: &[CanonicalRecord], message: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", message));

    for (i, record) in records.iter().enumerate() {
        output.push('\n');
        output.push_str(&format!(
            "Trade {}: {} {} {}\n",
            i + 1,
            record.pair,
            record.trade_date,
            record.direction
        ));
        output.push_str(&format!(
            "  Result: {} {}\n",
            record.result,
            record.result_amount.normalize()
        ));
        output.push_str(&format!("  Risk:   {}%", record.risk_percentage.normalize()));
        if let Some(rr) = record.risk_reward {
            output.push_str(&format!("  R:R {}", rr.normalize()));
        }
        output.push('\n');
        output.push_str(&format!("  Setup:  {}\n", record.setup));

        match (&record.entry_time, &record.exit_time) {
            (Some(entry), Some(exit)) => output.push_str(&format!("  Time:   {} - {}\n", entry, exit)),
            (Some(entry), None) => output.push_str(&format!("  Entry:  {}\n", entry)),
            (None, Some(exit)) => output.push_str(&format!("  Exit:   {}\n", exit)),
            (None, None) => {}
        }

        if !record.notes.is_empty() {
            output.push_str(&format!("  Notes:  {}\n", record.notes));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use tradex_core::{Direction, TradeResult};

    fn record() -> CanonicalRecord {
        CanonicalRecord {
            pair: "EUR/USD".to_string(),
            trade_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            direction: Direction::Short,
            risk_percentage: Decimal::ONE,
            risk_reward: Some(Decimal::from(2)),
            result: TradeResult::Win,
            result_amount: Decimal::new(520, 2),
            setup: "Breakout".to_string(),
            notes: "clean, fast move".to_string(),
            entry_time: Some("09:30".to_string()),
            exit_time: None,
        }
    }

    #[test]
    fn test_csv_output_has_header_and_row() {
        let csv = format_csv(&[record()]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("pair,trade_date,direction"));
        assert_eq!(
            lines[1],
            "EUR/USD,2024-01-15,Short,1,2,win,5.2,Breakout,\"clean, fast move\",09:30,"
        );
    }

    #[test]
    fn test_text_output_lists_trades() {
        let text = format_text(&[record()], "1 trade(s) imported");

        assert!(text.starts_with("1 trade(s) imported\n"));
        assert!(text.contains("Trade 1: EUR/USD 2024-01-15 Short"));
        assert!(text.contains("Result: win 5.2"));
        assert!(text.contains("Entry:  09:30"));
        assert!(text.contains("Notes:  clean, fast move"));
    }
}
