//! Batch command - import every file matching a pattern.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use tradex_core::{ImportPipeline, ImportSummary, Upload, detect_format};

use super::{build_pipeline, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern of input files
    #[arg(required = true)]
    input: String,

    /// Try AI-assisted extraction for documents before the pattern parser
    #[arg(long)]
    ai: bool,

    /// Append imported trades to this JSON file
    #[arg(long, value_name = "FILE.json")]
    store: Option<PathBuf>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of importing a single file.
struct FileResult {
    path: PathBuf,
    summary: Option<ImportSummary>,
    error: Option<String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Only files the pipeline can read
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| detect_format(name).is_ok())
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to import",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let pipeline = build_pipeline(config, args.store.as_ref(), args.ai);
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        match import_file(&pipeline, &path, args.ai).await {
            Ok(summary) => {
                debug!("{}: {}", path.display(), summary.message);
                results.push(FileResult {
                    path,
                    summary: Some(summary),
                    error: None,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to import {}: {}", path.display(), error_msg);
                    results.push(FileResult {
                        path,
                        summary: None,
                        error: Some(error_msg),
                    });
                } else {
                    error!("Failed to import {}: {}", path.display(), error_msg);
                    pb.abandon();
                    anyhow::bail!("Import failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    let successful: Vec<_> = results.iter().filter(|r| r.summary.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    let trades: usize = successful
        .iter()
        .filter_map(|r| r.summary.as_ref())
        .map(|s| s.count)
        .sum();
    let skipped: usize = successful
        .iter()
        .filter_map(|r| r.summary.as_ref())
        .map(|s| s.rejected)
        .sum();

    println!();
    println!(
        "{} Imported {} trades from {} files in {:?}",
        style("✓").green(),
        trades,
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed, {} rows skipped",
        style(successful.len()).green(),
        style(failed.len()).red(),
        skipped
    );

    for result in &successful {
        if let Some(summary) = &result.summary {
            println!("  - {}: {}", result.path.display(), summary.message);
        }
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    if let Some(store) = &args.store {
        println!("{} Stored in {}", style("ℹ").blue(), store.display());
    }

    Ok(())
}

async fn import_file(
    pipeline: &ImportPipeline,
    path: &Path,
    use_ai: bool,
) -> anyhow::Result<ImportSummary> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let bytes = fs::read(path)?;

    let upload = Upload::new(file_name, bytes).with_ai(use_ai);
    Ok(pipeline.import(&upload).await?)
}
