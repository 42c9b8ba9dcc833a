//! Config command - inspect and create the import configuration.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use tradex_core::TradexConfig;
use tradex_core::tabular::{LogicalField, SYNONYM_TABLE_VERSION, synonyms};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration and what it enables
    Show(ShowArgs),

    /// Write a configuration file with the import defaults
    Init(InitArgs),

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct ShowArgs {
    /// Print only the configuration as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show(show_args) => show_config(show_args, config_path),
        ConfigCommand::Init(init_args) => init_config(init_args),
        ConfigCommand::Path => show_path(),
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tradex")
        .join("config.json")
}

/// `--config` wins, then the per-user file, then built-in defaults.
fn effective_config(config_path: Option<&str>) -> anyhow::Result<(TradexConfig, Option<PathBuf>)> {
    if let Some(path) = config_path {
        let config = super::load_config(Some(path))?;
        return Ok((config, Some(PathBuf::from(path))));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        let config = TradexConfig::from_file(&default_path)?;
        Ok((config, Some(default_path)))
    } else {
        Ok((TradexConfig::default(), None))
    }
}

fn show_config(args: ShowArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let (config, source) = effective_config(config_path)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("{}", describe(&config, source.as_deref()));
    Ok(())
}

fn describe(config: &TradexConfig, source: Option<&Path>) -> String {
    let mut out = String::new();

    match source {
        Some(path) => out.push_str(&format!("Loaded from: {}\n", path.display())),
        None => out.push_str("Loaded from: built-in defaults\n"),
    }

    out.push_str("\nExtraction\n");
    out.push_str(&format!("  default setup:    {}\n", config.extraction.default_setup));
    out.push_str(&format!("  unknown pair:     {}\n", config.extraction.unknown_pair));
    out.push_str(&format!(
        "  min note length:  {}\n",
        config.extraction.min_note_length
    ));

    out.push_str("\nSpreadsheets\n");
    out.push_str(&format!(
        "  sheet:            {}\n",
        config.tabular.sheet.as_deref().unwrap_or("first")
    ));
    out.push_str(&format!(
        "  csv delimiter:    {}\n",
        config
            .tabular
            .csv_delimiter
            .map(|d| format!("{:?}", d))
            .unwrap_or_else(|| "detected".to_string())
    ));
    let synonym_count: usize = LogicalField::ALL.iter().map(|f| synonyms(*f).len()).sum();
    out.push_str(&format!(
        "  synonym table:    v{} ({} header synonyms over {} fields)\n",
        SYNONYM_TABLE_VERSION,
        synonym_count,
        LogicalField::ALL.len()
    ));

    out.push_str("\nAI extraction\n");
    out.push_str(&format!("  model:            {}\n", config.ai.model));
    let has_key = config.ai.api_key().is_some();
    out.push_str(&format!(
        "  api key:          {} ({})\n",
        config.ai.api_key_env,
        if has_key { "set" } else { "not set" }
    ));
    let available = config.ai.enabled && has_key;
    out.push_str(&format!(
        "  --ai:             {}\n",
        if available {
            "available"
        } else {
            "falls back to pattern parsing"
        }
    ));

    out
}

fn init_config(args: InitArgs) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(default_config_path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    TradexConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn show_path() -> anyhow::Result<()> {
    let config_path = default_config_path();

    println!("Configuration file: {}", config_path.display());

    if config_path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'tradex config init' to create a configuration file.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_reports_key_and_synonym_table() {
        let mut config = TradexConfig::default();
        config.ai.api_key_env = "TRADEX_DESCRIBE_KEY_THAT_IS_NEVER_SET".to_string();
        config.tabular.csv_delimiter = Some(';');

        let text = describe(&config, None);

        assert!(text.contains("Loaded from: built-in defaults"));
        assert!(text.contains("csv delimiter:    ';'"));
        assert!(text.contains(&format!("synonym table:    v{}", SYNONYM_TABLE_VERSION)));
        assert!(text.contains("TRADEX_DESCRIBE_KEY_THAT_IS_NEVER_SET (not set)"));
        assert!(text.contains("falls back to pattern parsing"));
    }

    #[test]
    fn test_describe_names_config_source() {
        let text = describe(&TradexConfig::default(), Some(Path::new("/tmp/tradex.json")));
        assert!(text.contains("Loaded from: /tmp/tradex.json"));
        assert!(text.contains("default setup:    Imported"));
    }
}
