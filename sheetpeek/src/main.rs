use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sheetpeek_core::{Inspector, InspectorConfig, reader};
use std::path::PathBuf;

mod formatter;

#[derive(Parser)]
#[command(name = "sheetpeek")]
#[command(about = "Print the header row of each mapped worksheet in an XLSX archive", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the workbook to inspect
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Map every sheet from the workbook's own registry instead of the
    /// configured mapping
    #[arg(long)]
    discover: bool,

    /// Row number to report as the header row
    #[arg(long, value_name = "N")]
    header_row: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// One line per mapped sheet
    Human,
    /// JSON output for scripting
    Json,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        InspectorConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        // Try to load default config from current directory if it exists
        let default_config_path = PathBuf::from("sheetpeek.toml");
        if default_config_path.exists() {
            InspectorConfig::from_file(&default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })?
        } else {
            InspectorConfig::default()
        }
    };

    if let Some(header_row) = cli.header_row {
        config.header_row = header_row;
    }

    // With discovery the mapping comes from the workbook itself, so
    // validation waits for it; otherwise the configuration is checked
    // before the archive is touched.
    if !cli.discover {
        config.validate().context("Invalid configuration")?;
    }

    let mut archive = reader::open_archive(&cli.file)?;

    // The workbook's own sheet registry replaces the configured mapping
    if cli.discover {
        config.sheets = reader::discover_sheet_map(&mut archive)
            .with_context(|| format!("Failed to discover sheets in {}", cli.file.display()))?;
        config.validate().context("Invalid configuration")?;
    }

    let reports = Inspector::with_config(config)
        .inspect_archive(&mut archive)
        .with_context(|| format!("Failed to inspect file: {}", cli.file.display()))?;

    match cli.format {
        OutputFormat::Human => {
            formatter::print_human(&reports);
        }
        OutputFormat::Json => {
            formatter::print_json(&cli.file, &reports)?;
        }
    }

    Ok(())
}
