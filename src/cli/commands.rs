//! CLI arguments

use clap::Parser;
use std::path::PathBuf;

/// Download paginated World Bank indicator data
#[derive(Parser, Debug)]
#[command(name = "pagewise")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML or JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Country code; repeat for several countries
    #[arg(short, long = "country")]
    pub countries: Vec<String>,

    /// Indicator identifier; repeat for several indicators
    #[arg(short, long = "indicator")]
    pub indicators: Vec<String>,

    /// Date filter such as 2010:2020; repeatable
    #[arg(short, long = "date")]
    pub dates: Vec<String>,

    /// Override the API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Stop after this many records
    #[arg(long)]
    pub limit: Option<usize>,

    /// Store records in this DuckDB file instead of printing them
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Output format for printed records
    #[arg(short, long, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one record per line)
    Json,
    /// Human-readable output
    Pretty,
}
