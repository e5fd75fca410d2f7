//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Surveyup CLI - Convert survey documents into web-upload spreadsheets.
#[derive(Debug, Parser)]
#[command(name = "surveyup")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model to use for analysis
    #[arg(long, global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert a survey document into the upload spreadsheet
    Convert(ConvertArgs),

    /// Analyze a survey document and print the questions
    Analyze(AnalyzeArgs),

    /// Show how a document would be split into chunks
    Chunks(ChunksArgs),
}

/// Arguments for the convert command.
#[derive(Debug, Parser)]
pub struct ConvertArgs {
    /// Survey document (.txt, .docx, .xlsx, .pdf)
    pub input: PathBuf,

    /// Output spreadsheet (default: <input stem>_webup.xlsx next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the analyze command.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// Survey document (.txt, .docx, .xlsx, .pdf)
    pub input: PathBuf,
}

/// Arguments for the chunks command.
#[derive(Debug, Parser)]
pub struct ChunksArgs {
    /// Survey document (.txt, .docx, .xlsx, .pdf)
    pub input: PathBuf,

    /// Maximum chunk size in characters
    #[arg(long)]
    pub max_chunk_size: Option<usize>,

    /// Boundary search window in characters
    #[arg(long)]
    pub lookback: Option<usize>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}
