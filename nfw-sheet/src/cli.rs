use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "nfw-sheet")]
#[command(about = "Convert network firewall policies to and from spreadsheets")]
pub struct Cli {
    /// Optional TOML config (sheet names, artifact names, collision policy).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Flatten a policy snapshot directory into a CSV workbook.
    Export(ExportArgs),
    /// Rebuild submission-ready JSON documents from a workbook.
    Import(ImportArgs),
    /// Reconstruct a workbook and report diagnostics without writing anything.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Directory holding `<category>_output.json` dumps.
    pub snapshot_dir: PathBuf,
    /// Directory that receives one CSV file per sheet.
    #[arg(long, short)]
    pub output: PathBuf,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Workbook: a directory of CSV files, or an xlsx/xls/ods file.
    pub workbook: PathBuf,
    /// Directory that receives the JSON documents.
    #[arg(long, short)]
    pub output: PathBuf,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Exit non-zero when any row diagnostic was recorded.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Workbook: a directory of CSV files, or an xlsx/xls/ods file.
    pub workbook: PathBuf,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Exit non-zero when any row diagnostic was recorded.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
