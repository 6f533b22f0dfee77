use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{render::ReportFormat, report::REPORT_YEAR};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Load headerless employee, job and department CSV files and report on hiring",
    long_about = None
)]
pub struct Cli {
    /// YAML configuration file for the store (environment variables override it)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the store tables if they do not exist yet
    Init,
    /// Validate a headerless CSV file and upsert its rows
    Upload(UploadArgs),
    /// Show the expected column layout for an entity kind
    Schema(SchemaArgs),
    /// Run one of the hiring reports
    Report(ReportArgs),
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Entity kind the file describes (jobs, departments, employees)
    pub kind: String,
    /// CSV file to upload ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// File name to check when reading stdin (must end in .csv)
    #[arg(long = "file-name")]
    pub file_name: Option<String>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Entity kind (jobs, departments, employees)
    pub kind: String,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(subcommand)]
    pub report: ReportKind,
}

#[derive(Debug, Subcommand)]
pub enum ReportKind {
    /// Hires per department and job in each quarter of a year
    Quarterly(ReportOptions),
    /// Departments whose total hires exceed the yearly per-department average
    AboveAverage(ReportOptions),
}

#[derive(Debug, Args)]
pub struct ReportOptions {
    /// Calendar year the report is computed for
    #[arg(long, default_value_t = REPORT_YEAR)]
    pub year: i32,
    /// Output format
    #[arg(long, value_enum, default_value_t = ReportFormat::Html)]
    pub format: ReportFormat,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}
