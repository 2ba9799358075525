//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use vibelog_core::LogLevel;

#[derive(Parser)]
#[command(name = "vibelog")]
#[command(version, about = "Structured JSON logging with size-based rotation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output in JSON format instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (.toml, .yaml, .yml or .json); defaults to vibelog.* in the current directory
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write log entries, rotating the file as it grows
    Write(WriteArgs),

    /// Rotate a log file now
    Rotate(RotateArgs),

    /// List rotated files of a log file
    List(ListArgs),

    /// Show the effective configuration
    Config(ConfigArgs),

    /// Show version information
    Version,
}

#[derive(Args)]
pub struct WriteArgs {
    /// Live log file (default: logs/<project>/<name>_<timestamp>.log)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Logger name
    #[arg(short, long, default_value = "vibelog")]
    pub name: String,

    /// Number of entries to write
    #[arg(long, default_value = "1")]
    pub count: usize,

    /// Entry level
    #[arg(short, long, value_enum, default_value = "info")]
    pub level: LevelArg,

    /// Operation name recorded on each entry
    #[arg(short, long, default_value = "cli")]
    pub operation: String,

    /// Message text (default: "entry <n>")
    #[arg(short, long)]
    pub message: Option<String>,

    /// Rotate when the file would exceed this many bytes (0 = never)
    #[arg(long)]
    pub max_size: Option<u64>,

    /// Rotated files to keep (0 = keep all)
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Rotate on the writing thread instead of the background worker
    #[arg(long)]
    pub sync: bool,
}

#[derive(Args)]
pub struct RotateArgs {
    /// Live log file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Rotated files to keep (0 = keep all)
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Hand the rotation to the background worker and wait for it
    #[arg(long = "async")]
    pub background: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Live log file
    #[arg(short, long)]
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Logger name used to resolve the default file path
    #[arg(short, long, default_value = "vibelog")]
    pub name: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LevelArg {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LevelArg> for LogLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Debug => LogLevel::Debug,
            LevelArg::Info => LogLevel::Info,
            LevelArg::Warn => LogLevel::Warn,
            LevelArg::Error => LogLevel::Error,
        }
    }
}
