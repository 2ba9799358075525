//! Write command implementation

use anyhow::Result;
use vibelog_core::{LogLevel, LogOptions, LoggerConfig};
use vibelog_logs::Logger;

use crate::cli::WriteArgs;
use crate::output::{print_write_summary, WriteSummary};

pub fn execute(args: WriteArgs, mut config: LoggerConfig) -> Result<()> {
    if let Some(file) = args.file {
        config.file_path = Some(file);
    }
    if let Some(max_size) = args.max_size {
        config.max_file_size = max_size;
    }
    if let Some(max_files) = args.max_files {
        config.max_rotated_files = max_files;
    }
    if args.sync {
        config.async_rotation = false;
    }

    let logger = Logger::create_file_logger_with_config(&args.name, config)?;
    let level = LogLevel::from(args.level);

    for i in 1..=args.count {
        let message = args
            .message
            .clone()
            .unwrap_or_else(|| format!("entry {}", i));
        let options = LogOptions::new().context("sequence", i as u64);
        logger.log(level, args.operation.as_str(), message, options)?;
    }

    // Close first so queued rotations are on disk before reporting
    logger.close()?;

    let file = logger.file_path().unwrap_or_default();
    let summary = WriteSummary {
        file_size_bytes: std::fs::metadata(&file).map(|m| m.len()).unwrap_or(0),
        rotated_files: vibelog_logs::scan_rotated_files(&file),
        entries: args.count,
        file,
    };
    print_write_summary(&summary);
    Ok(())
}
