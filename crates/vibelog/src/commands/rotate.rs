//! Rotate command implementation

use anyhow::{Context, Result};
use std::time::Duration;
use vibelog_core::LoggerConfig;
use vibelog_logs::Logger;

use crate::cli::RotateArgs;
use crate::output::{print_rotate_summary, RotateSummary};

const ASYNC_WAIT: Duration = Duration::from_secs(10);

pub fn execute(args: RotateArgs, mut config: LoggerConfig) -> Result<()> {
    config.file_path = Some(args.file.clone());
    config.rotation_enabled = true;
    if let Some(max_files) = args.max_files {
        config.max_rotated_files = max_files;
    }

    let logger = Logger::create_file_logger_with_config("rotate", config)?;

    if args.background {
        logger
            .force_rotation_async()
            .wait_timeout(ASYNC_WAIT)
            .context("Background rotation failed")?;
    } else {
        logger.force_rotation().context("Rotation failed")?;
    }

    let rotated = logger.rotated_files();
    logger.close()?;

    print_rotate_summary(&RotateSummary {
        file: args.file,
        rotated_to: rotated.first().cloned(),
        rotated_files: rotated.len(),
    });
    Ok(())
}
