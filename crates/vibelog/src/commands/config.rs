//! Config command implementation

use anyhow::Result;
use std::path::Path;
use vibelog_core::LoggerConfig;

use crate::cli::ConfigArgs;
use crate::output::print_config;

pub fn execute(args: ConfigArgs, config: &LoggerConfig, source: Option<&Path>) -> Result<()> {
    let resolved = config.resolve_file_path(&args.name);
    print_config(config, &resolved, source);
    Ok(())
}
