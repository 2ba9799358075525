//! Command implementations

pub mod config;
pub mod list;
pub mod rotate;
pub mod version;
pub mod write;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use vibelog_core::{LoggerConfig, CONFIG_FILES};

/// Load the config named on the command line, else a `vibelog.*` file in the
/// current directory, else the defaults
pub fn load_config(explicit: Option<&Path>) -> Result<(LoggerConfig, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let config = LoggerConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        return Ok((config, Some(path.to_path_buf())));
    }

    let cwd = Path::new(".");
    if CONFIG_FILES.iter().any(|name| cwd.join(name).exists()) {
        let (config, path) = LoggerConfig::find_and_load(cwd)?;
        debug!("Loaded config from {}", path.display());
        return Ok((config, Some(path)));
    }

    Ok((LoggerConfig::default(), None))
}
