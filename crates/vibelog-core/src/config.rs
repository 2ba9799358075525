//! Logger configuration
//!
//! Configuration can be built in code or loaded from a file in one of:
//! - TOML (.toml)
//! - YAML (.yaml, .yml)
//! - JSON (.json)

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::error::{Error, Result};

/// Environment names: alphanumeric, underscore, hyphen and dot
static ENVIRONMENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_.-]+$").expect("Invalid environment regex"));

/// Project names become a directory component, so no dots
static PROJECT_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("Invalid project name regex"));

/// Validate an environment name
pub fn validate_environment_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_NAME_LENGTH && ENVIRONMENT_REGEX.is_match(name)
}

/// Validate a project name
pub fn validate_project_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_NAME_LENGTH && PROJECT_NAME_REGEX.is_match(name)
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    /// Detect format from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_true() -> bool {
    true
}

fn default_memory_log_limit() -> usize {
    DEFAULT_MEMORY_LOG_LIMIT
}

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

fn default_max_rotated_files() -> usize {
    DEFAULT_MAX_ROTATED_FILES
}

/// Logger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Maximum live file size in bytes (0 = unlimited)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Write entries to the log file
    #[serde(default = "default_true")]
    pub auto_save: bool,
    /// Keep entries in the in-memory log
    #[serde(default)]
    pub enable_memory_log: bool,
    /// Maximum entries in the in-memory log (0 = unlimited)
    #[serde(default = "default_memory_log_limit")]
    pub memory_log_limit: usize,
    /// Explicit live file path; generated from name and project when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    /// Environment name recorded on every entry
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Project name used as the log sub-directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// Rotate the live file when it reaches max_file_size
    #[serde(default = "default_true")]
    pub rotation_enabled: bool,
    /// Maximum rotated files to keep (0 = keep all)
    #[serde(default = "default_max_rotated_files")]
    pub max_rotated_files: usize,
    /// Hand write-triggered rotations to the background worker
    #[serde(default = "default_true")]
    pub async_rotation: bool,
    /// Echo every serialized entry to stdout
    #[serde(default)]
    pub console_output: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            auto_save: true,
            enable_memory_log: false,
            memory_log_limit: DEFAULT_MEMORY_LOG_LIMIT,
            file_path: None,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            project_name: None,
            rotation_enabled: true,
            max_rotated_files: DEFAULT_MAX_ROTATED_FILES,
            async_rotation: true,
            console_output: false,
        }
    }
}

impl LoggerConfig {
    /// Load config from file, detecting the format from its extension
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::ConfigError(format!(
                "Unsupported config file extension: {}. Expected .toml, .yaml, .yml, or .json",
                path.display()
            ))
        })?;

        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content, format)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse config content with specified format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let config: LoggerConfig = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        Ok(config)
    }

    /// Find and load a config file from a directory
    pub fn find_and_load(dir: &Path) -> Result<(Self, PathBuf)> {
        for name in CONFIG_FILES {
            let path = dir.join(name);
            if path.exists() {
                let config = Self::load(&path)?;
                return Ok((config, path));
            }
        }
        Err(Error::ConfigError(format!(
            "No config file found in {}. Expected one of: {:?}",
            dir.display(),
            CONFIG_FILES
        )))
    }

    /// Check limits and names; out-of-range values are rejected, never clamped
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size > MAX_FILE_SIZE_LIMIT {
            return Err(Error::config(format!(
                "max_file_size exceeds limit: {} > {}",
                self.max_file_size, MAX_FILE_SIZE_LIMIT
            )));
        }

        if self.memory_log_limit > MAX_MEMORY_LOG_LIMIT {
            return Err(Error::config(format!(
                "memory_log_limit exceeds limit: {} > {}",
                self.memory_log_limit, MAX_MEMORY_LOG_LIMIT
            )));
        }

        if self.max_rotated_files > MAX_ROTATED_FILES_LIMIT {
            return Err(Error::config(format!(
                "max_rotated_files exceeds limit: {} > {}",
                self.max_rotated_files, MAX_ROTATED_FILES_LIMIT
            )));
        }

        if !validate_environment_name(&self.environment) {
            return Err(Error::config(format!(
                "Invalid environment '{}': up to {} alphanumeric, '_', '-' or '.' characters",
                self.environment, MAX_NAME_LENGTH
            )));
        }

        if let Some(project) = &self.project_name {
            if !validate_project_name(project) {
                return Err(Error::config(format!(
                    "Invalid project name '{}': up to {} alphanumeric, '_' or '-' characters",
                    project, MAX_NAME_LENGTH
                )));
            }
        }

        if let Some(path) = &self.file_path {
            if path.file_name().is_none() {
                return Err(Error::config(format!(
                    "file_path must name a file: {}",
                    path.display()
                )));
            }
        }

        Ok(())
    }

    /// Resolve the live file path for a logger called `name`
    pub fn resolve_file_path(&self, name: &str) -> PathBuf {
        match &self.file_path {
            Some(path) => path.clone(),
            None => default_log_path(Path::new(LOGS_DIR), name, self.project_name.as_deref()),
        }
    }

    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn with_max_rotated_files(mut self, count: usize) -> Self {
        self.max_rotated_files = count;
        self
    }

    pub fn with_rotation(mut self, enabled: bool) -> Self {
        self.rotation_enabled = enabled;
        self
    }

    pub fn with_async_rotation(mut self, enabled: bool) -> Self {
        self.async_rotation = enabled;
        self
    }

    pub fn with_memory_log(mut self, limit: usize) -> Self {
        self.enable_memory_log = true;
        self.memory_log_limit = limit;
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project_name = Some(project.into());
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }
}
