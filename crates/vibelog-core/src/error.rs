//! Error types for vibelog

use std::path::PathBuf;

/// vibelog error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Failed to rotate {} to {}: {source}", .from.display(), .to.display())]
    RotateFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open log file {}: {source}", .path.display())]
    ReopenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to log file {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove {} rotated file(s): {}", .0.len(), .0.join("; "))]
    CleanupFailed(Vec<String>),

    #[error("Rotation is not enabled")]
    RotationDisabled,

    #[error("Rotation worker stopped before reporting a result")]
    RotationWorkerGone,

    #[error("Logger is closed")]
    LoggerClosed,

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Result type alias for vibelog
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::ConfigError(msg.into())
    }

    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Error::Timeout(msg.into())
    }

    /// Whether the error means the live file could not be (re)opened
    pub fn is_unwritable(&self) -> bool {
        matches!(self, Error::ReopenFailed { .. } | Error::WriteFailed { .. })
    }
}
