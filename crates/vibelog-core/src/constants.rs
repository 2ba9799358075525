//! Constants and default values for vibelog

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default log directory name (relative to the working directory)
pub const LOGS_DIR: &str = "logs";

/// Project directory used when no project name is configured
pub const DEFAULT_PROJECT_DIR: &str = "default";

/// Default environment name
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Default config file names to search for (in priority order)
pub const CONFIG_FILES: &[&str] = &[
    "vibelog.toml",
    "vibelog.config.toml",
    "vibelog.yaml",
    "vibelog.yml",
    "vibelog.config.yaml",
    "vibelog.json",
    "vibelog.config.json",
];

/// Default max log file size in bytes (10MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Hard upper bound for max_file_size (1GB)
pub const MAX_FILE_SIZE_LIMIT: u64 = 1024 * 1024 * 1024;

/// Default max rotated files to keep
pub const DEFAULT_MAX_ROTATED_FILES: usize = 5;

/// Hard upper bound for max_rotated_files
pub const MAX_ROTATED_FILES_LIMIT: usize = 100;

/// Default in-memory log capacity
pub const DEFAULT_MEMORY_LOG_LIMIT: usize = 1000;

/// Hard upper bound for memory_log_limit
pub const MAX_MEMORY_LOG_LIMIT: usize = 10_000;

/// Maximum length of environment and project names
pub const MAX_NAME_LENGTH: usize = 50;

/// Maximum age of the cached file size before it is re-read from disk
pub const SIZE_SYNC_INTERVAL: Duration = Duration::from_secs(10);

/// Fraction of max_file_size above which a rotation decision re-reads the real size
pub const SIZE_HIGH_WATER_RATIO: f64 = 0.8;

/// Capacity of the async rotation request queue
pub const ROTATION_QUEUE_CAPACITY: usize = 1;

/// Timestamp format of rotated file suffixes
pub const ROTATED_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Timestamp format of generated log file names
pub const FILE_NAME_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Get the directory for a project's logs under `root`
pub fn project_dir(root: &Path, project_name: Option<&str>) -> PathBuf {
    let project = project_name
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_PROJECT_DIR);
    root.join(project)
}

/// Get the generated log file path for a logger under `root`
pub fn default_log_path(root: &Path, name: &str, project_name: Option<&str>) -> PathBuf {
    let timestamp = chrono::Local::now().format(FILE_NAME_TIMESTAMP_FORMAT);
    project_dir(root, project_name).join(format!("{}_{}.log", name, timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_dir_default() {
        let dir = project_dir(Path::new("logs"), None);
        assert_eq!(dir, PathBuf::from("logs/default"));

        let dir = project_dir(Path::new("logs"), Some(""));
        assert_eq!(dir, PathBuf::from("logs/default"));
    }

    #[test]
    fn test_project_dir_named() {
        let dir = project_dir(Path::new("logs"), Some("e-commerce"));
        assert_eq!(dir, PathBuf::from("logs/e-commerce"));
    }

    #[test]
    fn test_default_log_path() {
        let path = default_log_path(Path::new("logs"), "worker", Some("project-a"));
        assert!(path.starts_with("logs/project-a"));

        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("worker_"));
        assert!(name.ends_with(".log"));
        // worker_YYYYMMDD_HHMMSS.log
        assert_eq!(name.len(), "worker_".len() + 15 + ".log".len());
    }
}
