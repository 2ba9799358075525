//! Logger: serializes entries and drives the live file and its rotator

use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use vibelog_core::{runtime_environment, Error, LogEntry, LogLevel, LogOptions, LoggerConfig, Result};

use crate::memory::MemoryLog;
use crate::rotation::{FileRotator, RotationConfig};
use crate::worker::RotationHandle;
use crate::writer::LogWriter;

#[derive(Debug)]
struct LoggerState {
    config: LoggerConfig,
    rotator: Option<FileRotator>,
    closed: bool,
}

/// Structured JSON logger.
///
/// Every call runs under one lock: build the entry, check the size,
/// rotate if needed, write. Lock order is logger state, then live file,
/// then rotation retention.
#[derive(Debug)]
pub struct Logger {
    name: String,
    state: Mutex<LoggerState>,
    writer: Option<Arc<Mutex<LogWriter>>>,
    memory: MemoryLog,
}

impl Logger {
    /// Memory-only logger with the default config
    pub fn new(name: impl Into<String>) -> Self {
        let config = LoggerConfig::default();
        Self::build(name.into(), config, None, None)
    }

    /// Memory-only logger
    pub fn with_config(name: impl Into<String>, config: LoggerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(name.into(), config, None, None))
    }

    /// Logger writing to `logs/default/<name>_<timestamp>.log`
    pub fn create_file_logger(name: impl Into<String>) -> Result<Self> {
        Self::create_file_logger_with_config(name, LoggerConfig::default())
    }

    /// Logger writing to the configured (or generated) file path
    pub fn create_file_logger_with_config(
        name: impl Into<String>,
        config: LoggerConfig,
    ) -> Result<Self> {
        config.validate()?;
        let name = name.into();
        let path = config.resolve_file_path(&name);

        let writer = Arc::new(Mutex::new(LogWriter::new(path.clone())?));
        let rotator = if config.rotation_enabled {
            Some(new_rotator(&writer, &config, path.clone())?)
        } else {
            None
        };

        debug!("Logger '{}' writing to {}", name, path.display());
        Ok(Self::build(name, config, Some(writer), rotator))
    }

    fn build(
        name: String,
        config: LoggerConfig,
        writer: Option<Arc<Mutex<LogWriter>>>,
        rotator: Option<FileRotator>,
    ) -> Self {
        Self {
            name,
            memory: MemoryLog::new(config.memory_log_limit),
            state: Mutex::new(LoggerState {
                config,
                rotator,
                closed: false,
            }),
            writer,
        }
    }

    /// Record one entry
    pub fn log(
        &self,
        level: LogLevel,
        operation: impl Into<String>,
        message: impl Into<String>,
        options: LogOptions,
    ) -> Result<()> {
        let state = self.state.lock();
        if state.closed {
            return Err(Error::LoggerClosed);
        }

        let entry = LogEntry::new(level, operation, message, options)
            .with_environment(runtime_environment(&state.config.environment));
        let line = entry.to_json_line()?;

        if state.config.enable_memory_log {
            self.memory.push(entry);
        }

        if state.config.auto_save {
            if let Some(writer) = &self.writer {
                match &state.rotator {
                    Some(rotator) => rotator.write_entry(&line)?,
                    None => writer.lock().write_entry(&line)?,
                };
            }
        }

        if state.config.console_output {
            println!("{}", String::from_utf8_lossy(&line));
        }

        Ok(())
    }

    pub fn debug(&self, operation: impl Into<String>, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Debug, operation, message, LogOptions::default())
    }

    pub fn info(&self, operation: impl Into<String>, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Info, operation, message, LogOptions::default())
    }

    pub fn warn(&self, operation: impl Into<String>, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Warn, operation, message, LogOptions::default())
    }

    pub fn error(&self, operation: impl Into<String>, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Error, operation, message, LogOptions::default())
    }

    /// Rotate now, regardless of size
    pub fn force_rotation(&self) -> Result<()> {
        let state = self.state.lock();
        if state.closed {
            return Err(Error::LoggerClosed);
        }
        match &state.rotator {
            Some(rotator) => rotator.perform_rotation(),
            None => Err(Error::RotationDisabled),
        }
    }

    /// Rotate on the background worker, regardless of size
    pub fn force_rotation_async(&self) -> RotationHandle {
        let state = self.state.lock();
        if state.closed {
            return RotationHandle::ready(Err(Error::LoggerClosed));
        }
        match &state.rotator {
            Some(rotator) => rotator.force_rotation_async(),
            None => RotationHandle::ready(Err(Error::RotationDisabled)),
        }
    }

    /// Rotate on the background worker unless the live file is empty
    pub fn perform_rotation_async(&self) -> RotationHandle {
        let state = self.state.lock();
        if state.closed {
            return RotationHandle::ready(Err(Error::LoggerClosed));
        }
        match &state.rotator {
            Some(rotator) => rotator.perform_rotation_async(),
            None => RotationHandle::ready(Err(Error::RotationDisabled)),
        }
    }

    /// Rotated files, newest first
    pub fn rotated_files(&self) -> Vec<PathBuf> {
        self.state
            .lock()
            .rotator
            .as_ref()
            .map(FileRotator::rotated_files)
            .unwrap_or_default()
    }

    /// Choose between background and inline rotation for write-triggered rotations
    pub fn set_async_rotation(&self, enabled: bool) {
        let mut state = self.state.lock();
        state.config.async_rotation = enabled;
        if let Some(rotator) = &state.rotator {
            rotator.set_async_enabled(enabled);
        }
    }

    /// Apply a new config. Rotation can be switched on or off here; the live
    /// file path stays the one chosen at creation.
    pub fn update_config(&self, config: LoggerConfig) -> Result<()> {
        config.validate()?;
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if let Some(writer) = &self.writer {
            let path = writer.lock().path().to_path_buf();
            if config.rotation_enabled {
                let rotation = RotationConfig::from_logger_config(&config, path.clone());
                match &state.rotator {
                    Some(rotator) => {
                        rotator.update_config(rotation)?;
                        rotator.set_async_enabled(config.async_rotation);
                    }
                    None if !state.closed => {
                        state.rotator = Some(new_rotator(writer, &config, path)?);
                    }
                    None => {}
                }
            } else if let Some(rotator) = state.rotator.take() {
                rotator.close();
            }
        }

        self.memory.set_limit(config.memory_log_limit);
        state.config = config;
        Ok(())
    }

    pub fn config(&self) -> LoggerConfig {
        self.state.lock().config.clone()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Live file path, `None` for memory-only loggers
    pub fn file_path(&self) -> Option<PathBuf> {
        self.writer
            .as_ref()
            .map(|writer| writer.lock().path().to_path_buf())
    }

    /// Buffered entries, oldest first
    pub fn memory_logs(&self) -> Vec<LogEntry> {
        self.memory.snapshot()
    }

    pub fn clear_memory_logs(&self) {
        self.memory.clear();
    }

    /// Finish queued rotations, stop the worker and close the live file.
    /// Safe to call twice.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Ok(());
        }
        state.closed = true;

        if let Some(rotator) = state.rotator.take() {
            rotator.close_and_wait();
        }
        match &self.writer {
            Some(writer) => writer.lock().close(),
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

fn new_rotator(
    writer: &Arc<Mutex<LogWriter>>,
    config: &LoggerConfig,
    path: PathBuf,
) -> Result<FileRotator> {
    let rotator = FileRotator::new(
        Arc::clone(writer),
        RotationConfig::from_logger_config(config, path),
    )?;
    rotator.set_async_enabled(config.async_rotation);
    Ok(rotator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn file_config(dir: &TempDir) -> LoggerConfig {
        LoggerConfig::default().with_file_path(dir.path().join("app.log"))
    }

    fn read_lines(path: &std::path::Path) -> Vec<serde_json::Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_file_logger_writes_json_lines() {
        let dir = TempDir::new().unwrap();
        let logger = Logger::create_file_logger_with_config("svc", file_config(&dir)).unwrap();

        logger.info("startup", "service ready").unwrap();
        logger
            .log(
                LogLevel::Error,
                "db_query",
                "connection refused",
                LogOptions::new().context("attempt", 3),
            )
            .unwrap();

        let lines = read_lines(&dir.path().join("app.log"));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["level"], "INFO");
        assert_eq!(lines[0]["operation"], "startup");
        assert_eq!(lines[0]["environment"]["environment"], "development");
        assert_eq!(lines[1]["level"], "ERROR");
        assert_eq!(lines[1]["context"]["attempt"], 3);
        assert_eq!(lines[1]["pattern"], "database_error");
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("logs").join("checkout").join("svc.log");
        let config = LoggerConfig::default().with_file_path(&target);
        let logger = Logger::create_file_logger_with_config("svc", config).unwrap();

        assert_eq!(logger.file_path(), Some(target.clone()));
        assert!(target.exists());
        assert_eq!(logger.name(), "svc");
    }

    #[test]
    fn test_memory_only_logger() {
        let config = LoggerConfig::default().with_memory_log(2);
        let logger = Logger::with_config("mem", config).unwrap();
        assert!(logger.file_path().is_none());

        logger.info("a", "first").unwrap();
        logger.warn("b", "second").unwrap();
        logger.debug("c", "third").unwrap();

        let entries = logger.memory_logs();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "second");
        assert_eq!(entries[1].level, LogLevel::Debug);

        logger.clear_memory_logs();
        assert!(logger.memory_logs().is_empty());
        assert!(matches!(logger.force_rotation(), Err(Error::RotationDisabled)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = LoggerConfig::default().with_max_rotated_files(1000);
        assert!(Logger::with_config("bad", config).is_err());
    }

    #[test]
    fn test_rotation_on_write() {
        let dir = TempDir::new().unwrap();
        let config = file_config(&dir)
            .with_max_file_size(1024)
            .with_max_rotated_files(3)
            .with_async_rotation(false);
        let logger = Logger::create_file_logger_with_config("svc", config).unwrap();

        for i in 0..40 {
            logger.info("tick", format!("iteration {}", i)).unwrap();
        }

        let rotated = logger.rotated_files();
        assert_eq!(rotated.len(), 3);
        for file in rotated.iter().chain(std::iter::once(&dir.path().join("app.log"))) {
            assert!(fs::metadata(file).unwrap().len() <= 1024);
        }
    }

    #[test]
    fn test_async_rotation_keeps_files_near_limit() {
        let dir = TempDir::new().unwrap();
        let config = file_config(&dir)
            .with_max_file_size(2000)
            .with_max_rotated_files(0);
        assert!(config.async_rotation);
        let logger = Logger::create_file_logger_with_config("svc", config).unwrap();

        for i in 0..300 {
            logger.info("tick", format!("iteration {}", i)).unwrap();
        }
        logger.close().unwrap();

        let files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert!(files.len() > 2);
        assert!(files.contains(&dir.path().join("app.log")));

        // Everything but the last entry of a file fits under the limit
        for file in &files {
            let content = fs::read_to_string(file).unwrap();
            let last = content.lines().last().map(|l| l.len() as u64 + 1).unwrap_or(0);
            let size = content.len() as u64;
            assert!(size - last <= 2000, "{} is {} bytes", file.display(), size);
            for line in content.lines() {
                serde_json::from_str::<serde_json::Value>(line).unwrap();
            }
        }
    }

    #[test]
    fn test_removed_live_file_is_recreated() {
        let dir = TempDir::new().unwrap();
        let config = file_config(&dir).with_async_rotation(false);
        let logger = Logger::create_file_logger_with_config("svc", config).unwrap();
        let live = dir.path().join("app.log");

        logger.info("op", "first").unwrap();
        fs::remove_file(&live).unwrap();

        for i in 0..5 {
            logger.info("op", format!("after removal {}", i)).unwrap();
        }
        let lines = read_lines(&live);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0]["message"], "after removal 0");
    }

    #[test]
    fn test_force_rotation() {
        let dir = TempDir::new().unwrap();
        let logger = Logger::create_file_logger_with_config("svc", file_config(&dir)).unwrap();

        logger.info("before", "rotation").unwrap();
        logger.force_rotation().unwrap();
        logger.info("after", "rotation").unwrap();

        let rotated = logger.rotated_files();
        assert_eq!(rotated.len(), 1);
        assert_eq!(read_lines(&rotated[0])[0]["operation"], "before");
        assert_eq!(read_lines(&dir.path().join("app.log"))[0]["operation"], "after");
    }

    #[test]
    fn test_force_rotation_async() {
        let dir = TempDir::new().unwrap();
        let logger = Logger::create_file_logger_with_config("svc", file_config(&dir)).unwrap();

        logger.info("op", "message").unwrap();
        logger
            .force_rotation_async()
            .wait_timeout(Duration::from_secs(5))
            .unwrap();
        assert_eq!(logger.rotated_files().len(), 1);

        logger.set_async_rotation(false);
        assert!(!logger.config().async_rotation);
        logger.force_rotation_async().wait().unwrap();
        assert_eq!(logger.rotated_files().len(), 2);
    }

    #[test]
    fn test_update_config_toggles_rotation() {
        let dir = TempDir::new().unwrap();
        let config = file_config(&dir).with_rotation(false);
        let logger = Logger::create_file_logger_with_config("svc", config.clone()).unwrap();
        assert!(matches!(logger.force_rotation(), Err(Error::RotationDisabled)));

        logger
            .update_config(config.clone().with_rotation(true).with_max_rotated_files(0))
            .unwrap();
        for _ in 0..3 {
            logger.info("op", "message").unwrap();
            logger.force_rotation().unwrap();
        }
        assert_eq!(logger.rotated_files().len(), 3);

        // Tighter retention applies immediately
        logger
            .update_config(config.clone().with_rotation(true).with_max_rotated_files(1))
            .unwrap();
        assert_eq!(logger.rotated_files().len(), 1);

        logger.update_config(config).unwrap();
        assert!(logger.rotated_files().is_empty());
        assert!(matches!(logger.force_rotation(), Err(Error::RotationDisabled)));
    }

    #[test]
    fn test_update_config_rejects_invalid() {
        let dir = TempDir::new().unwrap();
        let logger = Logger::create_file_logger_with_config("svc", file_config(&dir)).unwrap();

        let bad = file_config(&dir).with_environment("bad env");
        assert!(logger.update_config(bad).is_err());
        assert_eq!(logger.config().environment, "development");
    }

    #[test]
    fn test_auto_save_off_skips_file() {
        let dir = TempDir::new().unwrap();
        let mut config = file_config(&dir).with_memory_log(10);
        config.auto_save = false;
        let logger = Logger::create_file_logger_with_config("svc", config).unwrap();

        logger.info("op", "memory only").unwrap();
        assert_eq!(fs::metadata(dir.path().join("app.log")).unwrap().len(), 0);
        assert_eq!(logger.memory_logs().len(), 1);
    }

    #[test]
    fn test_close_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let logger = Logger::create_file_logger_with_config("svc", file_config(&dir)).unwrap();

        logger.info("op", "last").unwrap();
        logger.close().unwrap();
        logger.close().unwrap();

        assert!(logger.is_closed());
        assert!(matches!(logger.info("op", "late"), Err(Error::LoggerClosed)));
        assert!(matches!(logger.force_rotation(), Err(Error::LoggerClosed)));
        assert!(matches!(
            logger.force_rotation_async().wait(),
            Err(Error::LoggerClosed)
        ));
        assert!(matches!(
            logger.perform_rotation_async().wait(),
            Err(Error::LoggerClosed)
        ));
        assert!(logger.rotated_files().is_empty());
        assert_eq!(read_lines(&dir.path().join("app.log")).len(), 1);
    }

    #[test]
    fn test_concurrent_logging() {
        let dir = TempDir::new().unwrap();
        let config = file_config(&dir).with_max_file_size(0);
        let logger = Arc::new(Logger::create_file_logger_with_config("svc", config).unwrap());

        let threads: Vec<_> = (0..4)
            .map(|t| {
                let logger = Arc::clone(&logger);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        logger.info(format!("worker_{}", t), format!("entry {}", i)).unwrap();
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }

        // Every line is a complete JSON object
        assert_eq!(read_lines(&dir.path().join("app.log")).len(), 100);
    }
}
