//! Live log file handle

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use vibelog_core::{Error, Result};

use crate::size::SizeTracker;

/// Append-only handle on the live log file plus its cached size.
///
/// The handle is dropped for the duration of a rotation. When reopening fails
/// the writer stays handle-less and the next write tries to open it again.
/// A live file removed from under an open handle is recreated on the next
/// write instead of appending to the unlinked inode.
#[derive(Debug)]
pub struct LogWriter {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    tracker: SizeTracker,
    closed: bool,
}

impl LogWriter {
    /// Open (or create) the live file, creating its parent directory first
    pub fn new(path: PathBuf) -> Result<Self> {
        let file = open_append(&path)?;
        let current_size = file.metadata()?.len();

        Ok(Self {
            tracker: SizeTracker::with_size(path.clone(), current_size),
            writer: Some(BufWriter::new(file)),
            path,
            closed: false,
        })
    }

    /// Append one entry followed by a newline and flush it.
    ///
    /// Returns the number of bytes written.
    pub fn write_entry(&mut self, line: &[u8]) -> Result<u64> {
        if self.closed {
            return Err(Error::LoggerClosed);
        }

        if self.writer.is_some() && !self.path.exists() {
            debug!("Log file {} was removed, recreating it", self.path.display());
            self.writer = None;
        }

        if self.writer.is_none() {
            self.reopen()?;
            self.tracker.sync();
        }

        let Self {
            path,
            writer,
            tracker,
            ..
        } = self;
        let Some(writer) = writer.as_mut() else {
            return Err(Error::LoggerClosed);
        };

        let result = writer
            .write_all(line)
            .and_then(|_| writer.write_all(b"\n"))
            .and_then(|_| writer.flush());

        match result {
            Ok(()) => {
                let written = line.len() as u64 + 1;
                tracker.adjust_by(written);
                Ok(written)
            }
            Err(source) => {
                // Part of the entry may have reached the disk
                tracker.invalidate();
                Err(Error::WriteFailed {
                    path: path.clone(),
                    source,
                })
            }
        }
    }

    /// Flush and drop the handle so the file can be renamed.
    ///
    /// A failed flush keeps the handle.
    pub(crate) fn release(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush().map_err(|source| Error::WriteFailed {
                path: self.path.clone(),
                source,
            })?;
        }
        self.writer = None;
        Ok(())
    }

    /// Open a fresh handle on the live path
    pub(crate) fn reopen(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::LoggerClosed);
        }
        let file = open_append(&self.path)?;
        debug!("Opened log file: {}", self.path.display());
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    /// Flush and close for good; later writes fail with `LoggerClosed`
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let result = self.release();
        self.writer = None;
        self.closed = true;
        result
    }

    /// Get the log file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get current file size as tracked in memory
    pub fn current_size(&self) -> u64 {
        self.tracker.current()
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn tracker_mut(&mut self) -> &mut SizeTracker {
        &mut self.tracker
    }
}

fn open_append(path: &Path) -> Result<File> {
    let reopen_failed = |source| Error::ReopenFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(reopen_failed)?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(reopen_failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_writer_creation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("dir").join("test.log");

        let writer = LogWriter::new(path.clone()).unwrap();
        assert!(path.exists());
        assert!(writer.is_open());
        assert_eq!(writer.current_size(), 0);
    }

    #[test]
    fn test_log_writer_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.log");
        fs::write(&path, b"existing\n").unwrap();

        let mut writer = LogWriter::new(path.clone()).unwrap();
        assert_eq!(writer.current_size(), 9);

        let written = writer.write_entry(br#"{"message":"hello"}"#).unwrap();
        assert_eq!(written, 20);
        assert_eq!(writer.current_size(), 29);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "existing\n{\"message\":\"hello\"}\n");
    }

    #[test]
    fn test_release_then_write_reopens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.log");

        let mut writer = LogWriter::new(path.clone()).unwrap();
        writer.write_entry(b"one").unwrap();
        writer.release().unwrap();
        assert!(!writer.is_open());

        // The file vanished while the handle was released
        fs::remove_file(&path).unwrap();

        writer.write_entry(b"two").unwrap();
        assert!(writer.is_open());
        assert_eq!(fs::read_to_string(&path).unwrap(), "two\n");
        assert_eq!(writer.current_size(), 4);
    }

    #[test]
    fn test_external_delete_recreates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.log");

        let mut writer = LogWriter::new(path.clone()).unwrap();
        writer.write_entry(b"one").unwrap();
        assert!(writer.is_open());

        // Removed while the handle is still open
        fs::remove_file(&path).unwrap();

        for line in [&b"two"[..], b"three"] {
            writer.write_entry(line).unwrap();
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "two\nthree\n");
        assert_eq!(writer.current_size(), 10);
    }

    #[test]
    fn test_reopen_after_close_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.log");

        let mut writer = LogWriter::new(path).unwrap();
        writer.close().unwrap();
        assert!(matches!(writer.reopen(), Err(Error::LoggerClosed)));
        assert!(!writer.is_open());
    }

    #[test]
    fn test_close_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.log");

        let mut writer = LogWriter::new(path).unwrap();
        writer.write_entry(b"last").unwrap();
        writer.close().unwrap();
        writer.close().unwrap();

        assert!(writer.is_closed());
        assert!(matches!(writer.write_entry(b"late"), Err(Error::LoggerClosed)));
    }

    #[test]
    fn test_open_failure_is_reopen_failed() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be
        let path = dir.path().join("taken");
        fs::create_dir(&path).unwrap();

        let err = LogWriter::new(path).unwrap_err();
        assert!(matches!(err, Error::ReopenFailed { .. }));
        assert!(err.is_unwritable());
    }
}
