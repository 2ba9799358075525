//! Size-based log rotation with bounded retention

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::cmp::Reverse;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, warn};
use vibelog_core::constants::ROTATED_TIMESTAMP_FORMAT;
use vibelog_core::{Error, LoggerConfig, Result};

use crate::worker::{AsyncRotationWorker, RotationHandle};
use crate::writer::LogWriter;

/// Log rotation configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationConfig {
    /// Maximum live file size in bytes (0 = unlimited)
    pub max_file_size: u64,
    pub rotation_enabled: bool,
    /// Maximum number of rotated files to keep (0 = keep all)
    pub max_rotated_files: usize,
    /// Path of the live file
    pub base_path: PathBuf,
}

impl RotationConfig {
    pub fn new(base_path: impl Into<PathBuf>, max_file_size: u64, max_rotated_files: usize) -> Self {
        Self {
            max_file_size,
            rotation_enabled: true,
            max_rotated_files,
            base_path: base_path.into(),
        }
    }

    pub fn from_logger_config(config: &LoggerConfig, base_path: impl Into<PathBuf>) -> Self {
        Self {
            max_file_size: config.max_file_size,
            rotation_enabled: config.rotation_enabled,
            max_rotated_files: config.max_rotated_files,
            base_path: base_path.into(),
        }
    }
}

/// Retention state: the config and rotated files, newest first
#[derive(Debug)]
struct Retention {
    config: RotationConfig,
    rotated: Vec<PathBuf>,
}

impl Retention {
    /// Delete rotated files beyond the retention limit, oldest first.
    ///
    /// Every excess file is attempted; failures are collected into one error.
    /// Files are dropped from the set either way, so the set never exceeds
    /// the limit after a pass.
    fn cleanup(&mut self) -> Result<Vec<PathBuf>> {
        let limit = self.config.max_rotated_files;
        if limit == 0 {
            return Ok(Vec::new());
        }

        sort_newest_first(&mut self.rotated, &self.config.base_path);
        if self.rotated.len() <= limit {
            return Ok(Vec::new());
        }

        let excess = self.rotated.split_off(limit);
        let mut removed = Vec::with_capacity(excess.len());
        let mut failures = Vec::new();

        for path in excess.into_iter().rev() {
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Removed rotated log: {}", path.display());
                    removed.push(path);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => removed.push(path),
                Err(e) => failures.push(format!("{}: {}", path.display(), e)),
            }
        }

        if failures.is_empty() {
            Ok(removed)
        } else {
            Err(Error::CleanupFailed(failures))
        }
    }
}

/// State shared between the rotator handle and the background worker
#[derive(Debug)]
pub(crate) struct RotationCore {
    writer: Arc<Mutex<LogWriter>>,
    retention: Mutex<Retention>,
    /// A write-triggered request is queued or running
    pending: AtomicBool,
    /// Completed rotations of the live file
    generation: AtomicU64,
}

impl RotationCore {
    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn should_rotate_locked(&self, writer: &mut LogWriter, entry_size: u64) -> bool {
        !self.pending.load(Ordering::Acquire) && self.needs_rotation_locked(writer, entry_size)
    }

    /// Size check alone, ignoring any outstanding request
    fn needs_rotation_locked(&self, writer: &mut LogWriter, entry_size: u64) -> bool {
        let max_file_size = {
            let retention = self.retention.lock();
            if !retention.config.rotation_enabled {
                return false;
            }
            retention.config.max_file_size
        };

        writer.tracker_mut().should_rotate(entry_size, max_file_size)
    }

    /// Rotate the live file. The caller holds the writer lock.
    ///
    /// A live file that no longer exists is recreated instead; there is
    /// nothing to rename and `None` is returned.
    fn rotate_locked(&self, writer: &mut LogWriter) -> Result<Option<PathBuf>> {
        if writer.is_closed() {
            return Err(Error::LoggerClosed);
        }

        let mut retention = self.retention.lock();
        let base = retention.config.base_path.clone();

        writer.release()?;

        let tracker = writer.tracker_mut();
        tracker.sync();
        if tracker.is_missing() {
            drop(retention);
            debug!("{} is gone, recreating instead of rotating", base.display());
            self.generation.fetch_add(1, Ordering::AcqRel);
            writer.reopen()?;
            writer.tracker_mut().reset();
            return Ok(None);
        }

        let rotated = unique_rotated_path(&base, Local::now(), &retention.rotated);
        if let Err(source) = fs::rename(&base, &rotated) {
            return Err(Error::RotateFailed {
                from: base,
                to: rotated,
                source,
            });
        }
        info!("Rotated {} to {}", base.display(), rotated.display());
        retention.rotated.insert(0, rotated.clone());

        if let Err(e) = retention.cleanup() {
            warn!("Rotated log cleanup incomplete: {}", e);
        }
        drop(retention);

        self.generation.fetch_add(1, Ordering::AcqRel);

        writer.reopen()?;
        writer.tracker_mut().reset();
        Ok(Some(rotated))
    }

    /// Carry out one rotation request with the writer lock held.
    ///
    /// Non-forced requests are skipped when another rotation completed since
    /// `generation` was observed, or when the live file is empty.
    pub(crate) fn run_request_locked(
        &self,
        writer: &mut LogWriter,
        force: bool,
        generation: u64,
    ) -> Result<()> {
        let result = if force {
            self.rotate_locked(writer).map(|_| ())
        } else if self.generation() != generation {
            debug!("Live file rotated since the request, skipping rotation");
            Ok(())
        } else if writer.tracker_mut().sync() == 0 {
            debug!("Live file already empty, skipping rotation");
            Ok(())
        } else {
            self.rotate_locked(writer).map(|_| ())
        };

        if !force {
            self.pending.store(false, Ordering::Release);
        }
        result
    }

    pub(crate) fn run_request(&self, force: bool, generation: u64) -> Result<()> {
        let mut writer = self.writer.lock();
        self.run_request_locked(&mut writer, force, generation)
    }
}

/// Rotates a live log file by size and keeps a bounded set of rotated files.
///
/// Lock order is writer, then retention. Rotations either run on the caller's
/// thread or on the background worker; both take the same locks, so at most
/// one rotation touches the live file at a time.
pub struct FileRotator {
    core: Arc<RotationCore>,
    worker: Mutex<Option<AsyncRotationWorker>>,
    async_enabled: AtomicBool,
}

impl FileRotator {
    /// Attach a rotator to a live file.
    ///
    /// Rotated files left over from earlier runs are discovered and the
    /// retention limit is applied to them before the first write.
    pub fn new(writer: Arc<Mutex<LogWriter>>, config: RotationConfig) -> Result<Self> {
        {
            let live = writer.lock();
            if live.path() != config.base_path {
                return Err(Error::config(format!(
                    "Rotation base path {} does not match live file {}",
                    config.base_path.display(),
                    live.path().display()
                )));
            }
        }

        let mut retention = Retention {
            rotated: scan_rotated_files(&config.base_path),
            config,
        };
        if !retention.rotated.is_empty() {
            debug!(
                "Found {} rotated file(s) for {}",
                retention.rotated.len(),
                retention.config.base_path.display()
            );
        }
        match retention.cleanup() {
            Ok(removed) if !removed.is_empty() => {
                info!("Removed {} rotated file(s) over the retention limit", removed.len());
            }
            Ok(_) => {}
            Err(e) => warn!("Rotated log cleanup incomplete: {}", e),
        }

        let core = Arc::new(RotationCore {
            writer,
            retention: Mutex::new(retention),
            pending: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        });
        let worker = AsyncRotationWorker::spawn(Arc::clone(&core))?;

        Ok(Self {
            core,
            worker: Mutex::new(Some(worker)),
            async_enabled: AtomicBool::new(true),
        })
    }

    /// Would an entry of `entry_size` bytes push the live file past the limit?
    pub fn should_rotate(&self, entry_size: u64) -> bool {
        let mut writer = self.core.writer.lock();
        self.core.should_rotate_locked(&mut writer, entry_size)
    }

    /// Rotate now on the calling thread
    pub fn perform_rotation(&self) -> Result<()> {
        let mut writer = self.core.writer.lock();
        self.core.rotate_locked(&mut writer).map(|_| ())
    }

    /// Request a rotation; skipped if the live file turns out to be empty.
    ///
    /// While one such request is outstanding, further ones resolve
    /// immediately without queueing.
    pub fn perform_rotation_async(&self) -> RotationHandle {
        self.request(false)
    }

    /// Request a rotation that always happens
    pub fn force_rotation_async(&self) -> RotationHandle {
        self.request(true)
    }

    /// Write one entry, rotating first if it would not fit.
    ///
    /// With async rotation on, the rotation is handed to the worker and this
    /// entry still lands in the current file. If the worker cannot take the
    /// request, the rotation runs inline. A write that would overflow while
    /// the request is still outstanding rotates inline too, so the live file
    /// overshoots the limit by at most the one triggering entry.
    pub fn write_entry(&self, line: &[u8]) -> Result<u64> {
        let mut writer = self.core.writer.lock();
        let entry_size = line.len() as u64 + 1;

        if self.core.needs_rotation_locked(&mut writer, entry_size) {
            if self.core.pending.load(Ordering::Acquire) {
                // The queued request sees the new generation and skips
                self.core.rotate_locked(&mut writer)?;
            } else if self.is_async_enabled() {
                if self.try_submit(false).is_none() {
                    let generation = self.core.generation();
                    self.core.run_request_locked(&mut writer, false, generation)?;
                }
            } else {
                self.core.rotate_locked(&mut writer)?;
            }
        }

        writer.write_entry(line)
    }

    /// Rotated files, newest first
    pub fn rotated_files(&self) -> Vec<PathBuf> {
        self.core.retention.lock().rotated.clone()
    }

    pub fn config(&self) -> RotationConfig {
        self.core.retention.lock().config.clone()
    }

    /// Swap in a new config; a tighter retention limit applies immediately
    pub fn update_config(&self, config: RotationConfig) -> Result<()> {
        let _writer = self.core.writer.lock();
        let mut retention = self.core.retention.lock();

        if config.base_path != retention.config.base_path {
            return Err(Error::config(format!(
                "Cannot move live file from {} to {}",
                retention.config.base_path.display(),
                config.base_path.display()
            )));
        }

        retention.config = config;
        if let Err(e) = retention.cleanup() {
            warn!("Rotated log cleanup incomplete: {}", e);
        }
        Ok(())
    }

    pub fn set_async_enabled(&self, enabled: bool) {
        self.async_enabled.store(enabled, Ordering::Release);
    }

    pub fn is_async_enabled(&self) -> bool {
        self.async_enabled.load(Ordering::Acquire)
    }

    /// Stop the background worker. Later requests run inline.
    pub fn close(&self) {
        if let Some(worker) = self.worker.lock().take() {
            worker.shutdown();
        }
    }

    /// Like [`close`](Self::close), but wait for queued rotations to finish.
    ///
    /// Must not be called while holding the live file lock.
    pub fn close_and_wait(&self) {
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            worker.shutdown_and_wait();
        }
    }

    fn request(&self, force: bool) -> RotationHandle {
        match self.try_submit(force) {
            Some(handle) => handle,
            None => {
                let generation = self.core.generation();
                RotationHandle::ready(self.core.run_request(force, generation))
            }
        }
    }

    /// Hand a request to the worker. `None` means the caller must run it.
    fn try_submit(&self, force: bool) -> Option<RotationHandle> {
        if !self.is_async_enabled() {
            return None;
        }

        if !force && self.core.pending.swap(true, Ordering::AcqRel) {
            return Some(RotationHandle::ready(Ok(())));
        }

        let generation = self.core.generation();
        let submitted = self
            .worker
            .lock()
            .as_ref()
            .and_then(|worker| worker.submit(force, generation));

        if submitted.is_none() && !force {
            self.core.pending.store(false, Ordering::Release);
        }
        submitted
    }
}

impl Drop for FileRotator {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for FileRotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileRotator")
            .field("config", &self.config())
            .field("async_enabled", &self.is_async_enabled())
            .finish()
    }
}

/// `<base>.<suffix>`
fn rotated_path(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Rotated file name for `now`, with `.1`, `.2`, ... appended when a file for
/// the same second already exists or is tracked.
///
/// Counters only grow within a second, so a name freed by cleanup is never
/// handed out again after a newer one.
fn unique_rotated_path(base: &Path, now: DateTime<Local>, tracked: &[PathBuf]) -> PathBuf {
    let stamp = now.format(ROTATED_TIMESTAMP_FORMAT).to_string();

    let mut counter = tracked
        .iter()
        .map(|path| suffix_key(base, path))
        .filter(|(tracked_stamp, _)| *tracked_stamp == stamp)
        .map(|(_, counter)| counter + 1)
        .max()
        .unwrap_or(0);

    loop {
        let candidate = if counter == 0 {
            rotated_path(base, &stamp)
        } else {
            rotated_path(base, &format!("{}.{}", stamp, counter))
        };
        if !candidate.exists() && !tracked.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Ordering key from the rotated name: (timestamp, collision counter)
fn suffix_key(base: &Path, path: &Path) -> (String, u32) {
    let base_name = base
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let suffix = name
        .strip_prefix(base_name.as_str())
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(&name);

    match suffix.rsplit_once('.') {
        Some((stamp, counter)) => match counter.parse::<u32>() {
            Ok(counter) => (stamp.to_string(), counter),
            Err(_) => (suffix.to_string(), 0),
        },
        None => (suffix.to_string(), 0),
    }
}

/// Newest first by modification time; the rotated name breaks ties.
/// Files that cannot be stat'ed sort as oldest.
fn sort_newest_first(files: &mut [PathBuf], base: &Path) {
    files.sort_by_cached_key(|path| {
        let modified: Option<SystemTime> = fs::metadata(path).and_then(|m| m.modified()).ok();
        Reverse((modified, suffix_key(base, path)))
    });
}

/// Rotated files of `base` found on disk, newest first.
///
/// Matches regular files named `<basename>.*` in the same directory.
pub fn scan_rotated_files(base: &Path) -> Vec<PathBuf> {
    let Some(base_name) = base.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return Vec::new();
    };
    let prefix = format!("{}.", base_name);
    let dir = base
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot scan {} for rotated logs: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            name.starts_with(&prefix).then(|| base.with_file_name(name))
        })
        .collect();

    sort_newest_first(&mut files, base);
    files
}
