//! Cached live-file size used for rotation decisions

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;
use vibelog_core::constants::{SIZE_HIGH_WATER_RATIO, SIZE_SYNC_INTERVAL};

/// Tracks the live file size without a stat call on every write.
///
/// The cached value is re-read from disk when it is older than the sync
/// interval, and again before confirming a rotation once the cache is above
/// the high-water mark of the limit. A failed stat counts the file as empty.
#[derive(Debug)]
pub struct SizeTracker {
    path: PathBuf,
    cached: u64,
    /// The last sync found no file at the path
    missing: bool,
    last_sync: Instant,
    needs_sync: bool,
    sync_interval: Duration,
    high_water_ratio: f64,
}

impl SizeTracker {
    /// Create a tracker and read the current size from disk
    pub fn new(path: PathBuf) -> Self {
        let mut tracker = Self::with_size(path, 0);
        tracker.sync();
        tracker
    }

    /// Create a tracker with a size already known to the caller
    pub fn with_size(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            cached: size,
            missing: false,
            last_sync: Instant::now(),
            needs_sync: false,
            sync_interval: SIZE_SYNC_INTERVAL,
            high_water_ratio: SIZE_HIGH_WATER_RATIO,
        }
    }

    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached size in bytes
    pub fn current(&self) -> u64 {
        self.cached
    }

    /// Whether the last sync found the file gone
    pub fn is_missing(&self) -> bool {
        self.missing
    }

    /// Whether the next decision must re-read the size first
    pub fn is_stale(&self) -> bool {
        self.needs_sync || self.last_sync.elapsed() >= self.sync_interval
    }

    /// Would writing `entry_size` more bytes push the file past `max_file_size`?
    ///
    /// `max_file_size == 0` means unlimited. An empty file never rotates, so an
    /// entry larger than the limit lands in a fresh file on its own.
    pub fn should_rotate(&mut self, entry_size: u64, max_file_size: u64) -> bool {
        if max_file_size == 0 {
            return false;
        }

        if self.is_stale() {
            self.sync();
        }

        if !self.exceeds(entry_size, max_file_size) {
            return false;
        }

        if self.cached >= self.high_water_mark(max_file_size) {
            self.sync();
            if !self.exceeds(entry_size, max_file_size) {
                return false;
            }
        }

        self.cached > 0
    }

    /// Re-read the real size from disk
    pub fn sync(&mut self) -> u64 {
        let (size, missing) = match std::fs::metadata(&self.path) {
            Ok(meta) => (meta.len(), false),
            Err(e) => {
                debug!("Cannot stat {}, counting it as empty: {}", self.path.display(), e);
                (0, e.kind() == ErrorKind::NotFound)
            }
        };
        self.sync_to(size);
        self.missing = missing;
        size
    }

    /// Accept a size known from a write operation
    pub fn sync_to(&mut self, size: u64) {
        self.cached = size;
        self.missing = false;
        self.last_sync = Instant::now();
        self.needs_sync = false;
    }

    /// Account for bytes just written
    pub fn adjust_by(&mut self, delta: u64) {
        self.cached = self.cached.saturating_add(delta);
    }

    /// The file was just replaced by an empty one
    pub fn reset(&mut self) {
        self.sync_to(0);
    }

    /// Force a sync before the next decision (e.g. after a partial write)
    pub fn invalidate(&mut self) {
        self.needs_sync = true;
    }

    fn exceeds(&self, entry_size: u64, max_file_size: u64) -> bool {
        self.cached.saturating_add(entry_size) > max_file_size
    }

    fn high_water_mark(&self, max_file_size: u64) -> u64 {
        (max_file_size as f64 * self.high_water_ratio) as u64
    }
}
