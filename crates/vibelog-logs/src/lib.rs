//! vibelog logs - live file writing, size-based rotation and the logger

mod logger;
mod memory;
mod rotation;
mod size;
mod worker;
mod writer;

pub use logger::Logger;
pub use memory::MemoryLog;
pub use rotation::{scan_rotated_files, FileRotator, RotationConfig};
pub use size::SizeTracker;
pub use worker::RotationHandle;
pub use writer::LogWriter;
