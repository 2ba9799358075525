//! vibelog core - configuration, error handling, entry types and enrichment

pub mod config;
pub mod constants;
pub mod enrich;
pub mod error;
pub mod types;
pub mod version;

pub use config::*;
pub use constants::*;
pub use error::{Error, Result};
pub use types::*;
pub use version::{version_info, VersionInfo, VERSION};
