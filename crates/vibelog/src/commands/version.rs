//! Version command implementation

use anyhow::Result;
use vibelog_core::version_info;

use crate::output::print_version;

pub fn execute() -> Result<()> {
    print_version(&version_info());
    Ok(())
}
