//! List command implementation

use anyhow::Result;

use crate::cli::ListArgs;
use crate::output::{print_rotated_files, RotatedFile};

pub fn execute(args: ListArgs) -> Result<()> {
    let files: Vec<RotatedFile> = vibelog_logs::scan_rotated_files(&args.file)
        .iter()
        .map(|path| RotatedFile::from_path(path))
        .collect();

    print_rotated_files(&files);
    Ok(())
}
