//! Utility functions for paths and file names.

pub mod progress;

use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};

/// Flatten a hierarchical dataset name into a valid, glob-friendly file
/// name stem: path separators and spaces become underscores.
#[must_use]
pub fn sanitize_dataset_name(name: &str) -> String {
    name.replace(['/', '\\', ' '], "_")
}

/// Output directory for a conversion run: a sibling of the input file,
/// named after it with the extension stripped.
pub fn output_dir_for(input: &Path) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .ok_or_else(|| ConvertError::InputNotFound {
            path: input.to_path_buf(),
        })?;
    Ok(input.with_file_name(stem))
}

/// Validate that the input container path exists and is a file
pub fn validate_input(input: &Path) -> Result<()> {
    if !input.is_file() {
        return Err(ConvertError::InputNotFound {
            path: input.to_path_buf(),
        });
    }
    Ok(())
}
