//! Error handling for the conversion pipeline.

use std::path::PathBuf;

/// Specialized error type for container-to-Parquet conversion.
///
/// `InputNotFound`, `EmptyContainer` and `InvalidTargetSize` abort a run
/// before any output is produced. All other variants are scoped to the
/// dataset that raised them: the orchestrator logs the failure, counts the
/// dataset as skipped and continues with the rest of the container.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The input container path does not exist or is not a file
    #[error("input container not found: {}", path.display())]
    InputNotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// The container holds no datasets at all
    #[error("no datasets found in container: {}", path.display())]
    EmptyContainer {
        /// Path of the opened container
        path: PathBuf,
    },

    /// The configured target file size is not a positive number
    #[error("target file size must be positive, got {0} MB")]
    InvalidTargetSize(f64),

    /// An element type outside the supported mapping table
    #[error("unsupported element type '{kind}{size}'")]
    UnsupportedType {
        /// NumPy dtype kind character (`i`, `u`, `f`, `S`, `b`, ...)
        kind: char,
        /// Element width in bytes
        size: usize,
    },

    /// A dataset layout the converter cannot emit as columns
    #[error("unsupported dataset layout: {0}")]
    UnsupportedLayout(String),

    /// A malformed or truncated `.npy` entry
    #[error("invalid npy data: {0}")]
    Npy(String),

    /// Error opening or reading a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reading the container archive
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Error assembling Arrow record batches
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error writing Parquet output
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;
