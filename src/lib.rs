//! A Rust library for converting NPZ containers of typed array datasets
//! into size-bounded, Snappy-compressed Parquet files, with per-dataset
//! failure isolation.

pub mod chunk;
pub mod config;
pub mod container;
pub mod convert;
pub mod error;
pub mod schema;
pub mod utils;
pub mod writer;

// Re-export the most common types for easier use
// Core types
pub use config::ConverterConfig;
pub use convert::{RunReport, SkippedDataset, convert_container};
pub use error::{ConvertError, Result};

// Container types
pub use container::{Dataset, DatasetEntry, NpzContainer};

// Type mapping
pub use schema::{ColumnarType, ElementKind, ElementType, SimpleType, map_simple};

// Chunk planning
pub use chunk::{chunk_ranges, rows_per_chunk};
