//! Top-level conversion driver.
//!
//! Opens the container, discovers its datasets and converts each one in
//! discovery order. A failure inside one dataset's conversion is logged,
//! recorded in the run report and never aborts the rest of the run; only a
//! missing input, an empty container or an invalid target size are fatal.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::chunk;
use crate::config::ConverterConfig;
use crate::container::{DatasetEntry, NpzContainer};
use crate::error::{ConvertError, Result};
use crate::schema::resolve_columns;
use crate::utils::progress::dataset_progress_bar;
use crate::utils::{output_dir_for, validate_input};
use crate::writer::{WriteSummary, write_dataset};

/// A dataset that was skipped, with the reason it failed
#[derive(Debug, Clone, Serialize)]
pub struct SkippedDataset {
    /// Hierarchical dataset name
    pub name: String,
    /// Human-readable failure reason
    pub reason: String,
}

/// Outcome report for one conversion run
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    /// Datasets converted completely
    pub converted: usize,
    /// Total output files produced across all converted datasets
    pub artifacts: usize,
    /// Datasets skipped because their conversion failed
    pub skipped: Vec<SkippedDataset>,
}

/// Convert every dataset in the container at `input` into chunked Parquet
/// files under a run directory named after the input file.
///
/// Datasets are processed strictly sequentially in discovery order. The
/// container is opened once and released when the run ends, on every exit
/// path.
///
/// # Errors
/// `InputNotFound` if the path is missing, `EmptyContainer` if discovery
/// finds no datasets, `InvalidTargetSize` for a non-positive target size,
/// or an I/O error while creating the output directory. Per-dataset
/// failures do not surface here; they are recorded in the report.
pub fn convert_container(input: &Path, config: &ConverterConfig) -> Result<RunReport> {
    if !(config.target_file_size_mb > 0.0) {
        return Err(ConvertError::InvalidTargetSize(config.target_file_size_mb));
    }
    validate_input(input)?;

    let mut container = NpzContainer::open(input)?;
    let entries = container.discover();
    if entries.is_empty() {
        return Err(ConvertError::EmptyContainer {
            path: input.to_path_buf(),
        });
    }
    log::info!("found {} datasets in {}", entries.len(), input.display());
    log_inventory(&mut container, &entries);

    let out_dir = output_dir_for(input)?;
    fs::create_dir_all(&out_dir)?;

    let progress = dataset_progress_bar(entries.len() as u64, config.show_progress);
    let mut report = RunReport::default();
    for entry in &entries {
        progress.set_message(entry.name.clone());
        match convert_dataset(&mut container, entry, config, &out_dir) {
            Ok(summary) => {
                log::info!(
                    "converted dataset '{}' into {} files ({} rows)",
                    entry.name,
                    summary.files,
                    summary.rows
                );
                report.converted += 1;
                report.artifacts += summary.files;
            }
            Err(err) => {
                log::warn!("skipping dataset '{}': {err}", entry.name);
                report.skipped.push(SkippedDataset {
                    name: entry.name.clone(),
                    reason: err.to_string(),
                });
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    log::info!(
        "conversion finished: {} converted, {} skipped, output in {}",
        report.converted,
        report.skipped.len(),
        out_dir.display()
    );
    Ok(report)
}

/// Convert one dataset: resolve its layout, plan chunk sizes and write all
/// chunks. Any error here is scoped to this dataset.
fn convert_dataset(
    container: &mut NpzContainer,
    entry: &DatasetEntry,
    config: &ConverterConfig,
    out_dir: &Path,
) -> Result<WriteSummary> {
    let dataset = container.load_dataset(entry)?;
    let columns = resolve_columns(dataset.element_type(), dataset.shape())?;
    let row_byte_width: usize = columns.iter().map(|c| c.ty.size).sum();
    let rows_per_chunk = chunk::rows_per_chunk(row_byte_width, config.target_file_size_mb);
    log::info!(
        "dataset '{}': {} rows per output file",
        entry.name,
        rows_per_chunk
    );
    write_dataset(&dataset, &columns, rows_per_chunk, out_dir)
}

/// Log name, shape and element type of every discovered dataset.
/// Header parsing can fail per entry; inventory logging must not.
fn log_inventory(container: &mut NpzContainer, entries: &[DatasetEntry]) {
    for entry in entries {
        match container.peek(entry) {
            Ok(info) => log::info!(
                "dataset '{}': shape {:?}, type {}",
                entry.name,
                info.shape,
                info.element_type
            ),
            Err(err) => log::debug!("dataset '{}': header not readable: {err}", entry.name),
        }
    }
}
