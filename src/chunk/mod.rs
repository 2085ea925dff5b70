//! Chunk planning: how many rows go into each output file.

use std::ops::Range;

/// Rows per output file for a dataset, derived from its row byte width and
/// the target uncompressed file size.
///
/// `max(1, floor(target_file_size_mb * 1024 * 1024 / row_byte_width))`.
/// The result bounds the uncompressed bytes per file; compressed files on
/// disk will usually come out smaller.
///
/// # Arguments
/// * `row_byte_width` - Sum of the byte widths of all columns, must be > 0
/// * `target_file_size_mb` - Target file size in megabytes, must be > 0
#[must_use]
pub fn rows_per_chunk(row_byte_width: usize, target_file_size_mb: f64) -> usize {
    debug_assert!(row_byte_width > 0);
    debug_assert!(target_file_size_mb > 0.0);
    let target_bytes = target_file_size_mb * 1024.0 * 1024.0;
    let estimated = (target_bytes / row_byte_width as f64).floor() as usize;
    estimated.max(1)
}

/// Ascending, non-overlapping, contiguous row ranges covering
/// `0..total_rows`, each `rows_per_chunk` long except the final range,
/// which is clipped to the dataset's end.
pub fn chunk_ranges(
    total_rows: usize,
    rows_per_chunk: usize,
) -> impl Iterator<Item = Range<usize>> {
    debug_assert!(rows_per_chunk > 0);
    (0..total_rows)
        .step_by(rows_per_chunk)
        .map(move |start| start..(start + rows_per_chunk).min(total_rows))
}
