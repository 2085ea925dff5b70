//! Progress reporting for conversion runs, using the indicatif crate.

use indicatif::{ProgressBar, ProgressStyle};

/// Style for the per-dataset progress bar
const DATASET_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Create a progress bar over `length` datasets, or a hidden bar when
/// progress display is disabled.
#[must_use]
pub fn dataset_progress_bar(length: u64, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(length);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(DATASET_TEMPLATE)
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}
