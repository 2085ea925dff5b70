//! Configuration for the converter.

/// Configuration for a conversion run
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Target size of each output file in megabytes, before compression.
    ///
    /// The chunk planner derives a per-dataset row count from this value and
    /// the dataset's row byte width. Compressed files on disk will usually be
    /// smaller. Must be positive; any positive value is accepted.
    pub target_file_size_mb: f64,
    /// Whether to render a progress bar over datasets
    pub show_progress: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            target_file_size_mb: 1024.0,
            show_progress: true,
        }
    }
}
