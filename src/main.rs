use std::path::Path;

use anyhow::Context;
use log::info;
use npz2parquet::{ConverterConfig, convert_container};

fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .context("usage: npz2parquet <container.npz> [target-file-size-mb]")?;

    let mut config = ConverterConfig::default();
    if let Some(size) = args.next() {
        config.target_file_size_mb = size
            .parse()
            .context("target file size must be a number of megabytes")?;
    }

    info!(
        "converting {input} with target file size {} MB",
        config.target_file_size_mb
    );
    let report = convert_container(Path::new(&input), &config)?;
    info!(
        "converted {} dataset(s), skipped {}",
        report.converted,
        report.skipped.len()
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
