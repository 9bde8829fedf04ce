//! I/O operations for comparison results.
//!
//! Layout under an output directory:
//!
//! - `raw/<id>.json` - one file per comparison
//! - `all_results.json` - every comparison written in one call
//! - `summary.md` - markdown summary table

use crate::markdown;
use crate::result::Comparison;
use offload_bench_core::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Subdirectory holding per-comparison JSON files.
pub const RAW_DIR: &str = "raw";

/// Combined JSON file name.
pub const ALL_RESULTS_FILE: &str = "all_results.json";

/// Markdown summary file name.
pub const SUMMARY_FILE: &str = "summary.md";

/// Ensure output directories exist under `output_dir`.
pub fn ensure_output_dirs(output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir.join(RAW_DIR))?;
    Ok(())
}

/// Write comparisons to a JSON file.
pub fn write_results_json(comparisons: &[Comparison], path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(comparisons)?;
    fs::write(path, json)?;
    Ok(())
}

/// Write one comparison to the raw directory and return its path.
pub fn write_raw_result(output_dir: &Path, comparison: &Comparison) -> Result<PathBuf> {
    ensure_output_dirs(output_dir)?;
    let path = output_dir
        .join(RAW_DIR)
        .join(format!("{}.json", comparison.id));
    let json = serde_json::to_string_pretty(comparison)?;
    fs::write(&path, json)?;
    Ok(path)
}

/// Write the markdown summary file.
pub fn write_summary(output_dir: &Path, comparisons: &[Comparison]) -> Result<()> {
    ensure_output_dirs(output_dir)?;
    let summary = markdown::generate_summary(comparisons)?;
    fs::write(output_dir.join(SUMMARY_FILE), summary)?;
    Ok(())
}

/// Write all outputs (raw JSON, combined JSON and summary).
pub fn write_all_outputs(output_dir: &Path, comparisons: &[Comparison]) -> Result<()> {
    ensure_output_dirs(output_dir)?;

    for comparison in comparisons {
        write_raw_result(output_dir, comparison)?;
    }

    write_results_json(comparisons, output_dir.join(ALL_RESULTS_FILE))?;
    write_summary(output_dir, comparisons)?;

    debug!(
        output_dir = %output_dir.display(),
        count = comparisons.len(),
        "results written"
    );
    Ok(())
}

/// Read comparisons from a JSON file.
pub fn read_results_json(path: impl AsRef<Path>) -> Result<Vec<Comparison>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
