//! Timing harness comparing accelerated and CPU-only inference.
//!
//! The harness loads an engine with accelerator offload, times one chat
//! completion, releases it, then does the same with offload disabled and
//! reports which run was faster.
//!
//! # Quick Start
//!
//! ```no_run
//! # async fn demo(loader: &dyn offload_bench_core::EngineLoader) -> offload_bench_core::Result<()> {
//! use offload_bench_benchmarks::{report, run_comparison};
//! use offload_bench_core::BenchConfig;
//!
//! let config = BenchConfig::default();
//! let comparison = run_comparison(loader, &config).await?;
//! println!("{}", report::render_comparison(&comparison)?);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`executor`] - Timed load/generate/release of one configuration
//! - [`comparator`] - The [`ComparisonVerdict`] between two runs
//! - [`harness`] - Sequencing of the two runs
//! - [`result`] - [`RunResult`] and [`Comparison`]
//! - [`report`] - Plain-text reports
//! - [`markdown`] - Markdown report generation
//! - [`io`] - I/O operations for reading/writing results

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod comparator;
pub mod executor;
pub mod harness;
pub mod io;
pub mod markdown;
pub mod report;
pub mod result;

pub use comparator::{compare, ComparisonVerdict};
pub use executor::{execute_run, RunPlan, ScopedEngine};
pub use harness::ComparisonHarness;
pub use result::{Comparison, RunResult};

use offload_bench_core::{BenchConfig, EngineLoader, Result};

/// Run the configured comparison.
///
/// This is the canonical entrypoint: both profiles of `config` run in
/// order against `loader`.
pub async fn run_comparison(loader: &dyn EngineLoader, config: &BenchConfig) -> Result<Comparison> {
    let harness = ComparisonHarness::new(loader, config.conversation()?);
    harness.compare_config(config).await
}

/// Run the configured comparison and write outputs to `config.output_dir`.
///
/// Files written:
/// - `<output_dir>/raw/<id>.json` - The comparison as JSON
/// - `<output_dir>/all_results.json` - Combined JSON file
/// - `<output_dir>/summary.md` - Markdown summary
///
/// # Errors
///
/// Any run failure aborts before files are written. I/O failures are
/// returned as [`offload_bench_core::Error::Io`].
pub async fn run_and_write_all(
    loader: &dyn EngineLoader,
    config: &BenchConfig,
) -> Result<Comparison> {
    let comparison = run_comparison(loader, config).await?;
    io::write_all_outputs(&config.output_dir, std::slice::from_ref(&comparison))?;
    Ok(comparison)
}
