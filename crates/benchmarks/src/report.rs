//! Plain-text reports printed after a run or comparison.

use crate::comparator::ComparisonVerdict;
use crate::result::{Comparison, RunResult};
use offload_bench_core::Result;
use std::fmt::Write;

/// Render a single profiled run: acquisition time, inference time, output.
pub fn render_run(run: &RunResult) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "Acquiring the model took: {}", run.load_hms()?)?;
    writeln!(out, "Performing inference took: {}", run.elapsed_hms()?)?;
    writeln!(out)?;
    writeln!(out, "{}", run.output_text())?;
    Ok(out)
}

/// Render a comparison: per-run timings and output, then the verdict.
pub fn render_comparison(comparison: &Comparison) -> Result<String> {
    let mut out = String::new();

    for run in comparison.runs() {
        writeln!(
            out,
            "Acquiring the model for {} took: {}",
            run.label(),
            run.load_hms()?
        )?;
    }
    for run in comparison.runs() {
        writeln!(
            out,
            "{} took: {} for inference.",
            run.label(),
            run.elapsed_hms()?
        )?;
    }

    for run in comparison.runs() {
        writeln!(out)?;
        writeln!(out, "{} Output:", run.label())?;
        writeln!(out)?;
        writeln!(out, "{}", run.output_text())?;
    }

    writeln!(out)?;
    writeln!(out, "{}", verdict_sentence(&comparison.verdict)?)?;
    Ok(out)
}

/// One-line summary of a verdict.
pub fn verdict_sentence(verdict: &ComparisonVerdict) -> Result<String> {
    match &verdict.faster_label {
        Some(label) => Ok(format!(
            "{} inference time was faster by {} ({:.2}%).",
            label,
            verdict.difference_hms()?,
            verdict.percentage_difference
        )),
        None => Ok("Both configurations took the same time for inference.".to_string()),
    }
}
