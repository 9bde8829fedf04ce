//! Markdown output generation for comparison results.

use crate::report::verdict_sentence;
use crate::result::{Comparison, RunResult};
use offload_bench_core::Result;
use std::fmt::Write;

/// Longest output excerpt shown in the summary table.
const EXCERPT_CHARS: usize = 47;

/// Generate a markdown summary table from comparisons.
pub fn generate_summary(comparisons: &[Comparison]) -> Result<String> {
    let mut output = String::new();

    writeln!(output, "# Offload Benchmark Summary")?;
    writeln!(output)?;
    writeln!(output, "Generated: {}", chrono::Utc::now().to_rfc3339())?;
    writeln!(output)?;
    writeln!(output, "## Results")?;
    writeln!(output)?;
    writeln!(
        output,
        "| Timestamp | Model | Accelerated (s) | Baseline (s) | Faster | Difference (s) | Difference (%) |"
    )?;
    writeln!(
        output,
        "|-----------|-------|-----------------|--------------|--------|----------------|----------------|"
    )?;

    for comparison in comparisons {
        let verdict = &comparison.verdict;
        writeln!(
            output,
            "| {} | {} | {} {:.2} | {} {:.2} | {} | {:.2} | {:.2} |",
            comparison.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            comparison.model,
            comparison.accelerated.label(),
            comparison.accelerated.elapsed_seconds(),
            comparison.baseline.label(),
            comparison.baseline.elapsed_seconds(),
            verdict.faster_label.as_deref().unwrap_or("tie"),
            verdict.absolute_difference_seconds,
            verdict.percentage_difference,
        )?;
    }

    writeln!(output)?;
    writeln!(output, "---")?;
    writeln!(output, "Total comparisons: {}", comparisons.len())?;

    Ok(output)
}

/// Generate a detailed markdown report with each run's output.
pub fn generate_detailed_report(comparisons: &[Comparison]) -> Result<String> {
    let mut output = String::new();

    writeln!(output, "# Detailed Offload Benchmark Report")?;
    writeln!(output)?;
    writeln!(output, "Generated: {}", chrono::Utc::now().to_rfc3339())?;
    writeln!(output)?;

    for comparison in comparisons {
        writeln!(output, "## {}", comparison.id)?;
        writeln!(output)?;
        writeln!(output, "**Timestamp:** {}", comparison.timestamp.to_rfc3339())?;
        writeln!(output, "**Backend:** {}", comparison.backend)?;
        writeln!(output, "**Model:** {}", comparison.model)?;
        writeln!(output)?;
        writeln!(output, "**Verdict:** {}", verdict_sentence(&comparison.verdict)?)?;
        writeln!(output)?;

        for run in comparison.runs() {
            write_run_section(&mut output, run, "###")?;
        }
    }

    Ok(output)
}

/// Generate a markdown report for a single profiled run.
pub fn generate_run_report(run: &RunResult) -> Result<String> {
    let mut output = String::new();

    writeln!(output, "# Offload Profile: {}", run.label())?;
    writeln!(output)?;
    writeln!(output, "Generated: {}", chrono::Utc::now().to_rfc3339())?;
    writeln!(output)?;
    write_run_section(&mut output, run, "##")?;

    Ok(output)
}

fn write_run_section(output: &mut String, run: &RunResult, heading: &str) -> Result<()> {
    writeln!(output, "{heading} {}", run.label())?;
    writeln!(output)?;
    if let Some(engine) = run.engine() {
        writeln!(
            output,
            "- gpu_layers: {}, threads: {}, context_size: {}",
            engine.gpu_layers, engine.threads, engine.context_size
        )?;
    }
    writeln!(output, "- Acquisition: {}", run.load_hms()?)?;
    writeln!(output, "- Inference: {}", run.elapsed_hms()?)?;
    writeln!(output, "- Excerpt: {}", excerpt(run.output_text()))?;
    writeln!(output)?;
    writeln!(output, "```text")?;
    writeln!(output, "{}", run.output_text())?;
    writeln!(output, "```")?;
    writeln!(output)?;
    Ok(())
}

fn excerpt(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > EXCERPT_CHARS {
        let cut: String = flat.chars().take(EXCERPT_CHARS).collect();
        format!("{cut}...")
    } else {
        flat
    }
}
