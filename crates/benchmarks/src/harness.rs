//! Sequencing of the accelerated and CPU-only runs.

use crate::executor::{execute_run, RunPlan};
use crate::result::{Comparison, RunResult};
use offload_bench_core::{BenchConfig, Conversation, EngineLoader, Result};
use tracing::info;

/// Runs the benchmark conversation against one backend.
///
/// At most one engine is alive at any time: each run releases its engine
/// before the next one is loaded.
pub struct ComparisonHarness<'a> {
    loader: &'a dyn EngineLoader,
    conversation: Conversation,
}

impl<'a> ComparisonHarness<'a> {
    /// Create a harness sending `conversation` to engines from `loader`.
    pub fn new(loader: &'a dyn EngineLoader, conversation: Conversation) -> Self {
        Self {
            loader,
            conversation,
        }
    }

    /// The conversation each run receives.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Time a single configuration, including model acquisition.
    pub async fn profile(&self, plan: &RunPlan) -> Result<RunResult> {
        execute_run(self.loader, plan, &self.conversation).await
    }

    /// Run `accelerated` and then `baseline`, and compare them.
    ///
    /// A failure in either run aborts the comparison. The first run's
    /// result is dropped and no verdict is produced.
    pub async fn compare(&self, accelerated: &RunPlan, baseline: &RunPlan) -> Result<Comparison> {
        info!(
            backend = self.loader.name(),
            accelerated = %accelerated.label,
            baseline = %baseline.label,
            "starting comparison"
        );

        let accelerated_run = self.profile(accelerated).await?;
        let baseline_run = self.profile(baseline).await?;

        let comparison = Comparison::new(
            self.loader.name(),
            accelerated.engine.model.clone(),
            accelerated_run,
            baseline_run,
        );
        info!(
            id = %comparison.id,
            faster = comparison.verdict.faster_label.as_deref().unwrap_or("tie"),
            difference_seconds = comparison.verdict.absolute_difference_seconds,
            difference_percent = comparison.verdict.percentage_difference,
            "comparison finished"
        );
        Ok(comparison)
    }

    /// Run both profiles of `config`.
    pub async fn compare_config(&self, config: &BenchConfig) -> Result<Comparison> {
        let accelerated = RunPlan::from_profile(config, &config.accelerated);
        let baseline = RunPlan::from_profile(config, &config.baseline);
        self.compare(&accelerated, &baseline).await
    }
}
