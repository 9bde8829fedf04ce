//! Benchmark result types.
//!
//! [`RunResult`] records one timed generation; [`Comparison`] pairs the
//! accelerated and CPU-only runs with their verdict.

use crate::comparator::ComparisonVerdict;
use chrono::{DateTime, Utc};
use offload_bench_core::{EngineConfig, Error, Hms, ModelSource, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of one timed invocation of the generation capability.
///
/// Fields are private: a run result does not change after the executor
/// produces it. Deserialized results go through the same duration checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RunResultRecord")]
pub struct RunResult {
    label: String,
    elapsed_seconds: f64,
    output_text: String,
    load_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    engine: Option<EngineConfig>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl RunResult {
    /// Create a run result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDuration`] when `elapsed_seconds` is negative or not finite.
    pub fn new(
        label: impl Into<String>,
        elapsed_seconds: f64,
        output_text: impl Into<String>,
    ) -> Result<Self> {
        check_seconds(elapsed_seconds)?;
        let finished_at = Utc::now();
        Ok(Self {
            label: label.into(),
            elapsed_seconds,
            output_text: output_text.into(),
            load_seconds: 0.0,
            engine: None,
            started_at: finished_at,
            finished_at,
        })
    }

    /// Attach the time spent acquiring the engine.
    pub fn with_load_seconds(mut self, load_seconds: f64) -> Result<Self> {
        check_seconds(load_seconds)?;
        self.load_seconds = load_seconds;
        Ok(self)
    }

    /// Attach the engine configuration the run used.
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Attach wall-clock start and end of the generation call.
    pub fn with_window(mut self, started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self.finished_at = finished_at;
        self
    }

    /// Configuration label, e.g. `GPU`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Seconds spent inside the generation call.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    /// Seconds spent loading the engine.
    pub fn load_seconds(&self) -> f64 {
        self.load_seconds
    }

    /// Generated text.
    pub fn output_text(&self) -> &str {
        &self.output_text
    }

    /// Engine configuration, when recorded.
    pub fn engine(&self) -> Option<&EngineConfig> {
        self.engine.as_ref()
    }

    /// Wall-clock start of generation.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Wall-clock end of generation.
    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// Generation time split into hours, minutes and seconds.
    pub fn elapsed_hms(&self) -> Result<Hms> {
        Hms::from_secs_f64(self.elapsed_seconds)
    }

    /// Load time split into hours, minutes and seconds.
    pub fn load_hms(&self) -> Result<Hms> {
        Hms::from_secs_f64(self.load_seconds)
    }
}

/// Unchecked wire form of [`RunResult`].
#[derive(Deserialize)]
struct RunResultRecord {
    label: String,
    elapsed_seconds: f64,
    output_text: String,
    #[serde(default)]
    load_seconds: f64,
    #[serde(default)]
    engine: Option<EngineConfig>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl TryFrom<RunResultRecord> for RunResult {
    type Error = Error;

    fn try_from(record: RunResultRecord) -> Result<Self> {
        check_seconds(record.elapsed_seconds)?;
        check_seconds(record.load_seconds)?;
        Ok(Self {
            label: record.label,
            elapsed_seconds: record.elapsed_seconds,
            output_text: record.output_text,
            load_seconds: record.load_seconds,
            engine: record.engine,
            started_at: record.started_at,
            finished_at: record.finished_at,
        })
    }
}

fn check_seconds(seconds: f64) -> Result<()> {
    if seconds.is_finite() && seconds >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidDuration(seconds))
    }
}

/// An accelerated run, a CPU-only run, and which one won.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    /// Unique identifier of this comparison.
    pub id: Uuid,
    /// Backend that served both runs.
    pub backend: String,
    /// Model both runs loaded.
    pub model: ModelSource,
    /// The offloaded run, executed first.
    pub accelerated: RunResult,
    /// The CPU-only run, executed second.
    pub baseline: RunResult,
    /// Which run was faster and by how much.
    pub verdict: ComparisonVerdict,
    /// When the comparison finished.
    pub timestamp: DateTime<Utc>,
}

impl Comparison {
    /// Create a comparison from two finished runs.
    pub fn new(
        backend: impl Into<String>,
        model: ModelSource,
        accelerated: RunResult,
        baseline: RunResult,
    ) -> Self {
        let verdict = crate::comparator::compare(&accelerated, &baseline);
        Self {
            id: Uuid::new_v4(),
            backend: backend.into(),
            model,
            accelerated,
            baseline,
            verdict,
            timestamp: Utc::now(),
        }
    }

    /// Both runs in execution order.
    pub fn runs(&self) -> [&RunResult; 2] {
        [&self.accelerated, &self.baseline]
    }
}
