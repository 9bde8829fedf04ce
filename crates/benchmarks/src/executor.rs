//! Timed execution of a single generation run.
//!
//! An engine is loaded, asked for exactly one completion, and released
//! before [`execute_run`] returns, whether generation succeeded or not.
//! Only the generation call is inside the inference stopwatch; loading is
//! timed separately.

use crate::result::RunResult;
use chrono::Utc;
use offload_bench_core::{
    BenchConfig, ChatCompletion, Conversation, EngineConfig, EngineHandle, EngineLoader, Error,
    ProfileConfig, Result,
};
use std::time::Instant;
use tracing::{debug, info, warn};

/// A labelled engine configuration to time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    /// Label printed in reports.
    pub label: String,
    /// Settings the engine is loaded with.
    pub engine: EngineConfig,
}

impl RunPlan {
    /// Create a plan.
    pub fn new(label: impl Into<String>, engine: EngineConfig) -> Self {
        Self {
            label: label.into(),
            engine,
        }
    }

    /// Plan for one profile of a loaded configuration.
    pub fn from_profile(config: &BenchConfig, profile: &ProfileConfig) -> Self {
        Self::new(profile.label.clone(), config.engine_config(profile))
    }
}

/// Holds one loaded engine and guarantees it is released.
///
/// [`release`](Self::release) frees the engine explicitly. If the guard is
/// dropped without that call (a panic, or a cancelled future) the handle is
/// dropped with it, which frees the model.
pub struct ScopedEngine {
    label: String,
    handle: Option<Box<dyn EngineHandle>>,
}

impl ScopedEngine {
    /// Load an engine for `plan`.
    pub async fn acquire(loader: &dyn EngineLoader, plan: &RunPlan) -> Result<Self> {
        plan.engine.validate()?;
        info!(
            label = %plan.label,
            backend = loader.name(),
            model = %plan.engine.model,
            gpu_layers = plan.engine.gpu_layers,
            threads = plan.engine.threads,
            context_size = plan.engine.context_size,
            "loading engine"
        );
        let handle = loader.load(&plan.engine).await?;
        Ok(Self {
            label: plan.label.clone(),
            handle: Some(handle),
        })
    }

    /// Run one completion on the held engine.
    pub async fn generate(&mut self, conversation: &Conversation) -> Result<ChatCompletion> {
        match self.handle.as_mut() {
            Some(handle) => handle.generate(conversation).await,
            None => Err(Error::generation(format!(
                "engine '{}' was already released",
                self.label
            ))),
        }
    }

    /// Release the engine and consume the guard.
    pub async fn release(mut self) -> Result<()> {
        match self.handle.take() {
            Some(mut handle) => {
                let result = handle.release().await;
                drop(handle);
                debug!(label = %self.label, ok = result.is_ok(), "engine released");
                result
            }
            None => Ok(()),
        }
    }
}

impl Drop for ScopedEngine {
    fn drop(&mut self) {
        if self.handle.take().is_some() {
            warn!(label = %self.label, "engine dropped without explicit release");
        }
    }
}

/// Load, time one generation, and release.
///
/// # Errors
///
/// - [`Error::EngineLoadFailure`] if the engine cannot be acquired
/// - [`Error::GenerationFailure`] if generation fails; no timing is kept
/// - [`Error::EngineReleaseFailure`] if the engine cannot be freed after a
///   successful generation
pub async fn execute_run(
    loader: &dyn EngineLoader,
    plan: &RunPlan,
    conversation: &Conversation,
) -> Result<RunResult> {
    let load_start = Instant::now();
    let mut engine = ScopedEngine::acquire(loader, plan).await?;
    let load_seconds = load_start.elapsed().as_secs_f64();
    info!(label = %plan.label, load_seconds, "engine acquired");

    info!(label = %plan.label, messages = conversation.len(), "starting inference");
    let started_at = Utc::now();
    let start = Instant::now();
    let generated = engine.generate(conversation).await;
    let elapsed = start.elapsed();
    let finished_at = Utc::now();

    let released = engine.release().await;

    let completion = match generated {
        Ok(completion) => completion,
        Err(err) => {
            if let Err(release_err) = released {
                warn!(label = %plan.label, error = %release_err, "release failed after generation failure");
            }
            return Err(err);
        }
    };
    released?;

    let text = completion.into_text()?;
    let elapsed_seconds = elapsed.as_secs_f64();
    info!(label = %plan.label, elapsed_seconds, "inference completed");

    Ok(RunResult::new(plan.label.clone(), elapsed_seconds, text)?
        .with_load_seconds(load_seconds)?
        .with_engine(plan.engine.clone())
        .with_window(started_at, finished_at))
}
