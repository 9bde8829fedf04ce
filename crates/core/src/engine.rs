// Copyright 2025 Offload Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Capability interface to an external inference engine.
//!
//! The harness never runs inference itself. It asks an [`EngineLoader`] for an
//! [`EngineHandle`] configured with an [`EngineConfig`], calls
//! [`EngineHandle::generate`] once, and releases the handle before loading
//! the next configuration.
//!
//! # Example
//!
//! ```ignore
//! let config = EngineConfig::accelerated(ModelSource::default(), 8, 8192);
//! let mut engine = loader.load(&config).await?;
//! let completion = engine.generate(&Conversation::default()).await?;
//! engine.release().await?;
//! ```

use crate::conversation::{ChatCompletion, Conversation};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `gpu_layers` value requesting as many layers on the accelerator as fit.
pub const OFFLOAD_ALL_LAYERS: i32 = -1;

/// `gpu_layers` value keeping every layer on the CPU.
pub const OFFLOAD_NO_LAYERS: i32 = 0;

/// Default context window, in tokens.
pub const DEFAULT_CONTEXT_SIZE: u32 = 8192;

/// Default model repository on the Hugging Face hub.
pub const DEFAULT_REPO_ID: &str = "QuantFactory/Meta-Llama-3-8B-Instruct-GGUF-v2";

/// Default quantized model file inside [`DEFAULT_REPO_ID`].
pub const DEFAULT_MODEL_FILE: &str = "Meta-Llama-3-8B-Instruct-v2.Q6_K.gguf";

/// Where the quantized model artifact comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSource {
    /// Registry repository, e.g. `QuantFactory/Meta-Llama-3-8B-Instruct-GGUF-v2`.
    pub repo_id: String,
    /// GGUF file name inside the repository.
    pub filename: String,
}

impl Default for ModelSource {
    fn default() -> Self {
        Self {
            repo_id: DEFAULT_REPO_ID.to_string(),
            filename: DEFAULT_MODEL_FILE.to_string(),
        }
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.repo_id, self.filename)
    }
}

/// How many model layers go to the accelerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offload {
    /// CPU-only execution.
    None,
    /// Offload exactly this many layers.
    Layers(u32),
    /// Offload as much as the device allows.
    Max,
}

impl Offload {
    /// Encode as the engine's `gpu_layers` integer.
    pub fn as_gpu_layers(self) -> i32 {
        match self {
            Offload::None => OFFLOAD_NO_LAYERS,
            Offload::Layers(n) => i32::try_from(n).unwrap_or(i32::MAX),
            Offload::Max => OFFLOAD_ALL_LAYERS,
        }
    }
}

impl fmt::Display for Offload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Offload::None => write!(f, "none"),
            Offload::Layers(n) => write!(f, "{n} layers"),
            Offload::Max => write!(f, "max"),
        }
    }
}

/// Settings an engine is loaded with.
///
/// Not every backend applies every field. The mistralrs backend rejects
/// partial `gpu_layers` counts and ignores `threads` and `context_size`,
/// which are still recorded with results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Model artifact to load.
    pub model: ModelSource,
    /// Layers to offload: `-1` maximizes, `0` disables.
    pub gpu_layers: i32,
    /// Worker threads for CPU computation.
    pub threads: u32,
    /// Context window in tokens.
    pub context_size: u32,
}

impl EngineConfig {
    /// Configuration offloading as many layers as possible.
    pub fn accelerated(model: ModelSource, threads: u32, context_size: u32) -> Self {
        Self {
            model,
            gpu_layers: OFFLOAD_ALL_LAYERS,
            threads,
            context_size,
        }
    }

    /// Configuration with no accelerator offload.
    pub fn cpu_only(model: ModelSource, threads: u32, context_size: u32) -> Self {
        Self {
            model,
            gpu_layers: OFFLOAD_NO_LAYERS,
            threads,
            context_size,
        }
    }

    /// Same configuration with a different offload setting.
    pub fn with_offload(mut self, offload: Offload) -> Self {
        self.gpu_layers = offload.as_gpu_layers();
        self
    }

    /// Decoded offload setting.
    ///
    /// Values below `-1` are treated as [`Offload::Max`]; [`validate`](Self::validate)
    /// rejects them before a run starts.
    pub fn offload(&self) -> Offload {
        match self.gpu_layers {
            OFFLOAD_NO_LAYERS => Offload::None,
            n if n > 0 => Offload::Layers(n as u32),
            _ => Offload::Max,
        }
    }

    /// Whether any layer is placed on the accelerator.
    pub fn uses_accelerator(&self) -> bool {
        self.offload() != Offload::None
    }

    /// Check the configuration before handing it to a loader.
    pub fn validate(&self) -> Result<()> {
        if self.model.repo_id.trim().is_empty() {
            return Err(Error::config("model.repo_id must not be empty"));
        }
        if self.model.filename.trim().is_empty() {
            return Err(Error::config("model.filename must not be empty"));
        }
        if self.gpu_layers < OFFLOAD_ALL_LAYERS {
            return Err(Error::config(format!(
                "gpu_layers must be -1 or greater, got {}",
                self.gpu_layers
            )));
        }
        if self.threads == 0 {
            return Err(Error::config("threads must be positive"));
        }
        if self.context_size == 0 {
            return Err(Error::config("context_size must be positive"));
        }
        Ok(())
    }
}

/// A loaded, resource-owning engine instance.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait EngineHandle: Send {
    /// Run chat completion over `conversation`.
    async fn generate(&mut self, conversation: &Conversation) -> Result<ChatCompletion>;

    /// Free the model and any accelerator memory it holds.
    ///
    /// Called exactly once; the handle is dropped right after.
    async fn release(&mut self) -> Result<()>;
}

/// Acquires engines for a configuration.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait EngineLoader: Send + Sync {
    /// Short backend name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Load the model described by `config`, downloading it if needed.
    async fn load(&self, config: &EngineConfig) -> Result<Box<dyn EngineHandle>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EngineConfig {
        EngineConfig::accelerated(ModelSource::default(), 8, DEFAULT_CONTEXT_SIZE)
    }

    #[test]
    fn test_offload_decoding() {
        let base = config();
        assert_eq!(base.offload(), Offload::Max);
        assert!(base.uses_accelerator());

        let cpu = base.clone().with_offload(Offload::None);
        assert_eq!(cpu.gpu_layers, 0);
        assert!(!cpu.uses_accelerator());

        let partial = base.with_offload(Offload::Layers(20));
        assert_eq!(partial.gpu_layers, 20);
        assert_eq!(partial.offload(), Offload::Layers(20));
    }

    #[test]
    fn test_cpu_only_constructor() {
        let cpu = EngineConfig::cpu_only(ModelSource::default(), 4, 2048);
        assert_eq!(cpu.offload(), Offload::None);
        assert_eq!(cpu.threads, 4);
        assert_eq!(cpu.context_size, 2048);
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut bad = config();
        bad.threads = 0;
        assert!(matches!(bad.validate(), Err(Error::Config(msg)) if msg.contains("threads")));

        let mut bad = config();
        bad.context_size = 0;
        assert!(matches!(bad.validate(), Err(Error::Config(msg)) if msg.contains("context_size")));

        let mut bad = config();
        bad.gpu_layers = -2;
        assert!(matches!(bad.validate(), Err(Error::Config(msg)) if msg.contains("gpu_layers")));

        let mut bad = config();
        bad.model.filename = "  ".to_string();
        assert!(matches!(bad.validate(), Err(Error::Config(msg)) if msg.contains("filename")));
    }

    #[test]
    fn test_model_source_display() {
        let source = ModelSource {
            repo_id: "org/repo".to_string(),
            filename: "model.gguf".to_string(),
        };
        assert_eq!(source.to_string(), "org/repo/model.gguf");
    }

    #[tokio::test]
    async fn test_mock_loader_hands_out_handle() {
        let mut loader = MockEngineLoader::new();
        loader.expect_load().times(1).returning(|_| {
            let mut handle = MockEngineHandle::new();
            handle
                .expect_generate()
                .returning(|_| Ok(ChatCompletion::from_text("ahoy")));
            handle.expect_release().returning(|| Ok(()));
            Ok(Box::new(handle) as Box<dyn EngineHandle>)
        });

        let mut engine = loader.load(&config()).await.unwrap();
        let text = engine
            .generate(&Conversation::default())
            .await
            .unwrap()
            .into_text()
            .unwrap();
        assert_eq!(text, "ahoy");
        engine.release().await.unwrap();
    }
}
