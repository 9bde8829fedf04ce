// Copyright 2025 Offload Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark configuration.
//!
//! Values are layered, lowest priority first:
//!
//! 1. Built-in defaults ([`BenchConfig::default`])
//! 2. A TOML file (`offload-bench.toml` when present, or an explicit path)
//! 3. Environment variables prefixed with `OFFLOAD_BENCH_`, using `__` to
//!    reach nested keys (`OFFLOAD_BENCH_MODEL__REPO_ID`)
//!
//! Command-line flags are applied on top by the CLI.

use crate::conversation::{Conversation, Message};
use crate::engine::{
    EngineConfig, ModelSource, DEFAULT_CONTEXT_SIZE, OFFLOAD_ALL_LAYERS, OFFLOAD_NO_LAYERS,
};
use crate::error::{Error, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "offload-bench.toml";

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "OFFLOAD_BENCH";

/// Default directory for result files.
pub const DEFAULT_OUTPUT_DIR: &str = "benchmarks/output";

/// Default inference backend.
pub const DEFAULT_BACKEND: &str = "mistralrs";

/// One side of the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Label printed in reports.
    pub label: String,
    /// Layers to offload: `-1` maximizes, `0` disables.
    pub gpu_layers: i32,
}

/// Fully resolved benchmark settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Engine backend name.
    pub backend: String,
    /// Model artifact shared by both runs.
    pub model: ModelSource,
    /// CPU threads for both runs.
    pub threads: u32,
    /// Context window for both runs.
    pub context_size: u32,
    /// Offloaded run, executed first.
    pub accelerated: ProfileConfig,
    /// CPU-only run, executed second.
    pub baseline: ProfileConfig,
    /// Directory receiving result files.
    pub output_dir: PathBuf,
    /// Conversation sent to the engine; the built-in pirate chat when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Vec<Message>>,
    /// Canned reply for the `scripted` backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scripted_response: Option<String>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            backend: DEFAULT_BACKEND.to_string(),
            model: ModelSource::default(),
            threads: default_threads(),
            context_size: DEFAULT_CONTEXT_SIZE,
            accelerated: ProfileConfig {
                label: "GPU".to_string(),
                gpu_layers: OFFLOAD_ALL_LAYERS,
            },
            baseline: ProfileConfig {
                label: "CPU".to_string(),
                gpu_layers: OFFLOAD_NO_LAYERS,
            },
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            conversation: None,
            scripted_response: None,
        }
    }
}

/// Number of logical CPUs, falling back to one.
pub fn default_threads() -> u32 {
    std::thread::available_parallelism()
        .map(|n| u32::try_from(n.get()).unwrap_or(u32::MAX))
        .unwrap_or(1)
}

impl BenchConfig {
    /// Load configuration from defaults, an optional file, and the process environment.
    ///
    /// When `path` is `None`, `offload-bench.toml` is read if it exists.
    /// An explicit `path` must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, Self::environment())
    }

    /// Like [`load`](Self::load) with a caller-supplied environment source.
    pub fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: BenchConfig = Config::builder()
            .add_source(Config::try_from(&BenchConfig::default())?)
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        debug!(
            backend = %config.backend,
            model = %config.model,
            threads = config.threads,
            context_size = config.context_size,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Environment source for `OFFLOAD_BENCH_*` variables.
    pub fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// The conversation as a validated value.
    pub fn conversation(&self) -> Result<Conversation> {
        match &self.conversation {
            Some(messages) => Conversation::new(messages.clone()),
            None => Ok(Conversation::default()),
        }
    }

    /// Engine settings for one profile.
    pub fn engine_config(&self, profile: &ProfileConfig) -> EngineConfig {
        EngineConfig {
            model: self.model.clone(),
            gpu_layers: profile.gpu_layers,
            threads: self.threads,
            context_size: self.context_size,
        }
    }

    /// Check every field that would otherwise fail late inside a run.
    pub fn validate(&self) -> Result<()> {
        if self.backend.trim().is_empty() {
            return Err(Error::config("backend must not be empty"));
        }
        for profile in [&self.accelerated, &self.baseline] {
            if profile.label.trim().is_empty() {
                return Err(Error::config("profile label must not be empty"));
            }
            self.engine_config(profile).validate()?;
        }
        if self.accelerated.label == self.baseline.label {
            return Err(Error::config(format!(
                "profile labels must differ, both are '{}'",
                self.accelerated.label
            )));
        }
        self.conversation()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;
    use std::collections::HashMap;
    use std::io::Write;

    fn no_env() -> Environment {
        BenchConfig::environment().source(Some(HashMap::new()))
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        BenchConfig::environment().source(Some(map))
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = BenchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.accelerated.gpu_layers, -1);
        assert_eq!(config.baseline.gpu_layers, 0);
        assert_eq!(config.context_size, 8192);
        assert!(config.threads >= 1);
        assert_eq!(config.conversation().unwrap(), Conversation::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = write_config(
            r#"
            backend = "scripted"
            threads = 3
            scripted_response = "Arr!"

            [model]
            repo_id = "org/tiny"
            filename = "tiny.Q4_K_M.gguf"

            [accelerated]
            label = "CUDA"
            gpu_layers = 16

            [[conversation]]
            role = "user"
            content = "Say hi."
            "#,
        );

        let config = BenchConfig::load_with_env(Some(file.path()), no_env()).unwrap();
        assert_eq!(config.backend, "scripted");
        assert_eq!(config.threads, 3);
        assert_eq!(config.model.repo_id, "org/tiny");
        assert_eq!(config.accelerated.label, "CUDA");
        assert_eq!(config.accelerated.gpu_layers, 16);
        assert_eq!(config.baseline.label, "CPU");
        assert_eq!(config.context_size, 8192);
        assert_eq!(config.scripted_response.as_deref(), Some("Arr!"));
        let conversation = config.conversation().unwrap();
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.messages()[0].role, Role::User);
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = write_config("threads = 3\n");
        let config = BenchConfig::load_with_env(
            Some(file.path()),
            env(&[
                ("OFFLOAD_BENCH_THREADS", "12"),
                ("OFFLOAD_BENCH_MODEL__FILENAME", "other.gguf"),
            ]),
        )
        .unwrap();
        assert_eq!(config.threads, 12);
        assert_eq!(config.model.filename, "other.gguf");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = BenchConfig::load_with_env(
            Some(Path::new("/nonexistent/offload-bench.toml")),
            no_env(),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_values_rejected_on_load() {
        let file = write_config("context_size = 0\n");
        let result = BenchConfig::load_with_env(Some(file.path()), no_env());
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("context_size")));
    }

    #[test]
    fn test_empty_conversation_rejected() {
        let mut config = BenchConfig::default();
        config.conversation = Some(Vec::new());
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let mut config = BenchConfig::default();
        config.baseline.label = config.accelerated.label.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_engine_config_per_profile() {
        let config = BenchConfig::default();
        let accelerated = config.engine_config(&config.accelerated);
        let baseline = config.engine_config(&config.baseline);
        assert!(accelerated.uses_accelerator());
        assert!(!baseline.uses_accelerator());
        assert_eq!(accelerated.model, baseline.model);
        assert_eq!(accelerated.threads, baseline.threads);
    }
}
