// Copyright 2025 Offload Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types shared across the offload-bench workspace.

use thiserror::Error;

/// Boxed error carried as the underlying cause of engine failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while timing an inference engine.
#[derive(Debug, Error)]
pub enum Error {
    /// A duration was negative or not finite.
    #[error("Invalid duration: {0} seconds")]
    InvalidDuration(f64),

    /// The engine raised an error while generating a completion.
    #[error("Generation failed: {0}")]
    GenerationFailure(#[source] BoxError),

    /// The engine or its model could not be acquired.
    #[error("Engine load failed: {0}")]
    EngineLoadFailure(#[source] BoxError),

    /// The engine could not free the resources it holds.
    #[error("Engine release failed: {0}")]
    EngineReleaseFailure(#[source] BoxError),

    /// Configuration was missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error while writing or reading results.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Results could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A report could not be rendered.
    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),
}

impl Error {
    /// Wrap an engine error raised during generation.
    pub fn generation(err: impl Into<BoxError>) -> Self {
        Self::GenerationFailure(err.into())
    }

    /// Wrap an engine error raised while loading.
    pub fn engine_load(err: impl Into<BoxError>) -> Self {
        Self::EngineLoadFailure(err.into())
    }

    /// Wrap an engine error raised while releasing.
    pub fn engine_release(err: impl Into<BoxError>) -> Self {
        Self::EngineReleaseFailure(err.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result type for offload-bench operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_failure_keeps_cause() {
        let err = Error::generation("out of memory");
        assert!(matches!(err, Error::GenerationFailure(_)));
        assert_eq!(err.to_string(), "Generation failed: out of memory");

        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("out of memory"));
    }

    #[test]
    fn test_invalid_duration_message() {
        let err = Error::InvalidDuration(-1.5);
        assert_eq!(err.to_string(), "Invalid duration: -1.5 seconds");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: Error = config::ConfigError::Message("bad value".to_string()).into();
        assert!(matches!(err, Error::Config(msg) if msg.contains("bad value")));
    }
}
