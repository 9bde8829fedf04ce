// Copyright 2025 Offload Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Engine backends for offload-bench.
//!
//! Each backend implements [`EngineLoader`]. [`loader_for`] picks one by the
//! `backend` name in a [`BenchConfig`].
//!
//! | name | availability |
//! |------|--------------|
//! | `mistralrs` | `mistralrs` cargo feature (`cuda`/`metal` for offload) |
//! | `scripted` | always |

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

#[cfg(feature = "mistralrs")]
pub mod mistral;
pub mod scripted;

use offload_bench_core::{BenchConfig, EngineLoader, Error, Result};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "mistralrs")]
pub use mistral::MistralRsLoader;
pub use scripted::ScriptedLoader;

/// Known engine backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// GGUF models through mistral.rs.
    MistralRs,
    /// Fixed replies, no model.
    Scripted,
}

impl Backend {
    /// Every backend, compiled in or not.
    pub const ALL: [Backend; 2] = [Backend::MistralRs, Backend::Scripted];

    /// Name used in configuration.
    pub fn name(self) -> &'static str {
        match self {
            Backend::MistralRs => "mistralrs",
            Backend::Scripted => "scripted",
        }
    }

    /// Whether this binary was built with the backend.
    pub fn is_available(self) -> bool {
        match self {
            Backend::MistralRs => cfg!(feature = "mistralrs"),
            Backend::Scripted => true,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Backend::ALL
            .into_iter()
            .find(|backend| backend.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::config(format!(
                    "unknown backend '{}'; expected one of: {}",
                    s,
                    Backend::ALL.map(Backend::name).join(", ")
                ))
            })
    }
}

/// Names of the backends compiled into this binary.
pub fn available_backends() -> Vec<&'static str> {
    Backend::ALL
        .into_iter()
        .filter(|backend| backend.is_available())
        .map(Backend::name)
        .collect()
}

/// Build the loader selected by `config.backend`.
///
/// # Errors
///
/// Returns [`Error::Config`] for an unknown backend or one that was not
/// compiled in.
pub fn loader_for(config: &BenchConfig) -> Result<Box<dyn EngineLoader>> {
    let backend: Backend = config.backend.parse()?;
    match backend {
        Backend::Scripted => Ok(Box::new(match &config.scripted_response {
            Some(response) => ScriptedLoader::new(response.clone()),
            None => ScriptedLoader::default(),
        })),
        #[cfg(feature = "mistralrs")]
        Backend::MistralRs => Ok(Box::new(MistralRsLoader::new())),
        #[cfg(not(feature = "mistralrs"))]
        Backend::MistralRs => Err(Error::config(
            "backend 'mistralrs' is not compiled in; rebuild with --features mistralrs",
        )),
    }
}
