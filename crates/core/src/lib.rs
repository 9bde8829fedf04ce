// Copyright 2025 Offload Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core types for offload-bench.
//!
//! This crate defines what the timing harness needs to talk about an
//! inference engine without depending on one:
//!
//! - [`engine`] - The [`EngineLoader`]/[`EngineHandle`] capability traits and [`EngineConfig`]
//! - [`conversation`] - Chat payloads and the completion shape engines return
//! - [`duration`] - Hours/minutes/seconds decomposition of elapsed time
//! - [`config`] - Layered benchmark configuration
//! - [`error`] - The shared [`Error`] type

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;
pub mod conversation;
pub mod duration;
pub mod engine;
pub mod error;

pub use config::{BenchConfig, ProfileConfig};
pub use conversation::{ChatCompletion, Conversation, Message, Role};
pub use duration::Hms;
pub use engine::{EngineConfig, EngineHandle, EngineLoader, ModelSource, Offload};
pub use error::{BoxError, Error, Result};

#[cfg(any(test, feature = "mock"))]
pub use engine::{MockEngineHandle, MockEngineLoader};
