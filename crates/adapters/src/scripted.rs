// Copyright 2025 Offload Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Fixed-response backend.
//!
//! Replies with a configured text instead of running a model. It enforces the
//! same one-engine-at-a-time rule as a real accelerator backend, so dry runs
//! exercise the harness's release ordering.

use async_trait::async_trait;
use offload_bench_core::{
    ChatCompletion, Conversation, EngineConfig, EngineHandle, EngineLoader, Error, Result,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Reply used when none is configured.
pub const DEFAULT_RESPONSE: &str =
    "Arr, a LLM be a great big parrot o' words, trained on the seven seas o' text!";

/// Loader handing out [`ScriptedEngine`]s.
#[derive(Debug, Clone)]
pub struct ScriptedLoader {
    response: String,
    live: Arc<AtomicUsize>,
    loads: Arc<AtomicUsize>,
}

impl ScriptedLoader {
    /// Create a loader whose engines reply with `response`.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            live: Arc::new(AtomicUsize::new(0)),
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Engines currently loaded and not yet released.
    pub fn live_engines(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Engines loaded so far.
    pub fn total_loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedLoader {
    fn default() -> Self {
        Self::new(DEFAULT_RESPONSE)
    }
}

#[async_trait]
impl EngineLoader for ScriptedLoader {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn load(&self, config: &EngineConfig) -> Result<Box<dyn EngineHandle>> {
        if self
            .live
            .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::engine_load(
                "another engine is still loaded; release it first",
            ));
        }
        self.loads.fetch_add(1, Ordering::SeqCst);
        debug!(gpu_layers = config.gpu_layers, "scripted engine loaded");

        Ok(Box::new(ScriptedEngine {
            response: self.response.clone(),
            live: Some(Arc::clone(&self.live)),
        }))
    }
}

/// Engine returning a fixed reply.
#[derive(Debug)]
pub struct ScriptedEngine {
    response: String,
    live: Option<Arc<AtomicUsize>>,
}

impl ScriptedEngine {
    fn free(&mut self) {
        if let Some(live) = self.live.take() {
            live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl EngineHandle for ScriptedEngine {
    async fn generate(&mut self, conversation: &Conversation) -> Result<ChatCompletion> {
        if self.live.is_none() {
            return Err(Error::generation("scripted engine was released"));
        }
        debug!(messages = conversation.len(), "scripted generation");
        Ok(ChatCompletion::from_text(self.response.clone()))
    }

    async fn release(&mut self) -> Result<()> {
        self.free();
        Ok(())
    }
}

impl Drop for ScriptedEngine {
    fn drop(&mut self) {
        self.free();
    }
}
