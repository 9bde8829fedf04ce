// Copyright 2025 Offload Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! GGUF backend built on mistral.rs.
//!
//! The model file is fetched from the Hugging Face hub on first use and served
//! from the local hub cache afterwards. Accelerator offload needs the `cuda` or
//! `metal` feature; without one, offloaded runs fail to load instead of
//! quietly running on the CPU.
//!
//! mistral.rs places layers on devices itself, so only `none` and `max`
//! offload are accepted. Thread count and context window are left to
//! mistral.rs.

use async_trait::async_trait;
use mistralrs::{GgufModelBuilder, Model, TextMessageRole, TextMessages};
use offload_bench_core::conversation::{Choice, ChoiceMessage};
use offload_bench_core::{
    ChatCompletion, Conversation, EngineConfig, EngineHandle, EngineLoader, Error, Offload,
    Result, Role,
};
use tracing::debug;

/// Whether this build carries accelerator kernels.
const ACCELERATOR_COMPILED: bool = cfg!(any(feature = "cuda", feature = "metal"));

/// Device the model weights are loaded onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Cpu,
    Accelerator,
}

/// Decide where `offload` puts the model.
///
/// Partial offload is a configuration error: mistral.rs maps layers itself.
/// Max offload without accelerator kernels is a load failure.
fn placement(offload: Offload, accelerator_compiled: bool) -> Result<Placement> {
    match offload {
        Offload::None => Ok(Placement::Cpu),
        Offload::Max if accelerator_compiled => Ok(Placement::Accelerator),
        Offload::Max => Err(Error::engine_load(
            "accelerator offload requested but mistralrs was built without the cuda or metal feature",
        )),
        Offload::Layers(layers) => Err(Error::config(format!(
            "mistralrs cannot offload exactly {layers} layers; use gpu_layers = -1 (max) or 0 (none)"
        ))),
    }
}

/// Loads GGUF models through mistral.rs.
#[derive(Debug, Default, Clone, Copy)]
pub struct MistralRsLoader;

impl MistralRsLoader {
    /// Create a loader.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EngineLoader for MistralRsLoader {
    fn name(&self) -> &'static str {
        "mistralrs"
    }

    async fn load(&self, config: &EngineConfig) -> Result<Box<dyn EngineHandle>> {
        let placement = placement(config.offload(), ACCELERATOR_COMPILED)?;

        let mut builder = GgufModelBuilder::new(
            config.model.repo_id.clone(),
            vec![config.model.filename.clone()],
        );
        if placement == Placement::Cpu {
            builder = builder.with_force_cpu();
        }
        debug!(
            ?placement,
            threads = config.threads,
            context_size = config.context_size,
            "thread count and context window are managed by mistralrs"
        );

        let model = builder.build().await.map_err(Error::engine_load)?;
        Ok(Box::new(MistralRsEngine { model: Some(model) }))
    }
}

/// A loaded mistral.rs model.
pub struct MistralRsEngine {
    model: Option<Model>,
}

fn text_role(role: Role) -> TextMessageRole {
    match role {
        Role::System => TextMessageRole::System,
        Role::User => TextMessageRole::User,
        Role::Assistant => TextMessageRole::Assistant,
    }
}

fn to_messages(conversation: &Conversation) -> TextMessages {
    conversation
        .messages()
        .iter()
        .fold(TextMessages::new(), |messages, message| {
            messages.add_message(text_role(message.role), message.content.clone())
        })
}

#[async_trait]
impl EngineHandle for MistralRsEngine {
    async fn generate(&mut self, conversation: &Conversation) -> Result<ChatCompletion> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| Error::generation("mistralrs model was released"))?;

        let response = model
            .send_chat_request(to_messages(conversation))
            .await
            .map_err(Error::generation)?;

        Ok(ChatCompletion {
            choices: response
                .choices
                .into_iter()
                .map(|choice| Choice {
                    message: ChoiceMessage {
                        content: choice.message.content.unwrap_or_default(),
                    },
                })
                .collect(),
        })
    }

    async fn release(&mut self) -> Result<()> {
        // Dropping the model tears down the engine and frees device memory.
        self.model.take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_offload_forces_cpu() {
        assert_eq!(placement(Offload::None, true).unwrap(), Placement::Cpu);
        assert_eq!(placement(Offload::None, false).unwrap(), Placement::Cpu);
    }

    #[test]
    fn test_max_offload_needs_accelerator_kernels() {
        assert_eq!(
            placement(Offload::Max, true).unwrap(),
            Placement::Accelerator
        );
        assert!(matches!(
            placement(Offload::Max, false),
            Err(Error::EngineLoadFailure(_))
        ));
    }

    #[test]
    fn test_partial_offload_rejected() {
        let err = placement(Offload::Layers(8), true).unwrap_err();
        assert!(matches!(&err, Error::Config(msg) if msg.contains("8 layers")));
    }

    #[tokio::test]
    async fn test_partial_offload_fails_before_download() {
        let config = EngineConfig::accelerated(offload_bench_core::ModelSource::default(), 4, 512)
            .with_offload(Offload::Layers(8));
        let result = MistralRsLoader::new().load(&config).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_role_mapping() {
        assert!(matches!(text_role(Role::System), TextMessageRole::System));
        assert!(matches!(text_role(Role::User), TextMessageRole::User));
        assert!(matches!(
            text_role(Role::Assistant),
            TextMessageRole::Assistant
        ));
    }
}
