// Copyright 2025 Offload Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chat conversation payloads and the completion shape returned by engines.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// System prompt of the benchmark conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an assistant who perfectly describes large \
language models while imitating the speech style of pirates.";

/// User prompt of the benchmark conversation.
pub const DEFAULT_USER_PROMPT: &str = "Tell me what a LLM is.";

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions describing how the model should behave.
    System,
    /// The human side of the conversation.
    User,
    /// A previous model reply.
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single `{role, content}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote the message.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl Message {
    /// Create a message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

/// Ordered sequence of messages handed to an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Message>", into = "Vec<Message>")]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Build a conversation from messages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `messages` is empty.
    pub fn new(messages: Vec<Message>) -> Result<Self> {
        if messages.is_empty() {
            return Err(Error::config("conversation must contain at least one message"));
        }
        Ok(Self { messages })
    }

    /// Messages in order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false for a constructed conversation.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl TryFrom<Vec<Message>> for Conversation {
    type Error = Error;

    fn try_from(messages: Vec<Message>) -> Result<Self> {
        Self::new(messages)
    }
}

impl From<Conversation> for Vec<Message> {
    fn from(conversation: Conversation) -> Self {
        conversation.messages
    }
}

impl Default for Conversation {
    /// The two-turn pirate conversation used by every benchmark run.
    fn default() -> Self {
        Self {
            messages: vec![
                Message::system(DEFAULT_SYSTEM_PROMPT),
                Message::user(DEFAULT_USER_PROMPT),
            ],
        }
    }
}

/// Message inside a completion choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    /// Generated text.
    pub content: String,
}

/// One candidate completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// The generated message.
    pub message: ChoiceMessage,
}

/// Completion returned by an engine: `{ choices: [{ message: { content } }] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletion {
    /// Candidate completions, best first.
    pub choices: Vec<Choice>,
}

impl ChatCompletion {
    /// Completion with a single choice holding `content`.
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                message: ChoiceMessage {
                    content: content.into(),
                },
            }],
        }
    }

    /// Flatten to the first choice's text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GenerationFailure`] when the engine produced no choices.
    pub fn into_text(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::generation("engine returned no completion choices"))
    }
}
