//! Prompt (conversation), message, cost, and ownership types for Parley.
//!
//! A prompt is one conversation. Messages are attached to it through
//! `PromptMessage` link rows whose integer id is the ordering key, so the
//! links for a prompt sorted by id reconstruct the conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use crate::llm::MessageRole;

/// A conversation owned by one or more users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: Uuid,
    pub name: String,
    /// Model identifier the prompt was created with.
    pub prompt_model: String,
    pub is_deleted: bool,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
}

impl Prompt {
    /// A fresh, visible, non-deleted prompt.
    pub fn new(name: impl Into<String>, prompt_model: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            prompt_model: prompt_model.into(),
            is_deleted: false,
            is_visible: true,
            created_at: Utc::now(),
        }
    }
}

/// A single chat turn. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    /// Tokens billed for this turn: input tokens for the user turn,
    /// output tokens for the reply.
    pub token_cost: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>, token_cost: Option<u32>) -> Self {
        Self {
            id: Uuid::now_v7(),
            role,
            content: content.into(),
            token_cost,
            created_at: Utc::now(),
        }
    }
}

/// Link between a prompt and one of its messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Monotonic ordering key assigned by storage.
    pub id: i64,
    pub prompt_id: Uuid,
    pub message_id: Uuid,
}

/// A link row joined with the message it points at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedMessage {
    pub link: PromptMessage,
    pub message: ChatMessage,
}

/// Cumulative token accounting for a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptCost {
    pub prompt_id: Uuid,
    pub total_input_cost: u64,
    pub total_output_cost: u64,
}

impl PromptCost {
    /// The zeroed record created alongside a prompt.
    pub fn zeroed(prompt_id: Uuid) -> Self {
        Self {
            prompt_id,
            total_input_cost: 0,
            total_output_cost: 0,
        }
    }
}

/// Ownership link between an (externally authenticated) user and a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPrompt {
    pub user_id: String,
    pub prompt_id: Uuid,
}

/// Listing projection of a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSummary {
    pub id: Uuid,
    pub name: String,
}

/// Listing projection of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    pub id: Uuid,
    pub content: String,
}

/// Input of a send: the new user message and the conversation it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessage {
    pub message: String,
    pub prompt_id: Uuid,
}

/// Output of a send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageReply {
    pub content: String,
}

/// Output of prompt creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPrompt {
    pub prompt_id: Uuid,
}
