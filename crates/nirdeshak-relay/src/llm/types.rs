//! Wire types for the chat-completion API.
//!
//! The relay only ever sends plain text turns, so these are much narrower
//! than a general LLM message model: a role, a content string, and the
//! request envelope around them.

use serde::{Deserialize, Serialize};

/// Sampling temperature sent with every completion request.
pub const TEMPERATURE: f32 = 0.7;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// The role of a participant in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Fixed instructions that shape model behavior.
    System,
    /// Input from the person using the frontend.
    User,
    /// A previous reply from the model.
    Assistant,
}

/// One role-tagged turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Chat request
// ---------------------------------------------------------------------------

/// A complete chat-completion request body.
///
/// Built fresh for each call and never reused.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// The model identifier (e.g. `"gpt-4o"`).
    pub model: String,

    /// The conversation, system turn first.
    pub messages: Vec<Message>,

    /// Sampling temperature.
    pub temperature: f32,
}

impl ChatRequest {
    /// Create a request for `model` with the fixed relay temperature.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: TEMPERATURE,
        }
    }
}
