//! Chat messages and conversation buffers.
//!
//! [`ChatHistory`] grows without bound. [`FixedFirstChatHistory`] keeps its
//! first message pinned and evicts the oldest message after it once the cap
//! is reached, which bounds context growth in the reflection loop.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        f.write_str(s)
    }
}

/// A single role-tagged chat message. Serializes to the
/// `{"role": ..., "content": ...}` shape chat-completion APIs accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// The role is fixed at creation.
    pub fn role(&self) -> Role {
        self.role
    }
}

/// Build a message, optionally wrapping its content in `<tag>...</tag>`.
pub fn build_prompt_structure(role: Role, content: &str, tag: Option<&str>) -> Message {
    match tag {
        Some(tag) => Message::new(role, format!("<{tag}>{content}</{tag}>")),
        None => Message::new(role, content),
    }
}

// ---------------------------------------------------------------------------
// Buffers
// ---------------------------------------------------------------------------

/// Ordered, append-only view over a conversation.
pub trait ChatBuffer {
    fn append(&mut self, message: Message);

    fn messages(&self) -> &[Message];

    fn len(&self) -> usize {
        self.messages().len()
    }

    fn is_empty(&self) -> bool {
        self.messages().is_empty()
    }
}

/// Unbounded conversation buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatHistory {
    messages: Vec<Message>,
}

impl ChatHistory {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

impl ChatBuffer for ChatHistory {
    fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    fn messages(&self) -> &[Message] {
        &self.messages
    }
}

/// Length-capped buffer whose first message is never evicted.
///
/// `len() <= max_length` holds after every mutation. Seed messages beyond the
/// cap are dropped from the front, keeping the head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedFirstChatHistory {
    messages: Vec<Message>,
    max_length: usize,
}

impl FixedFirstChatHistory {
    /// Smallest cap that leaves room for the pinned head plus one turn.
    pub const MIN_LENGTH: usize = 2;

    pub fn new(messages: Vec<Message>, max_length: usize) -> Self {
        let mut history = Self {
            messages: Vec::with_capacity(max_length),
            max_length: max_length.max(Self::MIN_LENGTH),
        };
        for message in messages {
            history.append(message);
        }
        history
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl ChatBuffer for FixedFirstChatHistory {
    fn append(&mut self, message: Message) {
        if self.messages.len() >= self.max_length {
            self.messages.remove(1);
        }
        self.messages.push(message);
    }

    fn messages(&self) -> &[Message] {
        &self.messages
    }
}
