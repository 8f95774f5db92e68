//! Completion collaborator interface.
//!
//! Agents see a model as a function from an ordered message sequence to one
//! text response. Implementations surface failures as [`LLMError`] and never
//! retry on their own.

use std::fmt;

use async_trait::async_trait;

use crate::utilities::completions::Message;
use crate::utilities::errors::LLMError;

// ---------------------------------------------------------------------------
// BaseLLM trait
// ---------------------------------------------------------------------------

/// A chat-completion model.
///
/// `call` is the blocking entry point the loops use. `acall` defaults to
/// `call`; network-backed providers override it with the real request and
/// drive it from `call` on a private runtime, so `call` must not be invoked
/// from inside an async task.
#[async_trait]
pub trait BaseLLM: Send + Sync + fmt::Debug {
    /// Model identifier sent with each request.
    fn model(&self) -> &str;

    /// Request one completion over `messages` (blocking).
    fn call(&self, messages: &[Message]) -> Result<String, LLMError>;

    /// Request one completion over `messages` (asynchronous).
    async fn acall(&self, messages: &[Message]) -> Result<String, LLMError> {
        self.call(messages)
    }

    /// Provider name for logs.
    fn provider(&self) -> &str {
        "custom"
    }
}
