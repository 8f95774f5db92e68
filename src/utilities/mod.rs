//! Shared utilities: error types, tag extraction, chat buffers, prompt
//! templates and the verbose console trace.

pub mod completions;
pub mod errors;
pub mod extraction;
pub mod logger;
pub mod printer;
pub mod prompts;

// Re-exports for convenience
pub use completions::{ChatBuffer, ChatHistory, FixedFirstChatHistory, Message, Role};
pub use errors::{AgentError, ArgumentError, ConfigurationError, CrewError, LLMError, ToolError};
pub use extraction::{extract_tag_content, TagContent};
