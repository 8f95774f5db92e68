//! Completion collaborators.
//!
//! [`base_llm::BaseLLM`] is the interface the agents call. Providers live
//! under [`providers`]; [`scripted::ScriptedLLM`] answers from a script.

pub mod base_llm;
pub mod providers;
pub mod scripted;

pub use base_llm::BaseLLM;
pub use providers::deepseek::DeepSeekCompletion;
pub use scripted::ScriptedLLM;
