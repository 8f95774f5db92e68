//! # agentic-patterns
//!
//! Agents that wrap chat-completion models, composed into dependency graphs.
//!
//! - [`Crew`] owns a set of [`Agent`] nodes and their dependency edges, and
//!   runs them one at a time in a deterministic topological order, handing
//!   every output to the nodes that depend on it.
//! - [`agents::ReactAgent`] drives the bounded Thought/Action/Observation
//!   loop over a set of [`tools::Tool`]s; [`agents::ToolAgent`] is its
//!   one-shot variant and [`agents::ReflectionAgent`] the generate/reflect
//!   loop.
//! - Models plug in through [`BaseLLM`]; [`llms::DeepSeekCompletion`] talks
//!   to the DeepSeek API and [`llms::ScriptedLLM`] replays canned replies.

pub mod agent;
pub mod agents;
pub mod crew;
pub mod crews;
pub mod llms;
pub mod tools;
pub mod utilities;

pub use agent::Agent;
pub use crew::{AgentId, Crew};
pub use crews::crew_output::CrewOutput;
pub use llms::base_llm::BaseLLM;
pub use utilities::errors::{AgentError, CrewError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
