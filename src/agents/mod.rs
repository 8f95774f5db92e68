//! Agent loops.
//!
//! - [`react_agent`]: bounded Thought/Action/Observation loop.
//! - [`tool_agent`]: one tool-calling completion followed by an answer.
//! - [`reflection_agent`]: generate/reflect loop with a stop marker.

pub mod parser;
pub mod react_agent;
pub mod reflection_agent;
pub mod tool_agent;

// Re-exports for convenience
pub use parser::AgentStep;
pub use react_agent::ReactAgent;
pub use reflection_agent::ReflectionAgent;
pub use tool_agent::ToolAgent;
