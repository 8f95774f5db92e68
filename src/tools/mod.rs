//! Tools exposed to agents.
//!
//! This module provides the tool descriptor (`BaseTool`, `Tool`), the
//! `<tool_call>` wire format and the dispatcher that turns parsed calls into
//! observations.

pub mod base_tool;
pub mod tool_calling;
pub mod tool_usage;

// Re-exports for convenience
pub use base_tool::{ensure_unique_names, BaseTool, ParamKind, Tool, ToolParameter};
pub use tool_calling::ToolCall;
pub use tool_usage::{Observations, ToolUsage};
