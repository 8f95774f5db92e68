//! Parsing of tagged model output into a single loop step.
//!
//! A completion is classified as exactly one [`AgentStep`]: a terminal
//! response, a thought that requests tool calls, or a thought alone.

use crate::tools::tool_calling::ToolCall;
use crate::utilities::errors::AgentError;
use crate::utilities::extraction::extract_tags;
use crate::utilities::prompts::{RESPONSE_TAG, THOUGHT_TAG, TOOL_CALL_TAG};

/// One parsed model turn.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentStep {
    /// A `<response>` block was present; its content ends the loop.
    Response(String),
    /// No response, at least one `<tool_call>`.
    ThoughtWithCalls { thought: String, calls: Vec<ToolCall> },
    /// Neither a response nor tool calls.
    ThoughtOnly { thought: String },
}

impl AgentStep {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AgentStep::Response(_) => "response",
            AgentStep::ThoughtWithCalls { .. } => "thought_with_calls",
            AgentStep::ThoughtOnly { .. } => "thought_only",
        }
    }
}

/// Classify a completion.
///
/// The first `<response>` block wins over anything else in the text. Missing
/// thoughts parse as an empty string. Unparseable `<tool_call>` JSON is an
/// error rather than a skipped call.
pub fn parse(completion: &str) -> Result<AgentStep, AgentError> {
    let mut tags = extract_tags(completion, &[RESPONSE_TAG, THOUGHT_TAG, TOOL_CALL_TAG]);
    let mut take = |tag: &str| tags.remove(tag).unwrap_or_default();

    if let Some(answer) = take(RESPONSE_TAG).first() {
        return Ok(AgentStep::Response(answer.to_string()));
    }

    let thought = take(THOUGHT_TAG).first().unwrap_or_default().to_string();
    let calls = ToolCall::parse_all(&take(TOOL_CALL_TAG).content)?;

    if calls.is_empty() {
        Ok(AgentStep::ThoughtOnly { thought })
    } else {
        Ok(AgentStep::ThoughtWithCalls { thought, calls })
    }
}
