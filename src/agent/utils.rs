//! Prompt assembly for agent nodes.

use serde::{Deserialize, Serialize};

use crate::utilities::prompts::agent_task_prompt;

/// One upstream output handed to a dependent node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentContext {
    /// Name of the node that produced `output`.
    pub producer: String,
    pub output: String,
}

impl AgentContext {
    pub fn new(producer: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            producer: producer.into(),
            output: output.into(),
        }
    }
}

/// Render context entries, each labelled with its producer, separated by a
/// blank line. Empty context renders as an empty string.
pub fn format_context(context: &[AgentContext]) -> String {
    context
        .iter()
        .map(|entry| format!("Output from {}:\n{}", entry.producer, entry.output))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the user message an agent node runs with.
pub fn create_task_prompt(
    task_description: &str,
    expected_output: &str,
    context: &[AgentContext],
) -> String {
    agent_task_prompt(task_description, expected_output, &format_context(context))
}
