//! Dispatch of parsed tool calls against an agent's declared tools.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::base_tool::BaseTool;
use super::tool_calling::ToolCall;
use crate::utilities::errors::ToolError;
use crate::utilities::logger::Logger;
use crate::utilities::printer::PrinterColor;

/// Tool results keyed by the stringified call id.
pub type Observations = Map<String, Value>;

/// Runs tool calls against a fixed tool set.
#[derive(Debug)]
pub struct ToolUsage<'a> {
    tools: &'a [Arc<dyn BaseTool>],
    logger: &'a Logger,
}

impl<'a> ToolUsage<'a> {
    pub fn new(tools: &'a [Arc<dyn BaseTool>], logger: &'a Logger) -> Self {
        Self { tools, logger }
    }

    /// Look up a tool by name.
    pub fn find(&self, name: &str) -> Result<&'a Arc<dyn BaseTool>, ToolError> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// Execute `calls` in order and collect `{id: result}`.
    ///
    /// A later call with the same id overwrites the earlier entry. The first
    /// failing call aborts the batch.
    pub fn execute(&self, calls: &[ToolCall]) -> Result<Observations, ToolError> {
        let mut observations = Observations::new();
        for call in calls {
            let tool = self.find(&call.name)?;
            log::debug!("running tool '{}' (call id {})", call.name, call.id);
            self.logger.block(
                &format!("Using Tool: {}", call.name),
                &Value::Object(call.arguments.clone()).to_string(),
                PrinterColor::Green,
            );

            let result = tool.run(&call.arguments)?;
            self.logger
                .block("Tool result:", &result.to_string(), PrinterColor::Green);
            if observations.insert(call.id.to_string(), result).is_some() {
                log::warn!("duplicate tool call id {}; keeping the later result", call.id);
            }
        }
        Ok(observations)
    }
}
