//! One-shot tool agent.
//!
//! A single tool-calling completion decides which tools to run; a second
//! completion answers the user with the observations in view.

use std::sync::Arc;

use serde_json::Value;

use crate::llms::base_llm::BaseLLM;
use crate::tools::base_tool::{ensure_unique_names, tool_signatures, BaseTool};
use crate::tools::tool_calling::ToolCall;
use crate::tools::tool_usage::ToolUsage;
use crate::utilities::completions::{ChatBuffer, ChatHistory, Message};
use crate::utilities::errors::AgentError;
use crate::utilities::extraction::extract_tag_content;
use crate::utilities::logger::Logger;
use crate::utilities::printer::PrinterColor;
use crate::utilities::prompts::{tool_system_prompt, TOOL_CALL_TAG};

#[derive(Debug, Clone)]
pub struct ToolAgent {
    llm: Arc<dyn BaseLLM>,
    tools: Vec<Arc<dyn BaseTool>>,
    logger: Logger,
}

impl ToolAgent {
    pub fn new(llm: Arc<dyn BaseLLM>, tools: Vec<Arc<dyn BaseTool>>) -> Self {
        Self {
            llm,
            tools,
            logger: Logger::default(),
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.logger = Logger::new(verbose);
        self
    }

    /// Answer `user_msg`, running any tools the model asks for first.
    pub fn run(&self, user_msg: &str) -> Result<String, AgentError> {
        ensure_unique_names(&self.tools)?;
        let tool_history = ChatHistory::new(vec![
            Message::system(tool_system_prompt(&tool_signatures(&self.tools))),
            Message::user(user_msg),
        ]);
        let mut agent_history = ChatHistory::new(vec![Message::user(user_msg)]);

        let tool_completion = self.llm.call(tool_history.messages())?;
        let blocks = extract_tag_content(&tool_completion, TOOL_CALL_TAG);

        if blocks.found {
            let calls = ToolCall::parse_all(&blocks.content)?;
            log::debug!("tool agent dispatching {} call(s)", calls.len());
            let observations = ToolUsage::new(&self.tools, &self.logger).execute(&calls)?;
            let observation = Value::Object(observations).to_string();
            self.logger
                .block("Observations:", &observation, PrinterColor::Blue);
            agent_history.append(Message::user(format!("Observation: {}", observation)));
        } else {
            log::debug!("tool agent: no tool calls requested");
        }

        Ok(self.llm.call(agent_history.messages())?)
    }
}
