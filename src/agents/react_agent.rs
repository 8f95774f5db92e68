//! Bounded ReAct loop: Thought, Action, Observation.
//!
//! Each round requests a completion, classifies it with
//! [`parser::parse`](super::parser::parse), and either returns the
//! `<response>` content or runs the requested tools and feeds their results
//! back as an `<observation>` turn.

use std::sync::Arc;

use serde_json::Value;

use super::parser::{self, AgentStep};
use crate::llms::base_llm::BaseLLM;
use crate::tools::base_tool::{ensure_unique_names, tool_signatures, BaseTool};
use crate::tools::tool_usage::ToolUsage;
use crate::utilities::completions::{build_prompt_structure, ChatBuffer, ChatHistory, Message, Role};
use crate::utilities::errors::AgentError;
use crate::utilities::extraction::extract_tag_content;
use crate::utilities::logger::Logger;
use crate::utilities::printer::PrinterColor;
use crate::utilities::prompts::{
    react_system_prompt, OBSERVATION_TAG, QUESTION_TAG, RESPONSE_TAG,
};

/// Default round budget.
pub const DEFAULT_MAX_ROUNDS: usize = 10;

/// Reactive-planning agent over a fixed tool set.
#[derive(Debug, Clone)]
pub struct ReactAgent {
    llm: Arc<dyn BaseLLM>,
    tools: Vec<Arc<dyn BaseTool>>,
    system_prompt: String,
    max_rounds: usize,
    logger: Logger,
}

impl ReactAgent {
    pub fn new(llm: Arc<dyn BaseLLM>, tools: Vec<Arc<dyn BaseTool>>) -> Self {
        Self {
            llm,
            tools,
            system_prompt: String::new(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            logger: Logger::default(),
        }
    }

    /// Instructions placed ahead of the tool protocol in the system message.
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Round budget; at least one round always runs.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.logger = Logger::new(verbose);
        self
    }

    pub fn tools(&self) -> &[Arc<dyn BaseTool>] {
        &self.tools
    }

    /// Run the loop for `user_msg` and return the final answer.
    ///
    /// Without tools this is a single completion, unwrapped from `<response>`
    /// tags when present. With tools, an exhausted round budget returns the
    /// last completion verbatim. Tools sharing a name are rejected before
    /// the model is called.
    pub fn run(&self, user_msg: &str) -> Result<String, AgentError> {
        ensure_unique_names(&self.tools)?;
        if self.tools.is_empty() {
            return self.answer_directly(user_msg);
        }

        let mut history = ChatHistory::new(vec![
            Message::system(react_system_prompt(
                &self.system_prompt,
                &tool_signatures(&self.tools),
            )),
            build_prompt_structure(Role::User, user_msg, Some(QUESTION_TAG)),
        ]);
        let usage = ToolUsage::new(&self.tools, &self.logger);
        let mut last_completion = String::new();

        for round in 1..=self.max_rounds {
            self.logger.step(round, self.max_rounds);
            let completion = self.llm.call(history.messages())?;
            let step = parser::parse(&completion)?;
            log::debug!("react round {}/{}: {}", round, self.max_rounds, step.kind());

            match step {
                AgentStep::Response(answer) => {
                    self.logger.block("Response:", &answer, PrinterColor::Blue);
                    return Ok(answer);
                }
                AgentStep::ThoughtWithCalls { thought, calls } => {
                    self.logger.block("Thought:", &thought, PrinterColor::Magenta);
                    history.append(Message::assistant(completion.as_str()));
                    let observations = usage.execute(&calls)?;
                    let observation = Value::Object(observations).to_string();
                    self.logger
                        .block("Observations:", &observation, PrinterColor::Blue);
                    history.append(build_prompt_structure(
                        Role::User,
                        &observation,
                        Some(OBSERVATION_TAG),
                    ));
                }
                AgentStep::ThoughtOnly { thought } => {
                    self.logger.block("Thought:", &thought, PrinterColor::Magenta);
                    history.append(Message::assistant(completion.as_str()));
                    log::debug!("react round {} produced neither a response nor tool calls", round);
                }
            }
            last_completion = completion;
        }

        log::warn!(
            "react loop exhausted {} rounds without a response; returning last completion",
            self.max_rounds
        );
        Ok(last_completion)
    }

    fn answer_directly(&self, user_msg: &str) -> Result<String, AgentError> {
        let mut messages = Vec::with_capacity(2);
        if !self.system_prompt.is_empty() {
            messages.push(Message::system(self.system_prompt.as_str()));
        }
        messages.push(Message::user(user_msg));

        let completion = self.llm.call(&messages)?;
        let answer = match extract_tag_content(&completion, RESPONSE_TAG).first() {
            Some(inner) => inner.to_string(),
            None => completion,
        };
        self.logger.block("Response:", &answer, PrinterColor::Blue);
        Ok(answer)
    }
}
