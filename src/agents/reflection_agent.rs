//! Generate/reflect loop.
//!
//! A generator drafts, a critic reviews. The critic's stop marker ends the
//! loop with the current draft; otherwise the critique goes back to the
//! generator. Both conversations are capped so context stays bounded.

use std::sync::Arc;

use crate::llms::base_llm::BaseLLM;
use crate::utilities::completions::{ChatBuffer, FixedFirstChatHistory, Message};
use crate::utilities::errors::AgentError;
use crate::utilities::logger::Logger;
use crate::utilities::printer::PrinterColor;
use crate::utilities::prompts::{
    BASE_GENERATION_SYSTEM_PROMPT, BASE_REFLECTION_SYSTEM_PROMPT, REFLECTION_STOP_MARKER,
};

/// Default step budget.
pub const DEFAULT_REFLECTION_STEPS: usize = 10;
/// Cap on each conversation: the pinned system prompt plus two turns.
pub const REFLECTION_HISTORY_LENGTH: usize = 3;

/// Generate/reflect agent. The same model plays both roles.
#[derive(Debug, Clone)]
pub struct ReflectionAgent {
    llm: Arc<dyn BaseLLM>,
    generation_system_prompt: String,
    reflection_system_prompt: String,
    logger: Logger,
}

impl ReflectionAgent {
    pub fn new(llm: Arc<dyn BaseLLM>) -> Self {
        Self {
            llm,
            generation_system_prompt: String::new(),
            reflection_system_prompt: String::new(),
            logger: Logger::default(),
        }
    }

    /// Extra instructions for the generator, placed before the base prompt.
    pub fn with_generation_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.generation_system_prompt = prompt.into();
        self
    }

    /// Extra instructions for the critic, placed before the base prompt.
    pub fn with_reflection_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.reflection_system_prompt = prompt.into();
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.logger = Logger::new(verbose);
        self
    }

    /// Run up to `n_steps` generate/reflect rounds and return the last draft.
    pub fn run(&self, user_msg: &str, n_steps: usize) -> Result<String, AgentError> {
        let n_steps = n_steps.max(1);
        let mut generation = FixedFirstChatHistory::new(
            vec![
                Message::system(format!(
                    "{}{}",
                    self.generation_system_prompt, BASE_GENERATION_SYSTEM_PROMPT
                )),
                Message::user(user_msg),
            ],
            REFLECTION_HISTORY_LENGTH,
        );
        let mut reflection = FixedFirstChatHistory::new(
            vec![Message::system(format!(
                "{}{}",
                self.reflection_system_prompt, BASE_REFLECTION_SYSTEM_PROMPT
            ))],
            REFLECTION_HISTORY_LENGTH,
        );

        let mut draft = String::new();
        for step in 1..=n_steps {
            self.logger.step(step, n_steps);

            draft = self.llm.call(generation.messages())?;
            self.logger.block("GENERATION", &draft, PrinterColor::Blue);
            generation.append(Message::assistant(draft.as_str()));
            reflection.append(Message::user(draft.as_str()));

            let critique = self.llm.call(reflection.messages())?;
            self.logger.block("REFLECTION", &critique, PrinterColor::Green);

            if critique.contains(REFLECTION_STOP_MARKER) {
                log::debug!("reflection stop marker at step {}/{}", step, n_steps);
                self.logger.log(
                    "info",
                    "Stop sequence found. Stopping the reflection loop.",
                    Some(PrinterColor::Red),
                );
                return Ok(draft);
            }

            generation.append(Message::user(critique.as_str()));
            reflection.append(Message::assistant(critique));
        }

        log::debug!("reflection loop used all {} steps", n_steps);
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llms::scripted::ScriptedLLM;
    use crate::utilities::completions::Role;

    #[test]
    fn test_stop_marker_returns_first_draft() {
        let llm = ScriptedLLM::new(["draft one", "Looks great. <OK>"]).shared();
        let agent = ReflectionAgent::new(llm.clone());
        let result = agent.run("Write merge sort", DEFAULT_REFLECTION_STEPS).unwrap();
        assert_eq!(result, "draft one");
        assert_eq!(llm.call_count(), 2);

        let calls = llm.calls();
        assert_eq!(calls[1].len(), 2);
        assert_eq!(calls[1][1].role(), Role::User);
        assert_eq!(calls[1][1].content, "draft one");
    }

    #[test]
    fn test_exhausted_steps_return_last_draft() {
        let llm = ScriptedLLM::new(["v1", "fix a", "v2", "fix b"]).shared();
        let agent = ReflectionAgent::new(llm.clone());
        assert_eq!(agent.run("task", 2).unwrap(), "v2");
        assert_eq!(llm.call_count(), 4);
    }

    #[test]
    fn test_histories_stay_capped() {
        let llm = ScriptedLLM::new(["v1", "c1", "v2", "c2", "v3", "<OK>"]).shared();
        let agent = ReflectionAgent::new(llm.clone()).with_generation_prompt("You write code.");
        assert_eq!(agent.run("task", 5).unwrap(), "v3");

        let calls = llm.calls();
        for call in &calls {
            assert!(call.len() <= REFLECTION_HISTORY_LENGTH);
            assert_eq!(call[0].role(), Role::System);
        }
        // Third generation sees the pinned prompt, the previous draft and its critique.
        let third_generation = &calls[4];
        assert!(third_generation[0].content.starts_with("You write code."));
        assert_eq!(third_generation[1].content, "v2");
        assert_eq!(third_generation[2].content, "c2");
    }

    #[test]
    fn test_critic_failure_propagates() {
        let llm = ScriptedLLM::new(["draft"]).then_fail("boom").shared();
        let agent = ReflectionAgent::new(llm);
        assert!(matches!(agent.run("task", 3), Err(AgentError::Llm(_))));
    }
}
