//! Agent node: one task, an optional tool set, and the context gathered from
//! the nodes it depends on.
//!
//! Dependency edges are not stored on the node; they live in the owning
//! [`Crew`](crate::crew::Crew), which pushes upstream outputs into a node's
//! context before running it.

use std::fmt;
use std::sync::Arc;

use super::utils::{create_task_prompt, AgentContext};
use crate::agents::react_agent::{ReactAgent, DEFAULT_MAX_ROUNDS};
use crate::llms::base_llm::BaseLLM;
use crate::tools::base_tool::BaseTool;
use crate::utilities::errors::AgentError;

/// A named unit of work in a crew.
#[derive(Clone)]
pub struct Agent {
    /// Human label. Not required to be unique.
    pub name: String,
    /// Persona, used as the system prompt.
    pub backstory: String,
    pub task_description: String,
    pub task_expected_output: String,
    tools: Vec<Arc<dyn BaseTool>>,
    llm: Arc<dyn BaseLLM>,
    max_rounds: usize,
    verbose: bool,
    context: Vec<AgentContext>,
    output: Option<String>,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("tools", &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field("model", &self.llm.model())
            .field("context", &self.context.len())
            .field("has_output", &self.output.is_some())
            .finish()
    }
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        backstory: impl Into<String>,
        task_description: impl Into<String>,
        task_expected_output: impl Into<String>,
        llm: Arc<dyn BaseLLM>,
    ) -> Self {
        Self {
            name: name.into(),
            backstory: backstory.into(),
            task_description: task_description.into(),
            task_expected_output: task_expected_output.into(),
            tools: Vec::new(),
            llm,
            max_rounds: DEFAULT_MAX_ROUNDS,
            verbose: false,
            context: Vec::new(),
            output: None,
        }
    }

    /// Builder method to add a tool.
    pub fn with_tool(mut self, tool: Arc<dyn BaseTool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Builder method to add several tools.
    pub fn with_tools(mut self, tools: impl IntoIterator<Item = Arc<dyn BaseTool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Builder method to set the ReAct round budget.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn tools(&self) -> &[Arc<dyn BaseTool>] {
        &self.tools
    }

    /// Upstream outputs received so far, in arrival order.
    pub fn context(&self) -> &[AgentContext] {
        &self.context
    }

    /// Result of the last successful run.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Record the output of an upstream node.
    pub fn receive_context(&mut self, producer: impl Into<String>, output: impl Into<String>) {
        self.context.push(AgentContext::new(producer, output));
    }

    /// The user message this node runs with.
    pub fn create_prompt(&self) -> String {
        create_task_prompt(&self.task_description, &self.task_expected_output, &self.context)
    }

    /// Run the task and store the result.
    ///
    /// A failed run leaves the previous output untouched.
    pub fn run(&mut self) -> Result<String, AgentError> {
        let prompt = self.create_prompt();
        log::info!(
            "agent '{}' running with {} tool(s) and {} context entr{}",
            self.name,
            self.tools.len(),
            self.context.len(),
            if self.context.len() == 1 { "y" } else { "ies" }
        );

        let output = ReactAgent::new(self.llm.clone(), self.tools.clone())
            .with_system_prompt(self.backstory.as_str())
            .with_max_rounds(self.max_rounds)
            .verbose(self.verbose)
            .run(&prompt)?;

        self.output = Some(output.clone());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llms::scripted::ScriptedLLM;
    use crate::tools::base_tool::{ParamKind, Tool, ToolParameter};
    use serde_json::Value;
    use std::sync::Mutex;

    fn poet(llm: Arc<dyn BaseLLM>) -> Agent {
        Agent::new(
            "Poet Agent",
            "You are a well-known poet.",
            "Write a poem about the meaning of life",
            "Just output the poem",
            llm,
        )
    }

    #[test]
    fn test_run_without_tools_is_single_completion() {
        let llm = ScriptedLLM::new(["<response>life is a river</response>"]).shared();
        let mut agent = poet(llm.clone());
        assert_eq!(agent.output(), None);

        assert_eq!(agent.run().unwrap(), "life is a river");
        assert_eq!(agent.output(), Some("life is a river"));

        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0].content, "You are a well-known poet.");
        assert!(calls[0][1].content.contains("Write a poem about the meaning of life"));
    }

    #[test]
    fn test_context_is_labelled_in_prompt() {
        let llm = ScriptedLLM::repeating("ok").shared();
        let mut agent = poet(llm.clone());
        agent.receive_context("Translator", "hola");
        agent.run().unwrap();
        assert!(llm.calls()[0][1]
            .content
            .contains("<context>\nOutput from Translator:\nhola\n</context>"));
    }

    #[test]
    fn test_run_with_tool() {
        let written = Arc::new(Mutex::new(String::new()));
        let sink = written.clone();
        let tool = Tool::new("write_str_to_txt", "Write a string to a file", move |args| {
            if let Ok(mut s) = sink.lock() {
                s.push_str(args["string_data"].as_str().unwrap_or_default());
            }
            Ok(Value::Null)
        })
        .with_parameter(ToolParameter::new("string_data", ParamKind::String))
        .with_parameter(ToolParameter::new("txt_filename", ParamKind::String))
        .into_shared();

        let llm = ScriptedLLM::new([
            r#"<tool_call>{"name": "write_str_to_txt", "arguments": {"string_data": "poem", "txt_filename": "p.txt"}, "id": 0}</tool_call>"#,
            "<response>written</response>",
        ])
        .shared();
        let mut agent = poet(llm).with_tool(tool);
        assert_eq!(agent.run().unwrap(), "written");
        assert_eq!(*written.lock().unwrap(), "poem");
    }

    #[test]
    fn test_failed_run_keeps_no_output() {
        let llm = ScriptedLLM::new(Vec::<String>::new()).shared();
        let mut agent = poet(llm);
        assert!(agent.run().is_err());
        assert_eq!(agent.output(), None);
    }
}
