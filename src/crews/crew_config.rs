//! YAML crew definitions.
//!
//! ```yaml
//! agents:
//!   - name: Poet Agent
//!     backstory: You are a well-known poet.
//!     task_description: Write a poem about the meaning of life
//!     task_expected_output: Just output the poem
//!   - name: Translator Agent
//!     backstory: You are a translator.
//!     task_description: Translate the poem into Spanish
//!     depends_on: [Poet Agent]
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agent::core::Agent;
use crate::crew::{AgentId, Crew};
use crate::llms::base_llm::BaseLLM;
use crate::tools::base_tool::BaseTool;
use crate::utilities::errors::CrewError;

/// One agent entry of a crew definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    pub backstory: String,
    pub task_description: String,
    #[serde(default)]
    pub task_expected_output: String,
    /// Names of agents this one runs after.
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub max_rounds: Option<usize>,
    #[serde(default)]
    pub verbose: bool,
}

/// A parsed crew definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewConfig {
    pub agents: Vec<AgentConfig>,
}

impl CrewConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, CrewError> {
        serde_yaml::from_str(yaml).map_err(|e| CrewError::Config(e.to_string()))
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CrewError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| CrewError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&yaml)
    }

    /// Register every agent in file order and wire `depends_on` edges.
    ///
    /// `tools_for` is asked for the tools of each agent by name. Returns the
    /// open crew and the handles in file order.
    pub fn build<F>(
        &self,
        llm: Arc<dyn BaseLLM>,
        tools_for: F,
    ) -> Result<(Crew, Vec<AgentId>), CrewError>
    where
        F: Fn(&str) -> Vec<Arc<dyn BaseTool>>,
    {
        let mut crew = Crew::new();
        let mut by_name: HashMap<&str, AgentId> = HashMap::with_capacity(self.agents.len());
        let mut ids = Vec::with_capacity(self.agents.len());

        for entry in &self.agents {
            let mut agent = Agent::new(
                entry.name.as_str(),
                entry.backstory.as_str(),
                entry.task_description.as_str(),
                entry.task_expected_output.as_str(),
                llm.clone(),
            )
            .with_tools(tools_for(&entry.name))
            .verbose(entry.verbose);
            if let Some(max_rounds) = entry.max_rounds {
                agent = agent.with_max_rounds(max_rounds);
            }

            let id = crew.add_agent(agent)?;
            if by_name.insert(entry.name.as_str(), id).is_some() {
                return Err(CrewError::Config(format!(
                    "duplicate agent name '{}'",
                    entry.name
                )));
            }
            ids.push(id);
        }

        for (entry, &id) in self.agents.iter().zip(&ids) {
            for dependency in &entry.depends_on {
                let upstream = by_name.get(dependency.as_str()).ok_or_else(|| {
                    CrewError::Config(format!(
                        "agent '{}' depends on unknown agent '{}'",
                        entry.name, dependency
                    ))
                })?;
                crew.depends_on(id, *upstream)?;
            }
        }

        log::debug!("built crew {} from definition with {} agent(s)", crew.id, ids.len());
        Ok((crew, ids))
    }
}
