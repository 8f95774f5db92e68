//! Crew: an owning registry of agent nodes plus their dependency graph.
//!
//! Nodes are registered explicitly through the crew handle and referred to by
//! [`AgentId`]. Running a crew validates the graph, orders the nodes and runs
//! them one at a time, pushing every output into the context of its
//! dependents before they start.

use std::fmt::Write as _;

use uuid::Uuid;

use crate::agent::core::Agent;
use crate::crews::crew_output::CrewOutput;
use crate::crews::graph::DependencyGraph;
use crate::utilities::errors::CrewError;

/// Handle to a node registered in a [`Crew`].
///
/// Only valid for the crew that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgentId {
    crew: Uuid,
    index: usize,
}

impl AgentId {
    /// Creation index within the owning crew.
    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CrewState {
    Open,
    Finished,
}

/// A set of agent nodes executed in dependency order.
///
/// # Example
///
/// ```ignore
/// let output = Crew::scope(|crew| {
///     let poet = crew.add_agent(poet_agent)?;
///     let translator = crew.add_agent(translator_agent)?;
///     crew.precedes(poet, translator)
/// })?;
/// println!("{}", output.get("Translator Agent").unwrap_or_default());
/// ```
#[derive(Debug)]
pub struct Crew {
    /// Unique identifier for the crew instance.
    pub id: Uuid,
    agents: Vec<Agent>,
    graph: DependencyGraph,
    state: CrewState,
}

impl Default for Crew {
    fn default() -> Self {
        Self::new()
    }
}

impl Crew {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            agents: Vec::new(),
            graph: DependencyGraph::new(),
            state: CrewState::Open,
        }
    }

    /// Open a crew, let `build` register nodes and edges, then run it once.
    ///
    /// The crew is consumed by the run, so it cannot be re-entered.
    pub fn scope<F>(build: F) -> Result<CrewOutput, CrewError>
    where
        F: FnOnce(&mut Crew) -> Result<(), CrewError>,
    {
        let mut crew = Crew::new();
        build(&mut crew)?;
        crew.run()
    }

    // ---------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------

    /// Register `agent` and return its handle.
    pub fn add_agent(&mut self, agent: Agent) -> Result<AgentId, CrewError> {
        self.ensure_open()?;
        let index = self.graph.add_node();
        log::debug!("crew {}: registered agent '{}' as #{}", self.id, agent.name, index);
        self.agents.push(agent);
        Ok(AgentId {
            crew: self.id,
            index,
        })
    }

    /// `dependent` runs after `dependency`. Declaring an edge twice is a no-op.
    ///
    /// Cycles are accepted here and rejected when the crew runs.
    pub fn depends_on(&mut self, dependent: AgentId, dependency: AgentId) -> Result<(), CrewError> {
        self.ensure_open()?;
        let downstream = self.resolve(dependent)?;
        let upstream = self.resolve(dependency)?;
        if !self.graph.add_edge(upstream, downstream) {
            log::debug!(
                "crew {}: edge '{}' -> '{}' already declared",
                self.id,
                self.agents[upstream].name,
                self.agents[downstream].name
            );
        }
        Ok(())
    }

    /// `upstream` runs before `downstream`.
    pub fn precedes(&mut self, upstream: AgentId, downstream: AgentId) -> Result<(), CrewError> {
        self.depends_on(downstream, upstream)
    }

    /// Declare `ids[0]` before `ids[1]` before `ids[2]`, and so on.
    pub fn chain(&mut self, ids: &[AgentId]) -> Result<(), CrewError> {
        for pair in ids.windows(2) {
            self.precedes(pair[0], pair[1])?;
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn agent(&self, id: AgentId) -> Result<&Agent, CrewError> {
        let index = self.resolve(id)?;
        Ok(&self.agents[index])
    }

    /// Registered agents in creation order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Nodes `id` must run after.
    pub fn dependencies(&self, id: AgentId) -> Result<Vec<AgentId>, CrewError> {
        let index = self.resolve(id)?;
        Ok(self.handles(self.graph.dependencies(index)))
    }

    /// Nodes that must run after `id`.
    pub fn dependents(&self, id: AgentId) -> Result<Vec<AgentId>, CrewError> {
        let index = self.resolve(id)?;
        Ok(self.handles(self.graph.dependents(index)))
    }

    pub fn is_finished(&self) -> bool {
        self.state == CrewState::Finished
    }

    /// Node name to dependent names, in creation order.
    pub fn edges(&self) -> Vec<(String, Vec<String>)> {
        self.agents
            .iter()
            .enumerate()
            .map(|(index, agent)| {
                let dependents = self
                    .graph
                    .dependents(index)
                    .into_iter()
                    .map(|d| self.agents[d].name.clone())
                    .collect();
                (agent.name.clone(), dependents)
            })
            .collect()
    }

    /// Render the graph as Graphviz DOT.
    pub fn plot(&self) -> String {
        let mut dot = String::from("digraph crew {\n    rankdir=LR;\n");
        for (index, agent) in self.agents.iter().enumerate() {
            let _ = writeln!(dot, "    n{} [label=\"{}\"];", index, escape_label(&agent.name));
        }
        for &(up, down) in self.graph.edges() {
            let _ = writeln!(dot, "    n{} -> n{};", up, down);
        }
        dot.push_str("}\n");
        dot
    }

    /// The order `run` would use, without running anything.
    pub fn execution_order(&self) -> Result<Vec<String>, CrewError> {
        let order = self.ordered()?;
        Ok(order.into_iter().map(|i| self.agents[i].name.clone()).collect())
    }

    // ---------------------------------------------------------------------
    // Execution
    // ---------------------------------------------------------------------

    /// Run every node once in dependency order.
    ///
    /// The crew is finished afterwards whatever the outcome. A cycle aborts
    /// before any node runs. A failing node aborts the run and no outputs are
    /// returned.
    pub fn run(&mut self) -> Result<CrewOutput, CrewError> {
        self.ensure_open()?;
        self.state = CrewState::Finished;

        let order = self.ordered()?;
        log::info!(
            "crew {}: running {} agent(s): {}",
            self.id,
            order.len(),
            order
                .iter()
                .map(|&i| self.agents[i].name.as_str())
                .collect::<Vec<_>>()
                .join(" -> ")
        );

        let mut output = CrewOutput::default();
        for index in order {
            let name = self.agents[index].name.clone();
            let result = self.agents[index]
                .run()
                .map_err(|source| CrewError::NodeExecution {
                    agent: name.clone(),
                    source,
                })?;

            for dependent in self.graph.dependents(index) {
                self.agents[dependent].receive_context(name.as_str(), result.as_str());
            }
            log::debug!("crew {}: agent '{}' finished", self.id, name);
            output.record(&name, &result);
        }
        Ok(output)
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn ordered(&self) -> Result<Vec<usize>, CrewError> {
        self.graph
            .topological_order()
            .map_err(|cycle| CrewError::CyclicDependency {
                agents: cycle
                    .into_iter()
                    .map(|i| self.agents[i].name.clone())
                    .collect(),
            })
    }

    fn ensure_open(&self) -> Result<(), CrewError> {
        match self.state {
            CrewState::Open => Ok(()),
            CrewState::Finished => Err(CrewError::ScopeConflict(format!(
                "crew {} has already run and cannot be reused",
                self.id
            ))),
        }
    }

    fn resolve(&self, id: AgentId) -> Result<usize, CrewError> {
        if id.crew != self.id || id.index >= self.agents.len() {
            return Err(CrewError::ScopeConflict(format!(
                "agent handle #{} does not belong to crew {}",
                id.index, self.id
            )));
        }
        Ok(id.index)
    }

    fn handles(&self, indices: Vec<usize>) -> Vec<AgentId> {
        indices
            .into_iter()
            .map(|index| AgentId {
                crew: self.id,
                index,
            })
            .collect()
    }
}

fn escape_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llms::base_llm::BaseLLM;
    use crate::llms::scripted::{call_journal, CallJournal, ScriptedLLM};
    use crate::utilities::errors::{AgentError, LLMError};
    use std::sync::Arc;

    fn node(name: &str, llm: Arc<dyn BaseLLM>) -> Agent {
        Agent::new(name, format!("You are {name}."), format!("Task of {name}"), "text", llm)
    }

    fn replying(journal: &CallJournal, name: &str, reply: &str) -> Arc<ScriptedLLM> {
        ScriptedLLM::repeating(reply).with_journal(journal, name).shared()
    }

    #[test]
    fn test_three_node_pipeline_propagates_context() {
        let journal = call_journal();
        let llm_c = ScriptedLLM::from_fn(|messages| {
            let prompt = &messages[messages.len() - 1].content;
            Ok(format!(
                "saw_a={} saw_b={}",
                prompt.contains("Output from A:\nOUT_A"),
                prompt.contains("Output from B:\nOUT_B")
            ))
        })
        .with_journal(&journal, "C")
        .shared();

        let mut crew = Crew::new();
        let a = crew.add_agent(node("A", replying(&journal, "A", "OUT_A"))).unwrap();
        let b = crew.add_agent(node("B", replying(&journal, "B", "OUT_B"))).unwrap();
        let c = crew.add_agent(node("C", llm_c.clone())).unwrap();
        crew.chain(&[a, b, c]).unwrap();
        crew.depends_on(c, a).unwrap();

        let output = crew.run().unwrap();
        assert_eq!(output.get("A"), Some("OUT_A"));
        assert_eq!(output.get("B"), Some("OUT_B"));
        assert_eq!(output.get("C"), Some("saw_a=true saw_b=true"));
        assert_eq!(*journal.lock().unwrap(), vec!["A", "B", "C"]);
        assert_eq!(output.execution_order(), ["A", "B", "C"]);

        let c_agent = crew.agent(c).unwrap();
        assert_eq!(c_agent.context().len(), 2);
        assert_eq!(c_agent.output(), Some("saw_a=true saw_b=true"));
    }

    #[test]
    fn test_cycle_runs_nothing() {
        let journal = call_journal();
        let mut crew = Crew::new();
        let a = crew.add_agent(node("A", replying(&journal, "A", "x"))).unwrap();
        let b = crew.add_agent(node("B", replying(&journal, "B", "y"))).unwrap();
        crew.precedes(a, b).unwrap();
        crew.precedes(b, a).unwrap();

        match crew.run() {
            Err(CrewError::CyclicDependency { agents }) => assert_eq!(agents, vec!["A", "B", "A"]),
            other => panic!("expected cycle, got {other:?}"),
        }
        assert!(journal.lock().unwrap().is_empty());
        assert!(crew.is_finished());
    }

    #[test]
    fn test_order_is_stable_and_follows_creation_index() {
        let journal = call_journal();
        let mut crew = Crew::new();
        let first = crew.add_agent(node("first", replying(&journal, "first", "1"))).unwrap();
        let _second = crew.add_agent(node("second", replying(&journal, "second", "2"))).unwrap();
        let third = crew.add_agent(node("third", replying(&journal, "third", "3"))).unwrap();
        crew.precedes(third, first).unwrap();

        let planned = crew.execution_order().unwrap();
        assert_eq!(planned, vec!["second", "third", "first"]);
        assert_eq!(crew.execution_order().unwrap(), planned);
        crew.run().unwrap();
        assert_eq!(*journal.lock().unwrap(), planned);
    }

    #[test]
    fn test_node_failure_discards_results() {
        let journal = call_journal();
        let failing = ScriptedLLM::new(Vec::<String>::new())
            .with_journal(&journal, "B")
            .shared();

        let mut crew = Crew::new();
        let a = crew.add_agent(node("A", replying(&journal, "A", "ok"))).unwrap();
        let b = crew.add_agent(node("B", failing)).unwrap();
        let c = crew.add_agent(node("C", replying(&journal, "C", "never"))).unwrap();
        crew.chain(&[a, b, c]).unwrap();

        match crew.run() {
            Err(CrewError::NodeExecution { agent, source }) => {
                assert_eq!(agent, "B");
                assert!(matches!(source, AgentError::Llm(LLMError::Exhausted { .. })));
            }
            other => panic!("expected node failure, got {other:?}"),
        }
        assert_eq!(*journal.lock().unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_finished_crew_is_not_reentrant() {
        let mut crew = Crew::new();
        let a = crew.add_agent(node("A", ScriptedLLM::repeating("x").shared())).unwrap();
        crew.run().unwrap();

        assert!(matches!(crew.run(), Err(CrewError::ScopeConflict(_))));
        assert!(matches!(
            crew.add_agent(node("B", ScriptedLLM::repeating("y").shared())),
            Err(CrewError::ScopeConflict(_))
        ));
        assert!(matches!(crew.depends_on(a, a), Err(CrewError::ScopeConflict(_))));
    }

    #[test]
    fn test_foreign_handle_is_rejected() {
        let mut one = Crew::new();
        let mut other = Crew::new();
        let a = one.add_agent(node("A", ScriptedLLM::repeating("x").shared())).unwrap();
        let b = other.add_agent(node("B", ScriptedLLM::repeating("y").shared())).unwrap();
        assert!(matches!(one.precedes(a, b), Err(CrewError::ScopeConflict(_))));
        assert!(matches!(other.dependents(a), Err(CrewError::ScopeConflict(_))));
    }

    #[test]
    fn test_dependency_views_and_edges() {
        let llm: Arc<dyn BaseLLM> = ScriptedLLM::repeating("x").shared();
        let mut crew = Crew::new();
        let poet = crew.add_agent(node("Poet", llm.clone())).unwrap();
        let translator = crew.add_agent(node("Translator", llm.clone())).unwrap();
        let writer = crew.add_agent(node("Writer", llm)).unwrap();
        crew.chain(&[poet, translator, writer]).unwrap();
        crew.precedes(poet, translator).unwrap();

        assert_eq!(crew.dependencies(translator).unwrap(), vec![poet]);
        assert_eq!(crew.dependents(translator).unwrap(), vec![writer]);
        assert_eq!(
            crew.edges(),
            vec![
                ("Poet".to_string(), vec!["Translator".to_string()]),
                ("Translator".to_string(), vec!["Writer".to_string()]),
                ("Writer".to_string(), vec![]),
            ]
        );

        let dot = crew.plot();
        assert!(dot.starts_with("digraph crew {"));
        assert!(dot.contains("n0 [label=\"Poet\"];"));
        assert!(dot.contains("n0 -> n1;"));
        assert!(dot.contains("n1 -> n2;"));
        assert_eq!(dot.matches("->").count(), 2);
        assert!(!crew.is_finished());
    }

    #[test]
    fn test_scope_runs_on_exit() {
        let journal = call_journal();
        let output = Crew::scope(|crew| {
            let a = crew.add_agent(node("A", replying(&journal, "A", "a")))?;
            let b = crew.add_agent(node("B", replying(&journal, "B", "b")))?;
            crew.precedes(a, b)
        })
        .unwrap();
        assert_eq!(output.len(), 2);
        assert_eq!(*journal.lock().unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_scope_build_error_runs_nothing() {
        let journal = call_journal();
        let result = Crew::scope(|crew| {
            crew.add_agent(node("A", replying(&journal, "A", "a")))?;
            Err(CrewError::Config("bad definition".into()))
        });
        assert!(matches!(result, Err(CrewError::Config(_))));
        assert!(journal.lock().unwrap().is_empty());
    }

    #[test]
    fn test_plot_escapes_quotes() {
        let mut crew = Crew::new();
        crew.add_agent(node("the \"best\" agent", ScriptedLLM::repeating("x").shared()))
            .unwrap();
        assert!(crew.plot().contains(r#"label="the \"best\" agent""#));
    }
}
