//! Crew sub-modules: the dependency graph, run results and YAML definitions.

pub mod crew_config;
pub mod crew_output;
pub mod graph;

pub use crew_config::{AgentConfig, CrewConfig};
pub use crew_output::CrewOutput;
pub use graph::DependencyGraph;
