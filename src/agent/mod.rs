//! Agent nodes: the units of work a [`Crew`](crate::crew::Crew) schedules.

pub mod core;
pub mod utils;

// Re-export the main Agent type.
pub use self::core::Agent;
pub use self::utils::AgentContext;
