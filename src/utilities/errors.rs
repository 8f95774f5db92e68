//! Error types for agents, tools, models and crews.
//!
//! Each layer owns one `thiserror` enum. Lower layers convert into higher ones
//! through `#[from]`, so the loops and the scheduler propagate with `?` and a
//! failed run yields a single error naming the node, tool or validation step.

use thiserror::Error;

/// Boxed error returned by tool callables.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Missing credential or model identifier, raised when a client is constructed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The API credential environment variable is unset and no key was passed.
    #[error("missing API credential: set {var} or pass an api key explicitly")]
    MissingCredential { var: String },

    /// The model identifier is empty.
    #[error("missing model identifier")]
    MissingModel,
}

// ---------------------------------------------------------------------------
// Tool arguments
// ---------------------------------------------------------------------------

/// A tool call whose arguments do not match the declared signature.
///
/// The wrapped callable is never invoked when one of these is produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("tool '{tool}' has no parameter named '{parameter}'")]
    UnknownParameter { tool: String, parameter: String },

    #[error("tool '{tool}' is missing required parameter '{parameter}'")]
    MissingParameter { tool: String, parameter: String },

    #[error("tool '{tool}' parameter '{parameter}' expects {expected}, got {found}")]
    TypeMismatch {
        tool: String,
        parameter: String,
        expected: String,
        found: String,
    },
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

/// Errors raised while dispatching a tool call.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The call names a tool outside the agent's declared set.
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    /// Two tools in one agent's set share a name.
    #[error("duplicate tool name '{0}'")]
    DuplicateTool(String),

    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// The wrapped callable itself failed.
    #[error("tool '{name}' failed: {source}")]
    Execution {
        name: String,
        #[source]
        source: BoxError,
    },
}

// ---------------------------------------------------------------------------
// Completion collaborator
// ---------------------------------------------------------------------------

/// Errors surfaced by a completion collaborator. Nothing here is retried.
#[derive(Debug, Error)]
pub enum LLMError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("invalid completion response: {0}")]
    InvalidResponse(String),

    /// The runtime driving a blocking call could not be started.
    #[error("runtime error: {0}")]
    Runtime(String),

    /// A scripted model ran out of canned completions.
    #[error("scripted model exhausted after {calls} calls")]
    Exhausted { calls: usize },
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// Errors raised by a tool-calling or reflection loop.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("completion failed: {0}")]
    Llm(#[from] LLMError),

    #[error("tool call failed: {0}")]
    Tool(#[from] ToolError),

    /// A `<tool_call>` block that is not a valid call object.
    #[error("malformed tool call ({reason}): {raw}")]
    MalformedToolCall { raw: String, reason: String },
}

impl From<ArgumentError> for AgentError {
    fn from(err: ArgumentError) -> Self {
        AgentError::Tool(ToolError::Argument(err))
    }
}

// ---------------------------------------------------------------------------
// Crews
// ---------------------------------------------------------------------------

/// Errors raised while building or running a crew.
#[derive(Debug, Error)]
pub enum CrewError {
    /// The edge set contains a cycle. No node was executed.
    #[error("cyclic dependency detected between agents: {}", agents.join(" -> "))]
    CyclicDependency { agents: Vec<String> },

    /// Misuse of the crew handle: a finished crew, or a handle from another crew.
    #[error("crew scope conflict: {0}")]
    ScopeConflict(String),

    /// A node failed. Outputs gathered before the failure are discarded.
    #[error("agent '{agent}' failed: {source}")]
    NodeExecution {
        agent: String,
        #[source]
        source: AgentError,
    },

    /// An invalid crew definition file.
    #[error("invalid crew definition: {0}")]
    Config(String),
}
