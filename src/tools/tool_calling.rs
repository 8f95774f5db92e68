//! Tool call wire format.
//!
//! Each `<tool_call>` block holds one JSON object:
//! `{"name": <tool>, "arguments": {...}, "id": <int>}`.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::utilities::errors::AgentError;

/// A single parsed tool call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Map<String, Value>,
    /// Caller-assigned id; keys the call's observation.
    pub id: i64,
}

impl ToolCall {
    /// Parse one `<tool_call>` block. `position` is used as the id when the
    /// block carries none.
    pub fn parse(raw: &str, position: usize) -> Result<Self, AgentError> {
        let malformed = |reason: &str| AgentError::MalformedToolCall {
            raw: raw.to_string(),
            reason: reason.to_string(),
        };

        let value: Value =
            serde_json::from_str(raw.trim()).map_err(|e| malformed(&e.to_string()))?;
        let Value::Object(mut object) = value else {
            return Err(malformed("expected a JSON object"));
        };

        let name = match object.remove("name") {
            Some(Value::String(name)) if !name.is_empty() => name,
            _ => return Err(malformed("missing tool name")),
        };

        let arguments = match object.remove("arguments") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(arguments)) => arguments,
            // Some models send the arguments object as an encoded string.
            Some(Value::String(encoded)) => match serde_json::from_str(&encoded) {
                Ok(Value::Object(arguments)) => arguments,
                _ => return Err(malformed("arguments must be an object")),
            },
            Some(_) => return Err(malformed("arguments must be an object")),
        };

        let id = match object.remove("id") {
            None | Some(Value::Null) => position as i64,
            Some(Value::Number(n)) => n.as_i64().ok_or_else(|| malformed("id must be an integer"))?,
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map_err(|_| malformed("id must be an integer"))?,
            Some(_) => return Err(malformed("id must be an integer")),
        };

        Ok(Self {
            name,
            arguments,
            id,
        })
    }

    /// Parse every block, in text order.
    pub fn parse_all(blocks: &[String]) -> Result<Vec<Self>, AgentError> {
        blocks
            .iter()
            .enumerate()
            .map(|(position, raw)| Self::parse(raw, position))
            .collect()
    }
}
