//! Tool-related types.

use super::ToolError;
use serde_json::{Map, Value};

/// What a tool provider returned for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    /// Provider content blocks, untouched.
    pub content: Value,
    /// Set when the provider reported the call itself as failed.
    pub is_error: bool,
}

/// Arguments for an MCP `tools/call` request.
///
/// MCP only accepts an object (or nothing) as arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments(pub Option<Map<String, Value>>);

impl TryFrom<Value> for ToolArguments {
    type Error = ToolError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(Some(map))),
            Value::Null => Ok(Self(None)),
            other => Err(ToolError::InvalidInput(format!(
                "tool arguments must be a JSON object, got {other}"
            ))),
        }
    }
}
