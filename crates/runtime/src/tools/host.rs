//! Tool host trait.

use crate::model::{ToolCall, ToolSpec};
use crate::tools::{ToolError, ToolOutput};
use std::future::Future;

/// Trait for tool execution hosts.
///
/// Implementations provide tool specifications and execute tool calls.
/// This is the boundary between the conversation loop and side effects.
pub trait ToolHost: Send + Sync {
    /// Get available tool specifications.
    fn specs(&self) -> &[ToolSpec];

    /// Execute a tool call.
    fn execute(&self, call: &ToolCall)
    -> impl Future<Output = Result<ToolOutput, ToolError>> + Send;
}

impl<T: ToolHost> ToolHost for &T {
    fn specs(&self) -> &[ToolSpec] {
        (**self).specs()
    }

    fn execute(
        &self,
        call: &ToolCall,
    ) -> impl Future<Output = Result<ToolOutput, ToolError>> + Send {
        (**self).execute(call)
    }
}
