//! Empty tool host implementation.

use crate::model::{ToolCall, ToolSpec};
use crate::tools::{ToolError, ToolHost, ToolOutput};

/// A tool host with no tools.
///
/// The model is offered an empty catalog; any call it still makes fails.
#[derive(Debug, Default)]
pub struct EmptyToolHost;

impl ToolHost for EmptyToolHost {
    fn specs(&self) -> &[ToolSpec] {
        &[]
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolOutput, ToolError> {
        Err(ToolError::Unavailable(format!(
            "no tools are registered, cannot run {}",
            call.name
        )))
    }
}
