use thiserror::Error;

/// Errors that can occur during tool execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("tool provider unavailable: {0}")]
    Unavailable(String),
    #[error("execution failed: {0}")]
    Execution(String),
}
