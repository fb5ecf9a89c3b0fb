//! Tool execution and MCP integration.

mod empty;
pub mod errors;
mod gateway;
mod host;
mod script;
mod types;

pub use empty::EmptyToolHost;
pub use errors::ToolError;
pub use gateway::{McpGateway, Phase};
pub use host::ToolHost;
pub use script::{ScriptKind, ServerScript};
pub use types::{ToolArguments, ToolOutput};
