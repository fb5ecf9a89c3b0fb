//! toolbridge runtime: connect a language model to an MCP tool server.
//!
//! # Overview
//!
//! - **McpGateway**: launches one MCP server script (`.py` or `.js`) over
//!   stdio, fetches its tool catalog, and proxies tool calls.
//! - **Backend**: a trait over model providers; [`AnthropicBackend`] talks to
//!   the Anthropic Messages API.
//! - **Conversation**: alternates model turns and tool calls until the model
//!   answers in plain text.
//!
//! # Example
//!
//! ```ignore
//! use runtime::{AnthropicBackend, Conversation, McpGateway};
//!
//! # async fn example() -> runtime::Result<()> {
//! let backend = AnthropicBackend::builder("sk-ant-api03-...").build();
//!
//! let mut gateway = McpGateway::new();
//! gateway.connect("servers/weather.py").await?;
//!
//! let mut conversation = Conversation::new(backend, &gateway);
//! let outcome = conversation.process_query("Any storms in Boston?").await.map(|_| ());
//! println!("{}", conversation.answer().unwrap_or_default());
//! drop(conversation);
//!
//! gateway.cleanup().await?;
//! # outcome
//! # }
//! ```

mod client;
mod conversation;
mod error;
pub mod model;
pub mod providers;
pub mod tools;

pub use client::query_once;
pub use conversation::Conversation;
pub use error::{Error, Result};
pub use model::{Backend, Content, Message, ModelError, Part, Role, ToolCall, ToolResult, ToolSpec};
pub use providers::{AnthropicBackend, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
pub use tools::{McpGateway, ToolError, ToolHost};
