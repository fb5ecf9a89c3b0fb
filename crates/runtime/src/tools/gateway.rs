//! MCP-backed tool gateway.
//!
//! Owns the connection to a single tool-provider subprocess, spoken to over
//! stdio with the rmcp SDK.
//!
//! # Example
//!
//! ```ignore
//! use runtime::tools::McpGateway;
//!
//! # async fn example() -> runtime::Result<()> {
//! let mut gateway = McpGateway::new();
//! gateway.connect("servers/weather.py").await?;
//!
//! for spec in gateway.specs() {
//!     println!("Tool: {}", spec.name);
//! }
//!
//! gateway.cleanup().await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;

use rmcp::{
    ServiceExt,
    model::{CallToolRequestParams, CallToolResult, Tool},
    service::{RoleClient, RunningService},
    transport::{ConfigureCommandExt, TokioChildProcess},
};
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, error, info};

use super::{ServerScript, ToolArguments, ToolError, ToolHost, ToolOutput};
use crate::model::{ToolCall, ToolSpec};
use crate::{Error, Result};

impl From<Tool> for ToolSpec {
    fn from(tool: Tool) -> Self {
        Self {
            name: tool.name.to_string(),
            description: tool.description.map(|d| d.to_string()).unwrap_or_default(),
            input_schema: Value::Object((*tool.input_schema).clone()),
        }
    }
}

/// Observable lifecycle phase of a gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Disconnected,
    Connecting,
    Connected,
    Closed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

struct Connection {
    service: RunningService<RoleClient, ()>,
    server_name: String,
    specs: Vec<ToolSpec>,
}

enum State {
    Disconnected,
    Connecting,
    Connected(Connection),
    Closed,
}

/// Tool host backed by one MCP server process.
pub struct McpGateway {
    state: State,
}

impl McpGateway {
    pub fn new() -> Self {
        Self {
            state: State::Disconnected,
        }
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Disconnected => Phase::Disconnected,
            State::Connecting => Phase::Connecting,
            State::Connected(_) => Phase::Connected,
            State::Closed => Phase::Closed,
        }
    }

    /// Name the server reported during the handshake.
    pub fn server_name(&self) -> Option<&str> {
        match &self.state {
            State::Connected(conn) => Some(&conn.server_name),
            _ => None,
        }
    }

    /// Launch the server script, hand-shake, and fetch its tool catalog.
    ///
    /// The script must end in `.py` or `.js`; anything else fails with
    /// [`Error::UnsupportedServerType`] before a process is spawned. A
    /// failed attempt leaves the gateway disconnected.
    pub async fn connect(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let script = ServerScript::from_path(path)
            .inspect_err(|e| error!(error = %e, "refusing to launch MCP server"))?;

        if !matches!(self.state, State::Disconnected) {
            return Err(Error::InvalidState(format!(
                "cannot connect a gateway that is {}",
                self.phase()
            )));
        }

        self.state = State::Connecting;
        match Self::open(&script).await {
            Ok(conn) => {
                self.state = State::Connected(conn);
                Ok(())
            }
            Err(e) => {
                error!(script = %script, error = %e, "error connecting to MCP server");
                self.state = State::Disconnected;
                Err(e)
            }
        }
    }

    async fn open(script: &ServerScript) -> Result<Connection> {
        debug!(script = %script, "spawning MCP server");
        let transport = TokioChildProcess::new(Command::new(script.interpreter()).configure(
            |cmd| {
                cmd.arg(script.path());
            },
        ))
        .map_err(|e| Error::Transport(format!("failed to spawn {script}: {e}")))?;

        let service = ()
            .serve(transport)
            .await
            .map_err(|e| Error::Transport(format!("handshake with {script} failed: {e}")))?;

        let server_name = service
            .peer_info()
            .map(|info| info.server_info.name.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        info!(server = %server_name, "connected to MCP server");

        let specs: Vec<ToolSpec> = service
            .list_all_tools()
            .await
            .map_err(|e| Error::Transport(format!("failed to list tools: {e}")))?
            .into_iter()
            .map(ToolSpec::from)
            .collect();

        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        info!(tools = ?names, "available tools");

        Ok(Connection {
            service,
            server_name,
            specs,
        })
    }

    fn connection(&self) -> Result<&Connection> {
        match &self.state {
            State::Connected(conn) => Ok(conn),
            _ => Err(Error::InvalidState(format!(
                "MCP gateway is {}, not connected",
                self.phase()
            ))),
        }
    }

    /// Ask the server for its current tool catalog.
    pub async fn list_tools(&self) -> Result<Vec<ToolSpec>> {
        let conn = self.connection()?;
        let tools = conn
            .service
            .list_all_tools()
            .await
            .map_err(|e| Error::Transport(format!("failed to list tools: {e}")))
            .inspect_err(|e| error!(error = %e, "error getting MCP tools"))?;
        Ok(tools.into_iter().map(ToolSpec::from).collect())
    }

    /// Call a tool by name and return the server's result verbatim.
    ///
    /// `arguments` must be a JSON object or null.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult> {
        let conn = self.connection()?;
        let arguments = ToolArguments::try_from(arguments).map_err(|source| {
            Error::ToolInvocation {
                name: name.to_string(),
                source,
            }
        })?;

        let params = CallToolRequestParams {
            name: name.to_string().into(),
            arguments: arguments.0,
            meta: None,
            task: None,
        };

        conn.service
            .call_tool(params)
            .await
            .map_err(|e| Error::Transport(format!("tool call {name} failed: {e}")))
    }

    /// Shut down the server connection.
    ///
    /// Runs the release at most once; later calls are no-ops. The gateway is
    /// closed afterwards even if the release reported an error.
    pub async fn cleanup(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Connected(conn) => match conn.service.cancel().await {
                Ok(reason) => {
                    info!(server = %conn.server_name, ?reason, "disconnected from MCP server");
                    Ok(())
                }
                Err(e) => {
                    error!(server = %conn.server_name, error = %e, "error during cleanup");
                    Err(Error::Cleanup(e.to_string()))
                }
            },
            State::Closed => {
                debug!("MCP gateway already closed");
                Ok(())
            }
            State::Disconnected | State::Connecting => Ok(()),
        }
    }
}

impl Default for McpGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolHost for McpGateway {
    fn specs(&self) -> &[ToolSpec] {
        match &self.state {
            State::Connected(conn) => &conn.specs,
            _ => &[],
        }
    }

    async fn execute(&self, call: &ToolCall) -> std::result::Result<ToolOutput, ToolError> {
        let result = self
            .call_tool(&call.name, call.input.clone())
            .await
            .map_err(|e| match e {
                Error::ToolInvocation { source, .. } => source,
                Error::InvalidState(msg) => ToolError::Unavailable(msg),
                other => ToolError::Execution(other.to_string()),
            })?;

        let content = serde_json::to_value(&result.content)
            .map_err(|e| ToolError::Execution(format!("serialize result: {e}")))?;

        Ok(ToolOutput {
            content,
            is_error: result.is_error.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn unsupported_script_fails_before_spawn() {
        let mut gateway = McpGateway::new();
        let err = gateway.connect("server.rb").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedServerType(_)));
        assert_eq!(gateway.phase(), Phase::Disconnected);
    }

    #[tokio::test]
    async fn operations_before_connect_are_invalid() {
        let gateway = McpGateway::new();
        assert!(gateway.specs().is_empty());
        assert!(gateway.server_name().is_none());
        assert!(matches!(
            gateway.list_tools().await,
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            gateway.call_tool("list_files", json!({})).await,
            Err(Error::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn execute_before_connect_reports_unavailable() {
        let gateway = McpGateway::new();
        let call = ToolCall {
            id: "toolu_1".into(),
            name: "list_files".into(),
            input: json!({"path": "/tmp"}),
        };
        assert!(matches!(
            gateway.execute(&call).await,
            Err(ToolError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn cleanup_is_idempotent_and_final() {
        let mut gateway = McpGateway::new();
        gateway.cleanup().await.unwrap();
        assert_eq!(gateway.phase(), Phase::Closed);

        gateway.cleanup().await.unwrap();
        assert_eq!(gateway.phase(), Phase::Closed);

        let err = gateway.connect("server.py").await.unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        assert_eq!(gateway.phase(), Phase::Closed);
    }

    #[test]
    fn mcp_tool_normalizes_to_spec() {
        let tool: Tool = serde_json::from_value(json!({
            "name": "list_files",
            "inputSchema": {"type": "object", "properties": {"path": {"type": "string"}}}
        }))
        .unwrap();

        let spec = ToolSpec::from(tool);
        assert_eq!(spec.name, "list_files");
        assert_eq!(spec.description, "");
        assert_eq!(spec.input_schema["properties"]["path"]["type"], "string");
    }
}
