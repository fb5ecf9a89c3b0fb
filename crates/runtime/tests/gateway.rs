//! Gateway tests against real MCP server processes.
//!
//! The servers under `tests/fixtures/` are plain Python scripts using only
//! the standard library. Tests are skipped when `python3` is not installed.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

use runtime::model::{FinishReason, ModelRequest, ModelResponse, Usage};
use runtime::tools::{McpGateway, Phase};
use runtime::{
    Backend, Content, Error, Message, ModelError, Part, Role, ToolCall, ToolHost, query_once,
};
use serde_json::{Value, json};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn python_available() -> bool {
    let found = std::process::Command::new("python3")
        .arg("--version")
        .output()
        .is_ok_and(|out| out.status.success());
    if !found {
        eprintln!("python3 not found, skipping");
    }
    found
}

#[tokio::test]
async fn connect_fetches_catalog_in_server_order() {
    if !python_available() {
        return;
    }
    let mut gateway = McpGateway::new();
    gateway.connect(fixture("files_server.py")).await.unwrap();

    assert_eq!(gateway.phase(), Phase::Connected);
    assert_eq!(gateway.server_name(), Some("files"));

    let specs: Vec<(&str, &str)> = gateway
        .specs()
        .iter()
        .map(|s| (s.name.as_str(), s.description.as_str()))
        .collect();
    assert_eq!(
        specs,
        vec![
            ("list_files", "List files in a directory"),
            ("remove_files", ""),
        ]
    );
    assert_eq!(
        gateway.specs()[0].input_schema["required"],
        json!(["path"])
    );

    let listed = gateway.list_tools().await.unwrap();
    assert_eq!(listed, gateway.specs());

    gateway.cleanup().await.unwrap();
}

#[tokio::test]
async fn call_tool_returns_server_result() {
    if !python_available() {
        return;
    }
    let mut gateway = McpGateway::new();
    gateway.connect(fixture("files_server.py")).await.unwrap();

    let result = gateway
        .call_tool("list_files", json!({"path": "/srv"}))
        .await
        .unwrap();
    assert_ne!(result.is_error, Some(true));
    let content = serde_json::to_value(&result.content).unwrap();
    assert_eq!(content[0]["type"], "text");
    assert_eq!(content[0]["text"], "/srv: a.txt, b.txt");

    let err = gateway
        .call_tool("list_files", json!(["/srv"]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ToolInvocation { .. }));

    gateway.cleanup().await.unwrap();
}

#[tokio::test]
async fn error_results_are_flagged_not_raised() {
    if !python_available() {
        return;
    }
    let mut gateway = McpGateway::new();
    gateway.connect(fixture("files_server.py")).await.unwrap();

    let call = ToolCall {
        id: "toolu_1".into(),
        name: "remove_files".into(),
        input: json!({}),
    };
    let output = gateway.execute(&call).await.unwrap();
    assert!(output.is_error);
    assert_eq!(output.content[0]["text"], "permission denied");

    gateway.cleanup().await.unwrap();
}

#[tokio::test]
async fn cleanup_after_connect_is_idempotent() {
    if !python_available() {
        return;
    }
    let mut gateway = McpGateway::new();
    gateway.connect(fixture("files_server.py")).await.unwrap();

    gateway.cleanup().await.unwrap();
    assert_eq!(gateway.phase(), Phase::Closed);
    assert!(gateway.specs().is_empty());
    assert!(gateway.server_name().is_none());

    gateway.cleanup().await.unwrap();
    assert_eq!(gateway.phase(), Phase::Closed);

    let err = gateway.list_tools().await.unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn failed_handshake_leaves_gateway_disconnected() {
    if !python_available() {
        return;
    }
    let mut gateway = McpGateway::new();
    let err = gateway
        .connect(fixture("exits_immediately.py"))
        .await
        .unwrap_err();

    match err {
        Error::Transport(msg) => assert!(msg.contains("handshake"), "{msg}"),
        other => panic!("expected transport error, got {other:?}"),
    }
    assert_eq!(gateway.phase(), Phase::Disconnected);
    assert!(gateway.server_name().is_none());
}

/// Replays canned responses and records the tool names offered each turn.
struct ScriptedBackend {
    responses: Mutex<VecDeque<ModelResponse>>,
    offered: Mutex<Vec<Vec<String>>>,
}

impl ScriptedBackend {
    fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            offered: Mutex::new(Vec::new()),
        }
    }
}

impl Backend for ScriptedBackend {
    async fn call(
        &self,
        request: ModelRequest<'_>,
    ) -> std::result::Result<ModelResponse, ModelError> {
        self.offered
            .lock()
            .unwrap()
            .push(request.tools.iter().map(|t| t.name.clone()).collect());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ModelError::InvalidResponse("no scripted response left".into()))
    }
}

fn response(parts: Vec<Part>, finish_reason: FinishReason) -> ModelResponse {
    ModelResponse {
        message: Message::from_parts(Role::Assistant, parts),
        usage: Usage::default(),
        finish_reason,
    }
}

#[tokio::test]
async fn query_once_runs_tools_and_releases_the_server() {
    if !python_available() {
        return;
    }
    let backend = ScriptedBackend::new(vec![
        response(
            vec![Part::ToolCall(ToolCall {
                id: "toolu_1".into(),
                name: "list_files".into(),
                input: json!({"path": "/srv"}),
            })],
            FinishReason::ToolCalls,
        ),
        response(
            vec![Part::text("There are two files: a.txt and b.txt.")],
            FinishReason::Stop,
        ),
    ]);

    let transcript = query_once(&backend, fixture("files_server.py"), "What is in /srv?")
        .await
        .unwrap();

    assert_eq!(transcript.len(), 4);
    assert_eq!(transcript[0].text(), "What is in /srv?");
    let Content::Parts(parts) = &transcript[2].content else {
        panic!("expected tool result parts");
    };
    let [Part::ToolResult(result)] = &parts[..] else {
        panic!("expected one tool result, got {parts:?}");
    };
    assert_eq!(result.tool_call_id, "toolu_1");
    assert!(!result.is_error);
    assert_eq!(result.content[0]["text"], Value::from("/srv: a.txt, b.txt"));
    assert_eq!(transcript[3].text(), "There are two files: a.txt and b.txt.");

    let offered = backend.offered.lock().unwrap();
    assert_eq!(offered.len(), 2);
    assert_eq!(offered[0], vec!["list_files", "remove_files"]);
}

#[tokio::test]
async fn query_once_reports_failed_handshake() {
    if !python_available() {
        return;
    }
    let backend = ScriptedBackend::new(Vec::new());

    let err = query_once(&backend, fixture("exits_immediately.py"), "hi")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
    assert!(backend.offered.lock().unwrap().is_empty());
}
