//! Drives the server through the line transport with in-memory streams

use crew_core::agent::AgentSpec;
use crew_core::runner::Runner;
use crew_core::sandbox::Workspace;
use crew_core::testing::StubLlm;
use crew_mcp::{McpRpcError, McpServer, serve};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;

const MAX_LINE: usize = 1024 * 1024;

fn server_with(dir: &TempDir, agents: &[&str]) -> McpServer {
    let workspace = Arc::new(Workspace::new(dir.path()).unwrap());
    let runner = Runner::with_workspace(workspace, Arc::new(StubLlm::replying("all good")));
    for name in agents {
        runner.register(AgentSpec::new(*name, "Review things.")).unwrap();
    }
    McpServer::new(Arc::new(runner), "crew", "test")
}

/// Feed `input` to a fresh session and collect every response line
async fn run_session(server: &McpServer, input: &str) -> Vec<Value> {
    let mut output = Vec::new();
    serve(
        server,
        input.as_bytes(),
        &mut output,
        MAX_LINE,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn request(id: i64, method: &str, params: Value) -> String {
    format!(
        "{}\n",
        json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params})
    )
}

fn call(id: i64, tool: &str, arguments: Value) -> String {
    request(id, "tools/call", json!({"name": tool, "arguments": arguments}))
}

#[tokio::test]
async fn malformed_line_does_not_end_session() {
    let dir = TempDir::new().unwrap();
    let server = server_with(&dir, &[]);

    let input = format!("{{\"jsonrpc\": \"2.0\", \"id\": \n{}", request(1, "tools/list", json!({})));
    let responses = run_session(&server, &input).await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], Value::Null);
    assert_eq!(responses[0]["error"]["code"], McpRpcError::PARSE_ERROR);
    assert_eq!(responses[1]["id"], 1);
    assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn non_integer_ids_are_dispatched_and_echoed() {
    let dir = TempDir::new().unwrap();
    let server = server_with(&dir, &[]);

    let input = concat!(
        "{\"jsonrpc\":\"2.0\",\"id\":1.5,\"method\":\"tools/list\"}\n",
        "{\"jsonrpc\":\"2.0\",\"id\":18446744073709551615,\"method\":\"tools/list\"}\n",
    );
    let mut output = Vec::new();
    serve(&server, input.as_bytes(), &mut output, MAX_LINE, &CancellationToken::new())
        .await
        .unwrap();
    let text = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["id"], json!(1.5));
    assert_eq!(first["result"]["tools"].as_array().unwrap().len(), 7);

    let second: Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["id"], json!(u64::MAX));
    assert!(lines[1].contains("\"id\":18446744073709551615"));
    assert_eq!(second["result"]["tools"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn full_handshake() {
    let dir = TempDir::new().unwrap();
    let server = server_with(&dir, &["reviewer"]);

    let input = [
        request(1, "initialize", json!({"protocolVersion": "2024-11-05", "capabilities": {}})),
        "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n".to_string(),
        "\n".to_string(),
        request(2, "tools/list", json!({})),
    ]
    .concat();
    let responses = run_session(&server, &input).await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "crew");
    let tools = responses[1]["result"]["tools"].as_array().unwrap();
    assert_eq!(tools[0]["name"], "invoke_agent");
    assert_eq!(tools[0]["inputSchema"]["properties"]["agent"]["enum"], json!(["reviewer"]));
    assert!(server.is_initialized());
}

#[tokio::test]
async fn read_file_stays_inside_workspace() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
    let server = server_with(&dir, &[]);

    let input = [
        call(1, "read_file", json!({"path": "a.txt"})),
        call(2, "read_file", json!({"path": "../../etc/passwd"})),
    ]
    .concat();
    let responses = run_session(&server, &input).await;

    assert_eq!(
        responses[0]["result"],
        json!({"content": [{"type": "text", "text": "hello"}], "isError": false})
    );
    assert_eq!(responses[1]["result"]["isError"], true);
    let text = responses[1]["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("Error: path outside workspace"));
}

#[tokio::test]
async fn invoke_parallel_reports_every_agent() {
    let dir = TempDir::new().unwrap();
    let server = server_with(&dir, &["x", "y"]);

    let responses = run_session(&server, &call(1, "invoke_parallel", json!({"agents": "x,y", "input": "go"}))).await;

    let result = &responses[0]["result"];
    assert_eq!(result["isError"], false);
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("## x [SUCCESS]"));
    assert!(text.contains("## y [SUCCESS]"));
    assert!(text.find("## x").unwrap() < text.find("## y").unwrap());
}

#[tokio::test]
async fn unknown_tool_is_method_not_found() {
    let dir = TempDir::new().unwrap();
    let server = server_with(&dir, &[]);

    let responses = run_session(&server, &call(5, "delete_everything", json!({}))).await;
    assert_eq!(responses[0]["id"], 5);
    assert_eq!(responses[0]["error"]["code"], McpRpcError::METHOD_NOT_FOUND);
    assert_eq!(responses[0]["error"]["data"], "delete_everything");
}

#[tokio::test]
async fn oversized_line_is_rejected_and_session_continues() {
    let dir = TempDir::new().unwrap();
    let server = server_with(&dir, &[]);

    let huge = format!("{{\"pad\":\"{}\"}}\n", "x".repeat(4096));
    let input = format!("{}{}", huge, request(2, "ping", json!({})));

    let mut output = Vec::new();
    serve(&server, input.as_bytes(), &mut output, 1024, &CancellationToken::new())
        .await
        .unwrap();
    let responses: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["error"]["code"], McpRpcError::PARSE_ERROR);
    assert_eq!(responses[0]["id"], Value::Null);
    assert_eq!(responses[1]["id"], 2);
    assert_eq!(responses[1]["result"], json!({}));
}

#[tokio::test]
async fn serves_over_duplex_until_cancelled() {
    let dir = TempDir::new().unwrap();
    let server = Arc::new(server_with(&dir, &[]));

    let (client, server_end) = tokio::io::duplex(4096);
    let (server_read, server_write) = tokio::io::split(server_end);
    let (client_read, mut client_write) = tokio::io::split(client);
    let cancel = CancellationToken::new();

    let session = {
        let server = Arc::clone(&server);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            serve(&server, BufReader::new(server_read), server_write, MAX_LINE, &cancel).await
        })
    };

    client_write
        .write_all(request(1, "ping", json!({})).as_bytes())
        .await
        .unwrap();
    let mut lines = BufReader::new(client_read).lines();
    let line = lines.next_line().await.unwrap().unwrap();
    let response: Value = serde_json::from_str(&line).unwrap();
    assert_eq!(response["id"], 1);

    cancel.cancel();
    let outcome = tokio::time::timeout(Duration::from_secs(2), session)
        .await
        .unwrap()
        .unwrap();
    assert!(outcome.is_ok());
}
