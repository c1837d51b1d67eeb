// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Model Context Protocol (MCP) Server
//!
//! Newline-delimited JSON-RPC 2.0 over stdio, exposing the SwanLab tools to
//! agents such as Claude Desktop.

use super::formats::mcp_tool;
use super::SwanLabTools;
use crate::api::SwanLabApi;
use crate::error::Result;
use log::{info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::io::{BufRead, Write};

pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

const INSTRUCTIONS: &str = "Model Context Protocol server for SwanLab, a collaborative \
    machine learning experiment tracking platform. Tools query workspaces and their projects, \
    projects and their runs, run config, metadata and requirements, and run metrics as tables. \
    All paths are full paths: `username`, `username/project_name` or \
    `username/project_name/experiment_id`.";

pub struct McpServer<'a> {
    tools: SwanLabTools<'a>,
    server_info: ServerInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRequest {
    pub jsonrpc: String,
    /// `None` only when the field is absent; `"id": null` is `Some(Value::Null)`
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

fn present_id<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl McpRequest {
    /// Notifications carry no id and get no response
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

impl McpResponse {
    fn ok(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Option<Value>, error: McpError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl McpError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

impl<'a> McpServer<'a> {
    pub fn new(api: &'a dyn SwanLabApi) -> Self {
        Self {
            tools: SwanLabTools::new(api),
            server_info: ServerInfo {
                name: "swanlab-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    /// Serve stdin/stdout until stdin closes
    pub fn run_stdio(&self) -> Result<()> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Serve one request per line from `reader`, one response per line to `writer`
    ///
    /// A line that is not valid UTF-8 gets a parse error reply; the loop
    /// only ends when `reader` is exhausted or fails.
    pub fn serve<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> Result<()> {
        info!("MCP server {} {} ready", self.server_info.name, self.server_info.version);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let response = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_line(line),
                Err(e) => {
                    warn!("request is not valid UTF-8: {}", e);
                    Some(McpResponse::err(
                        None,
                        McpError::new(PARSE_ERROR, format!("Parse error: {}", e)),
                    ))
                }
            };
            if let Some(response) = response {
                writeln!(writer, "{}", serde_json::to_string(&response)?)?;
                writer.flush()?;
            }
        }
        info!("stdin closed, MCP server stopping");
        Ok(())
    }

    /// Handle one raw line; `None` for notifications
    pub fn handle_line(&self, line: &str) -> Option<McpResponse> {
        match serde_json::from_str::<McpRequest>(line) {
            Ok(request) => self.handle_request(request),
            Err(e) => {
                warn!("unparseable request: {}", e);
                Some(McpResponse::err(
                    None,
                    McpError::new(PARSE_ERROR, format!("Parse error: {}", e)),
                ))
            }
        }
    }

    pub fn handle_request(&self, request: McpRequest) -> Option<McpResponse> {
        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(),
            "notifications/initialized" | "initialized" => Ok(json!({})),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(&request.params),
            "ping" => Ok(json!({})),
            _ => Err(McpError::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            )),
        };

        if request.is_notification() {
            return None;
        }
        Some(match result {
            Ok(value) => McpResponse::ok(request.id, value),
            Err(error) => McpResponse::err(request.id, error),
        })
    }

    fn handle_initialize(&self) -> std::result::Result<Value, McpError> {
        Ok(json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "serverInfo": self.server_info,
            "capabilities": { "tools": { "listChanged": false } },
            "instructions": INSTRUCTIONS
        }))
    }

    fn handle_tools_list(&self) -> std::result::Result<Value, McpError> {
        let tools: Vec<Value> = self.tools.list_tools().iter().map(mcp_tool).collect();
        Ok(json!({ "tools": tools }))
    }

    fn handle_tools_call(&self, params: &Value) -> std::result::Result<Value, McpError> {
        let name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| McpError::new(INVALID_PARAMS, "Missing tool name"))?;
        if self.tools.get_tool(name).is_none() {
            return Err(McpError::new(INVALID_PARAMS, format!("Unknown tool: {}", name)));
        }
        let arguments = match params.get("arguments") {
            None | Some(Value::Null) => json!({}),
            Some(args) => args.clone(),
        };

        let result = self
            .tools
            .call_tool(name, arguments)
            .map_err(|e| McpError::new(INTERNAL_ERROR, e.to_string()))?;

        match (result.data, result.error) {
            (Some(data), _) if result.success => {
                let text = serde_json::to_string_pretty(&data)
                    .map_err(|e| McpError::new(INTERNAL_ERROR, e.to_string()))?;
                Ok(json!({ "content": [{ "type": "text", "text": text }] }))
            }
            (_, error) => Ok(json!({
                "content": [{
                    "type": "text",
                    "text": format!("Error: {}", error.unwrap_or_default())
                }],
                "isError": true
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fixture::FixtureApi;

    fn call(server: &McpServer, line: &str) -> Value {
        let response = server.handle_line(line).expect("response");
        serde_json::to_value(response).unwrap()
    }

    #[test]
    fn test_initialize() {
        let api = FixtureApi::sample();
        let server = McpServer::new(&api);
        let out = call(&server, r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#);
        assert_eq!(out["result"]["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(out["result"]["serverInfo"]["name"], "swanlab-mcp");
        assert_eq!(out["id"], 1);
    }

    #[test]
    fn test_notification_gets_no_response() {
        let api = FixtureApi::sample();
        let server = McpServer::new(&api);
        assert!(server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .is_none());
    }

    #[test]
    fn test_null_id_is_a_request() {
        let api = FixtureApi::sample();
        let server = McpServer::new(&api);
        let out = call(&server, r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#);
        assert_eq!(out["id"], Value::Null);
        assert_eq!(out["result"], json!({}));
    }

    #[test]
    fn test_invalid_utf8_line_keeps_serving() {
        let api = FixtureApi::sample();
        let server = McpServer::new(&api);
        let mut input = b"\xff\xfe{}\n".to_vec();
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#);
        let mut out = Vec::new();
        server.serve(input.as_slice(), &mut out).unwrap();
        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["error"]["code"], PARSE_ERROR);
        assert_eq!(lines[1]["id"], 7);
    }

    #[test]
    fn test_tools_list_annotations() {
        let api = FixtureApi::sample();
        let server = McpServer::new(&api);
        let out = call(&server, r#"{"jsonrpc":"2.0","id":"a","method":"tools/list"}"#);
        let tools = out["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 13);
        assert!(tools.iter().all(|t| t["annotations"]["readOnlyHint"] == true));
    }

    #[test]
    fn test_tools_call_success_and_failure() {
        let api = FixtureApi::sample();
        let server = McpServer::new(&api);
        let ok = call(
            &server,
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call",
                "params":{"name":"swanlab_get_project","arguments":{"path":"alice/mnist"}}}"#,
        );
        let text = ok["result"]["content"][0]["text"].as_str().unwrap();
        let project: Value = serde_json::from_str(text).unwrap();
        assert_eq!(project["path"], "alice/mnist");
        assert!(ok["result"].get("isError").is_none());

        let failed = call(
            &server,
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call",
                "params":{"name":"swanlab_get_project","arguments":{"path":"mnist"}}}"#,
        );
        assert_eq!(failed["result"]["isError"], true);
        let text = failed["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Error: Failed to get project 'mnist'"));
    }

    #[test]
    fn test_protocol_errors() {
        let api = FixtureApi::sample();
        let server = McpServer::new(&api);
        assert_eq!(call(&server, "{not json")["error"]["code"], PARSE_ERROR);
        assert_eq!(
            call(&server, r#"{"jsonrpc":"2.0","id":4,"method":"resources/list"}"#)["error"]["code"],
            METHOD_NOT_FOUND
        );
        assert_eq!(
            call(&server, r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{}}"#)
                ["error"]["code"],
            INVALID_PARAMS
        );
        assert_eq!(
            call(
                &server,
                r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"nope"}}"#
            )["error"]["code"],
            INVALID_PARAMS
        );
    }

    #[test]
    fn test_serve_lines() {
        let api = FixtureApi::sample();
        let server = McpServer::new(&api);
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#, "\n",
            "\n",
            r#"{"jsonrpc":"2.0","method":"initialized"}"#, "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#, "\n",
        );
        let mut out = Vec::new();
        server.serve(input.as_bytes(), &mut out).unwrap();
        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["id"], 2);
        assert_eq!(lines[0]["result"], json!({}));
    }
}
