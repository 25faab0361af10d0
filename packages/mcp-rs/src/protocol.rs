use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// MCP revision implemented by this server.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
pub const JSONRPC_VERSION: &str = "2.0";

// -----------------------------------------------------------------------------
// JSON-RPC envelope
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
  pub jsonrpc: String,
  /// Absent for notifications. A present `null` id is kept as `Some(Value::Null)`.
  #[serde(default, deserialize_with = "present_id")]
  pub id: Option<Value>,
  pub method: String,
  #[serde(default)]
  pub params: Option<Value>,
}

impl JsonRpcRequest {
  pub fn is_notification(&self) -> bool {
    self.id.is_none()
  }
}

fn present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
  D: Deserializer<'de>,
{
  Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
  pub jsonrpc: &'static str,
  pub id: Value,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub result: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
  pub fn success(id: Value, result: Value) -> Self {
    Self {
      jsonrpc: JSONRPC_VERSION,
      id,
      result: Some(result),
      error: None,
    }
  }

  pub fn failure(id: Value, error: JsonRpcError) -> Self {
    Self {
      jsonrpc: JSONRPC_VERSION,
      id,
      result: None,
      error: Some(error),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
  pub code: i64,
  pub message: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<Value>,
}

impl JsonRpcError {
  pub const PARSE_ERROR: i64 = -32700;
  pub const INVALID_REQUEST: i64 = -32600;
  pub const METHOD_NOT_FOUND: i64 = -32601;
  pub const INVALID_PARAMS: i64 = -32602;
  pub const INTERNAL_ERROR: i64 = -32603;

  pub fn new(code: i64, message: impl Into<String>) -> Self {
    Self {
      code,
      message: message.into(),
      data: None,
    }
  }

  pub fn parse_error(message: impl Into<String>) -> Self {
    Self::new(Self::PARSE_ERROR, message)
  }

  pub fn invalid_request(message: impl Into<String>) -> Self {
    Self::new(Self::INVALID_REQUEST, message)
  }

  pub fn method_not_found(method: &str) -> Self {
    Self::new(Self::METHOD_NOT_FOUND, format!("Method not found: {method}"))
  }

  pub fn invalid_params(message: impl Into<String>) -> Self {
    Self::new(Self::INVALID_PARAMS, message)
  }

  pub fn internal(message: impl Into<String>) -> Self {
    Self::new(Self::INTERNAL_ERROR, message)
  }
}

// -----------------------------------------------------------------------------
// Lifecycle
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
  #[serde(default)]
  pub protocol_version: Option<String>,
  #[serde(default)]
  pub client_info: Option<ClientInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
  pub name: String,
  #[serde(default)]
  pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
  pub protocol_version: &'static str,
  pub capabilities: ServerCapabilities,
  pub server_info: ServerInfo,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerCapabilities {
  pub tools: ListChanged,
  pub resources: ListChanged,
  pub prompts: ListChanged,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListChanged {
  pub list_changed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
  pub name: &'static str,
  pub version: &'static str,
}

// -----------------------------------------------------------------------------
// Content, tools, resources, prompts
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
  Text { text: String },
}

impl Content {
  pub fn text(text: impl Into<String>) -> Self {
    Content::Text { text: text.into() }
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
  pub name: &'static str,
  pub description: &'static str,
  pub input_schema: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
  pub name: String,
  #[serde(default)]
  pub arguments: Option<Value>,
}

/// Result of `tools/call`. Tool-level failures are reported here with `isError` set rather than
/// as JSON-RPC errors, so the model can read them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
  pub content: Vec<Content>,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub is_error: bool,
}

impl ToolCallResult {
  pub fn text(text: impl Into<String>) -> Self {
    Self {
      content: vec![Content::text(text)],
      is_error: false,
    }
  }

  pub fn error(text: impl Into<String>) -> Self {
    Self {
      content: vec![Content::text(text)],
      is_error: true,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadResourceParams {
  pub uri: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
  pub uri: &'static str,
  pub mime_type: &'static str,
  pub text: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetPromptParams {
  pub name: String,
  #[serde(default)]
  pub arguments: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetPromptResult {
  pub description: &'static str,
  pub messages: Vec<PromptMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptMessage {
  pub role: Role,
  pub content: Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Assistant,
}
