use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tolk_compiler::TolkCompiler;

use crate::protocol::{
  GetPromptParams, InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest,
  JsonRpcResponse, ReadResourceParams, ServerCapabilities, ServerInfo, ToolCallParams,
  JSONRPC_VERSION, MCP_PROTOCOL_VERSION,
};
use crate::{prompts, resources, tools};

pub const SERVER_NAME: &str = "tolk-mcp";

/// Request dispatcher. Stateless apart from the compiler handle, so one instance serves every
/// request of a session and requests may be handled concurrently.
#[derive(Clone)]
pub struct McpServer {
  compiler: TolkCompiler,
}

impl McpServer {
  pub fn new(compiler: TolkCompiler) -> Self {
    Self { compiler }
  }

  /// Handle one raw line from the transport. Returns `None` for notifications.
  pub async fn handle_message(&self, line: &str) -> Option<JsonRpcResponse> {
    let message: Value = match serde_json::from_str(line) {
      Ok(message) => message,
      Err(err) => {
        log::warn!("discarding malformed message: {err}");
        return Some(JsonRpcResponse::failure(
          Value::Null,
          JsonRpcError::parse_error(format!("Parse error: {err}")),
        ));
      }
    };

    match JsonRpcRequest::deserialize(&message) {
      Ok(request) => self.handle_request(request).await,
      Err(err) => {
        let id = message.get("id").cloned().unwrap_or(Value::Null);
        log::warn!("rejecting invalid request {id}: {err}");
        Some(JsonRpcResponse::failure(
          id,
          JsonRpcError::invalid_request(format!("Invalid request: {err}")),
        ))
      }
    }
  }

  pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
    if request.is_notification() {
      log::debug!("notification {}", request.method);
      return None;
    }
    let id = request.id.clone().unwrap_or(Value::Null);

    if request.jsonrpc != JSONRPC_VERSION {
      return Some(JsonRpcResponse::failure(
        id,
        JsonRpcError::invalid_request(format!(
          "Unsupported jsonrpc version \"{}\"",
          request.jsonrpc
        )),
      ));
    }

    log::debug!("request {id} {}", request.method);
    let response = match self.dispatch(&request.method, request.params).await {
      Ok(result) => JsonRpcResponse::success(id, result),
      Err(error) => {
        log::debug!("request {id} failed: {}", error.message);
        JsonRpcResponse::failure(id, error)
      }
    };
    Some(response)
  }

  async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value, JsonRpcError> {
    match method {
      "initialize" => {
        let params: InitializeParams = parse_params(params)?;
        to_result(self.initialize(params))
      }
      "ping" => Ok(json!({})),
      "tools/list" => Ok(json!({ "tools": tools::list() })),
      "tools/call" => {
        let params: ToolCallParams = parse_params(params)?;
        let arguments = params.arguments.unwrap_or_else(|| json!({}));
        let result = tools::call(&self.compiler, &params.name, arguments).await?;
        to_result(result)
      }
      "resources/list" => Ok(json!({ "resources": resources::list() })),
      "resources/read" => {
        let params: ReadResourceParams = parse_params(params)?;
        let contents = resources::read(&params.uri).ok_or_else(|| {
          JsonRpcError::invalid_params(format!("Unknown resource: {}", params.uri))
        })?;
        Ok(json!({ "contents": [contents] }))
      }
      "prompts/list" => Ok(json!({ "prompts": prompts::list() })),
      "prompts/get" => {
        let params: GetPromptParams = parse_params(params)?;
        to_result(prompts::get(&params.name, &params.arguments)?)
      }
      other => Err(JsonRpcError::method_not_found(other)),
    }
  }

  fn initialize(&self, params: InitializeParams) -> InitializeResult {
    if let Some(client) = &params.client_info {
      log::info!(
        "client {} {} connected (protocol {})",
        client.name,
        client.version.as_deref().unwrap_or("unknown"),
        params.protocol_version.as_deref().unwrap_or("unspecified")
      );
    }

    InitializeResult {
      protocol_version: MCP_PROTOCOL_VERSION,
      capabilities: ServerCapabilities::default(),
      server_info: ServerInfo {
        name: SERVER_NAME,
        version: env!("CARGO_PKG_VERSION"),
      },
    }
  }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, JsonRpcError> {
  serde_json::from_value(params.unwrap_or_else(|| json!({})))
    .map_err(|err| JsonRpcError::invalid_params(format!("Invalid params: {err}")))
}

fn to_result<T: Serialize>(value: T) -> Result<Value, JsonRpcError> {
  serde_json::to_value(value).map_err(|err| JsonRpcError::internal(err.to_string()))
}
