//! MCP method handling.

use serde_json::{Value, json};
use tracing::{debug, instrument};

use pvemcp_core::{Executor, Router};

use super::protocol::{INVALID_PARAMS, METHOD_NOT_FOUND, RpcRequest, RpcResponse};

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "proxmox-mcp-server";

/// Protocol revision answered when the client does not name one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// Revisions echoed back when a client asks for them.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2024-11-05", "2025-03-26", "2025-06-18"];

/// Answers MCP requests by delegating tool calls to a [`Router`].
pub struct Handler<E> {
    router: Router<E>,
}

impl<E: Executor> Handler<E> {
    pub fn new(router: Router<E>) -> Self {
        Self { router }
    }

    #[cfg(test)]
    fn router(&self) -> &Router<E> {
        &self.router
    }

    /// Handle one request. Notifications yield `None`.
    #[instrument(skip_all, fields(method = %request.method))]
    pub async fn handle(&self, request: RpcRequest) -> Option<RpcResponse> {
        if request.is_notification() {
            debug!("Ignoring notification");
            return None;
        }

        let id = request.id.unwrap_or(Value::Null);
        let params = request.params.unwrap_or(Value::Null);
        let response = match request.method.as_str() {
            "initialize" => RpcResponse::success(id, self.initialize(&params)),
            "ping" => RpcResponse::success(id, json!({})),
            "tools/list" => RpcResponse::success(id, self.list_tools()),
            "tools/call" => match self.call_tool(&params).await {
                Ok(result) => RpcResponse::success(id, result),
                Err(message) => RpcResponse::error(id, INVALID_PARAMS, message),
            },
            other => RpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            ),
        };
        Some(response)
    }

    fn initialize(&self, params: &Value) -> Value {
        let version = params["protocolVersion"]
            .as_str()
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(v))
            .unwrap_or(DEFAULT_PROTOCOL_VERSION);

        json!({
            "protocolVersion": version,
            "capabilities": {"tools": {}},
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
        })
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<Value> = self
            .router
            .registry()
            .operations()
            .iter()
            .map(|op| {
                json!({
                    "name": op.name,
                    "description": op.description,
                    "inputSchema": op.input_schema(),
                })
            })
            .collect();
        json!({ "tools": tools })
    }

    async fn call_tool(&self, params: &Value) -> Result<Value, String> {
        let name = params["name"]
            .as_str()
            .ok_or_else(|| "tools/call requires a string 'name'".to_string())?;
        let arguments = params.get("arguments").unwrap_or(&Value::Null);

        let envelope = self.router.call(name, arguments).await;
        Ok(json!({
            "content": [{"type": "text", "text": envelope.to_pretty_json()}],
            "isError": envelope.is_failure(),
        }))
    }
}
