//! JSON-RPC 2.0 message types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

/// An incoming request or notification.
///
/// A message without an `id` member is a notification and gets no response.
/// An explicit `"id": null` is still a request.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<Value>,
}

// Only called when the member exists, so `null` becomes `Some(Value::Null)`
fn present_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl RpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
    id: Value,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
            id,
        }
    }

    pub fn to_line(&self) -> String {
        // Serializing a tree of Values and strings cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// Parse one input line.
///
/// Returns the error response to send when the line is not a usable request.
pub fn parse_line(line: &str) -> Result<RpcRequest, RpcResponse> {
    let value: Value = serde_json::from_str(line)
        .map_err(|e| RpcResponse::error(Value::Null, PARSE_ERROR, format!("Parse error: {}", e)))?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let request: RpcRequest = serde_json::from_value(value).map_err(|e| {
        RpcResponse::error(id.clone(), INVALID_REQUEST, format!("Invalid request: {}", e))
    })?;

    match request.jsonrpc.as_deref() {
        None | Some("2.0") => Ok(request),
        Some(other) => Err(RpcResponse::error(
            id,
            INVALID_REQUEST,
            format!("Unsupported jsonrpc version {:?}", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_request() {
        let request =
            parse_line(r#"{"jsonrpc":"2.0","id":7,"method":"tools/list","params":{}}"#).unwrap();
        assert_eq!(request.method, "tools/list");
        assert_eq!(request.id, Some(json!(7)));
        assert!(!request.is_notification());
    }

    #[test]
    fn notification_has_no_id() {
        let request =
            parse_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).unwrap();
        assert!(request.is_notification());
    }

    #[test]
    fn null_id_is_still_a_request() {
        let request = parse_line(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#).unwrap();
        assert!(!request.is_notification());
        assert_eq!(request.id, Some(Value::Null));
    }

    #[test]
    fn garbage_is_parse_error_with_null_id() {
        let response = parse_line("{not json").unwrap_err();
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["error"]["code"], PARSE_ERROR);
        assert_eq!(value["id"], Value::Null);
        assert!(value.get("result").is_none());
    }

    #[test]
    fn missing_method_is_invalid_request() {
        let response = parse_line(r#"{"jsonrpc":"2.0","id":"a"}"#).unwrap_err();
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["error"]["code"], INVALID_REQUEST);
        assert_eq!(value["id"], "a");
    }

    #[test]
    fn wrong_version_is_invalid_request() {
        let response = parse_line(r#"{"jsonrpc":"1.0","id":3,"method":"ping"}"#).unwrap_err();
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["error"]["code"], INVALID_REQUEST);
        assert_eq!(value["id"], 3);
    }

    #[test]
    fn success_line_shape() {
        let line = RpcResponse::success(json!(1), json!({})).to_line();
        assert_eq!(line, r#"{"jsonrpc":"2.0","result":{},"id":1}"#);
    }
}
