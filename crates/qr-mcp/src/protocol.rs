//! MCP Protocol Types
//!
//! The inbound JSON-RPC 2.0 request type plus the content-wrapped payload
//! helpers every tool response uses. Responses are plain `Value` payloads
//! built by `content_payload`/`error_payload`; the wire has no other shape.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRequest {
    pub jsonrpc: String,
    /// Correlation id, echoed verbatim in the matching response frame.
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl McpRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: None,
            method: method.into(),
            params: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    /// Tool name and arguments from `params`, for `tools/call` messages.
    ///
    /// A missing name comes back as `""` so it flows into the router's
    /// unknown-tool path instead of being a parse failure.
    pub fn tool_call(&self) -> (String, Value) {
        let name = self
            .params
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str())
            .unwrap_or("")
            .to_string();
        let arguments = self
            .params
            .as_ref()
            .and_then(|p| p.get("arguments"))
            .cloned()
            .unwrap_or_else(|| json!({}));
        (name, arguments)
    }
}

/// Wrap a JSON document in the content-shaped result the original protocol
/// uses: `[{"type":"text","text":"<json-string>"}]`.
pub fn content_text(value: &Value) -> Value {
    json!([{ "type": "text", "text": value.to_string() }])
}

/// A complete content-wrapped response payload for one tool result.
pub fn content_payload(value: &Value) -> Value {
    json!({ "jsonrpc": "2.0", "content": content_text(value) })
}

/// Content-wrapped error payload carrying a human-readable message.
pub fn error_payload(message: impl AsRef<str>) -> Value {
    content_payload(&json!({ "error": message.as_ref() }))
}
