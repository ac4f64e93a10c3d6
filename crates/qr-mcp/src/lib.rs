//! qr-mcp: MCP streaming gateway for the Qricambi REST API
//!
//! Exposes a small set of remote-procedure tools (vehicle lookup, supplier
//! listing, price/availability) over a persistent SSE stream and translates
//! the JSON-RPC tool-invocation protocol into calls against the upstream API.
//!
//! Flow:
//! client opens `/sse` → session handshake + catalog announcement →
//! client pushes newline-delimited `tools/call` messages → router dispatches
//! to the upstream client → each result comes back on the same stream tagged
//! with its correlation id.
//!
//! Modules:
//! - `protocol`  → JSON-RPC 2.0 wire types
//! - `catalog`   → static tool catalog
//! - `compat`    → search/fetch compatibility pair (opaque document ids)
//! - `router`    → closed set of tool operations + dispatch
//! - `session`   → streaming session core (framing, heartbeat, task-per-line)
//! - `http`      → axum surface (`/`, `/healthz`, `/sse`)

pub mod catalog;
pub mod compat;
pub mod http;
pub mod protocol;
pub mod router;
pub mod session;

pub use protocol::{content_payload, content_text, error_payload, McpRequest};
pub use router::{ToolCall, ToolRouter};
pub use session::{Frame, Session, SessionOptions};

/// Server identity reported on the root endpoint.
pub const SERVER_NAME: &str = "qricambi-mcp";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The one client→server method the gateway acts on. Anything else on the
/// stream is silently ignored, not errored.
pub const TOOLS_CALL_METHOD: &str = "tools/call";

/// Sentinel correlation id for inbound lines whose id could not be recovered.
pub const PARSE_ERROR_ID: &str = "err";
