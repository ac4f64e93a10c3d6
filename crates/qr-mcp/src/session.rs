//! Streaming Session
//!
//! Owns the lifecycle of one client connection: handshake, catalog
//! announcement, heartbeat, incremental parsing of inbound bytes, and
//! response emission. The session is transport-agnostic: it emits [`Frame`]s
//! into an mpsc channel and the HTTP layer (or a test) drains them.
//!
//! Concurrency model: `feed` is synchronous and never blocks; every complete
//! inbound line becomes one detached task that dispatches and sends its
//! response frame when done. Completions carry no ordering guarantee; the
//! correlation id is the only way a client matches responses to requests.
//! When the session closes, the heartbeat and catalog-resend timers are
//! aborted and any still-running dispatch task is abandoned: its final send
//! fails silently against the closed channel.

use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::catalog::{catalog_announcement, CATALOG_EVENT_ID};
use crate::protocol::{error_payload, McpRequest};
use crate::router::ToolRouter;
use crate::{PARSE_ERROR_ID, TOOLS_CALL_METHOD};

/// One discrete server→client block on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A real event: `event: message` / `id:` / `data:` / blank line.
    Event { id: Value, payload: Value },
    /// A comment line (`:`-prefixed). Used for padding and heartbeats, never
    /// mistakable for a real event by the client parser.
    Comment(String),
    /// Reconnection-interval hint (`retry:`).
    Retry(Duration),
}

impl Frame {
    pub fn event(id: impl Into<Value>, payload: Value) -> Self {
        Frame::Event {
            id: id.into(),
            payload,
        }
    }

    /// Correlation id as the SSE `id:` field value.
    pub fn id_str(id: &Value) -> String {
        let raw = match id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        // The id field is a single header line.
        raw.replace(['\n', '\r'], " ")
    }

    /// Raw SSE text encoding, mirroring what goes over the socket.
    pub fn to_sse(&self) -> String {
        match self {
            Frame::Event { id, payload } => {
                format!("event: message\nid: {}\ndata: {}\n\n", Self::id_str(id), payload)
            }
            Frame::Comment(text) => format!(":{text}\n\n"),
            Frame::Retry(d) => format!("retry: {}\n\n", d.as_millis()),
        }
    }
}

/// Tunables for one session. Defaults match the production wire behavior;
/// tests shrink the intervals.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Heartbeat comment interval while the session is open.
    pub heartbeat: Duration,
    /// Delay before the catalog is announced a second time, for clients that
    /// attach their listeners after connecting. `None` disables the resend.
    pub catalog_resend: Option<Duration>,
    /// Reconnection hint sent at handshake time.
    pub retry_hint: Duration,
    /// Size of the comment padding that forces intermediaries to flush.
    pub padding: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            heartbeat: Duration::from_secs(8),
            catalog_resend: Some(Duration::from_millis(700)),
            retry_hint: Duration::from_millis(4000),
            padding: 2048,
        }
    }
}

/// One live streaming session.
///
/// Dropping the session is the CLOSED transition: timers stop immediately and
/// nothing writes to the stream afterwards.
pub struct Session {
    tx: mpsc::Sender<Frame>,
    router: Arc<ToolRouter>,
    /// Carry-over for a partial line split across inbound chunks.
    carry: Mutex<String>,
    timers: Vec<JoinHandle<()>>,
}

impl Session {
    /// Open a session: queue the handshake frames, start the timers, and
    /// hand back the frame receiver for the transport to drain.
    pub fn open(router: Arc<ToolRouter>, opts: SessionOptions) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(64);

        // Handshake, queued before the constructor returns: padding so any
        // buffering proxy flushes immediately, the reconnect hint, then the
        // one guaranteed catalog announcement.
        let _ = tx.try_send(Frame::Comment(" ".repeat(opts.padding)));
        let _ = tx.try_send(Frame::Retry(opts.retry_hint));
        let _ = tx.try_send(Frame::event(CATALOG_EVENT_ID, catalog_announcement()));

        let mut timers = Vec::new();

        if let Some(delay) = opts.catalog_resend {
            let tx = tx.clone();
            timers.push(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx
                    .send(Frame::event(CATALOG_EVENT_ID, catalog_announcement()))
                    .await;
            }));
        }

        let heartbeat_tx = tx.clone();
        let heartbeat = opts.heartbeat;
        timers.push(tokio::spawn(async move {
            let mut interval = tokio::time::interval(heartbeat);
            interval.tick().await; // consume the immediate first tick
            loop {
                interval.tick().await;
                if heartbeat_tx.send(Frame::Comment(" ping".into())).await.is_err() {
                    break;
                }
            }
        }));

        debug!("session opened");
        (
            Self {
                tx,
                router,
                carry: Mutex::new(String::new()),
                timers,
            },
            rx,
        )
    }

    /// Accept one raw inbound chunk.
    ///
    /// Chunks may split lines at arbitrary byte positions; complete lines are
    /// handled independently, each as its own spawned task. This never blocks
    /// and never fails: a line that is not valid JSON produces an error event
    /// with the sentinel id and later lines are unaffected.
    pub fn feed(&self, chunk: &[u8]) {
        let text = String::from_utf8_lossy(chunk);
        let mut lines = Vec::new();
        {
            let mut carry = self.carry.lock().expect("carry buffer poisoned");
            carry.push_str(&text);
            while let Some(pos) = carry.find('\n') {
                let line: String = carry.drain(..=pos).collect();
                let line = line.trim();
                if !line.is_empty() {
                    lines.push(line.to_string());
                }
            }
        }
        for line in lines {
            self.spawn_line(line);
        }
    }

    /// Flush a trailing line that arrived without a final newline. Called by
    /// the transport once the inbound body stream ends.
    pub fn finish(&self) {
        let rest = {
            let mut carry = self.carry.lock().expect("carry buffer poisoned");
            std::mem::take(&mut *carry)
        };
        let rest = rest.trim();
        if !rest.is_empty() {
            self.spawn_line(rest.to_string());
        }
    }

    /// One parsed line, one detached task.
    fn spawn_line(&self, line: String) {
        trace!(len = line.len(), "inbound line");
        let tx = self.tx.clone();
        let router = self.router.clone();
        tokio::spawn(async move {
            let msg: McpRequest = match serde_json::from_str(&line) {
                Ok(m) => m,
                Err(e) => {
                    // No correlation id could be recovered; use the sentinel.
                    let _ = tx
                        .send(Frame::event(
                            PARSE_ERROR_ID,
                            error_payload(format!("parse error: {e}")),
                        ))
                        .await;
                    return;
                }
            };

            if msg.method != TOOLS_CALL_METHOD {
                // Other message types are legitimate protocol traffic the
                // gateway does not act on.
                trace!(method = %msg.method, "ignoring non-invocation message");
                return;
            }

            let id = msg.id.clone().unwrap_or(Value::Null);
            let (name, arguments) = msg.tool_call();
            let payload = router.handle_call(&name, arguments).await;
            // The session may have closed while we were upstream; the result
            // is simply dropped in that case.
            let _ = tx.send(Frame::event(id, payload)).await;
        });
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        for timer in &self.timers {
            timer.abort();
        }
        debug!("session closed");
    }
}
