//! HTTP surface
//!
//! Axum router for the gateway: root banner, health check, and the two
//! functionally-identical streaming entry points (`GET /sse`, `POST /sse`).
//! The POST variant additionally pumps the request body into the session as
//! newline-delimited invocations.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderName, StatusCode},
    response::{
        sse::{Event, Sse},
        IntoResponse,
    },
    routing::get,
    Json, Router,
};
use futures::StreamExt;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

use crate::router::ToolRouter;
use crate::session::{Frame, Session, SessionOptions};

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ToolRouter>,
    pub options: SessionOptions,
}

impl AppState {
    pub fn new(router: Arc<ToolRouter>) -> Self {
        Self {
            router,
            options: SessionOptions::default(),
        }
    }
}

/// Create the gateway router with permissive CORS.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/healthz", get(health_handler))
        .route(
            "/sse",
            get(sse_get_handler)
                .post(sse_post_handler)
                .options(sse_preflight_handler),
        )
        .with_state(state)
        .layer(cors)
}

async fn root_handler() -> &'static str {
    "Qricambi MCP up"
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// Explicit preflight: empty success, CORS headers come from the layer.
async fn sse_preflight_handler() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// `GET /sse`: catalog announcement and heartbeat only; no inbound channel.
async fn sse_get_handler(State(state): State<AppState>) -> impl IntoResponse {
    info!("SSE client connected (GET)");
    let (session, rx) = Session::open(state.router.clone(), state.options.clone());
    streaming_response(Arc::new(session), rx)
}

/// `POST /sse`: full bidirectional stream. The request body carries
/// newline-delimited invocations while responses flow back as SSE events.
async fn sse_post_handler(State(state): State<AppState>, body: Body) -> impl IntoResponse {
    info!("SSE client connected (POST)");
    let (session, rx) = Session::open(state.router.clone(), state.options.clone());
    let session = Arc::new(session);

    let pump = session.clone();
    tokio::spawn(async move {
        let mut stream = body.into_data_stream();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => pump.feed(&bytes),
                Err(e) => {
                    // Connection reset mid-body: nobody left to report to.
                    debug!(error = %e, "inbound body ended with error");
                    break;
                }
            }
        }
        pump.finish();
    });

    streaming_response(session, rx)
}

/// Build the SSE response from the session's frame channel.
///
/// The response stream owns the session: when the client goes away and axum
/// drops the stream, the session drops with it and the heartbeat stops.
fn streaming_response(
    session: Arc<Session>,
    rx: mpsc::Receiver<Frame>,
) -> impl IntoResponse {
    let stream = ReceiverStream::new(rx).map(move |frame| {
        let _keepalive = &session;
        Ok::<_, Infallible>(frame_to_event(frame))
    });

    (
        [
            (header::CACHE_CONTROL, "no-cache, no-transform"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        Sse::new(stream),
    )
}

fn frame_to_event(frame: Frame) -> Event {
    match frame {
        Frame::Event { id, payload } => Event::default()
            .event("message")
            .id(Frame::id_str(&id))
            .data(payload.to_string()),
        Frame::Comment(text) => Event::default().comment(text),
        Frame::Retry(d) => Event::default().retry(d),
    }
}
