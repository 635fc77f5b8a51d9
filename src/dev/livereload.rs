//! Live-reload channel between the watcher and open browser tabs.
//!
//! # Data Flow
//! ```text
//! SourceWatcher → ReloadHub (broadcast)
//!     → /__livereload WebSocket per tab → "reload" text frame
//!     → injected script calls location.reload()
//! ```

use axum::{
    body::{to_bytes, Body},
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Request, State,
    },
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        HeaderMap, HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::dev::watcher::{ReloadEvent, ReloadHub};

/// WebSocket endpoint browsers connect to.
pub const LIVERELOAD_PATH: &str = "/__livereload";

/// Frame sent to browsers on every change.
pub const RELOAD_MESSAGE: &str = "reload";

/// Largest HTML document buffered for script injection.
const MAX_INJECT_BYTES: usize = 16 * 1024 * 1024;

/// Script appended to served HTML pages.
pub const LIVERELOAD_SCRIPT: &str = concat!(
    "<script>(() => {",
    "const ws = new WebSocket(`${location.protocol === 'https:' ? 'wss' : 'ws'}://${location.host}/__livereload`);",
    "ws.onmessage = (e) => { if (e.data === 'reload') location.reload(); };",
    "})();</script>"
);

/// Upgrade to a WebSocket that forwards reload events.
pub async fn livereload_socket(State(hub): State<ReloadHub>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| forward_reloads(socket, hub.subscribe()))
}

async fn forward_reloads(mut socket: WebSocket, mut events: broadcast::Receiver<ReloadEvent>) {
    tracing::debug!("Live-reload client connected");
    loop {
        tokio::select! {
            event = events.recv() => match event {
                // A lagging tab still needs exactly one reload.
                Ok(_) | Err(RecvError::Lagged(_)) => {
                    if socket.send(Message::Text(RELOAD_MESSAGE.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    tracing::debug!("Live-reload client disconnected");
}

/// Middleware injecting [`LIVERELOAD_SCRIPT`] into full HTML responses.
pub async fn inject_livereload(request: Request, next: Next) -> Response {
    let is_head = request.method() == Method::HEAD;
    let response = next.run(request).await;

    if response.status() != StatusCode::OK || !is_html(response.headers()) {
        return response;
    }

    // Injection always adds the whole script, so HEAD can advertise the GET length.
    if is_head {
        let (mut parts, body) = response.into_parts();
        if let Some(length) = content_length(&parts.headers) {
            parts
                .headers
                .insert(CONTENT_LENGTH, HeaderValue::from(length + LIVERELOAD_SCRIPT.len()));
        }
        return Response::from_parts(parts, body);
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_INJECT_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to buffer HTML for live reload");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read page").into_response();
        }
    };

    parts.headers.remove(CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(inject_script(&bytes)))
}

fn content_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"))
}

/// Insert the script before the last `</body>`, or append it when there is none.
pub fn inject_script(content: &[u8]) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";
    let script = LIVERELOAD_SCRIPT.as_bytes();

    let mut result = Vec::with_capacity(content.len() + script.len());
    match content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
    {
        Some(pos) => {
            result.extend_from_slice(&content[..pos]);
            result.extend_from_slice(script);
            result.extend_from_slice(&content[pos..]);
        }
        None => {
            result.extend_from_slice(content);
            result.extend_from_slice(script);
        }
    }
    result
}
