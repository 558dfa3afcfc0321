//! Fake platform server and waiting helpers

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use axum::body::Bytes;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chat_client::ClientConfig;
use chat_core::Event;
use flate2::{Compress, Compression, FlushCompress};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;

/// Token the fake server expects
pub const TOKEN: &str = "Bot integration-token";

/// Upper bound for any single wait in a test
pub const WAIT: Duration = Duration::from_secs(5);

/// A request the fake REST API received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub user_agent: Option<String>,
    pub body: Option<Value>,
}

/// Frame the client sent over the gateway socket
#[derive(Debug, Clone, PartialEq)]
pub enum ClientFrame {
    Payload(Value),
    Close(Option<u16>),
}

enum ServerCommand {
    Send(Value),
    SendSplit(Value),
    Close(u16),
    Drop,
}

struct ServerState {
    addr: SocketAddr,
    connections: mpsc::UnboundedSender<FakeConnection>,
    requests: parking_lot::Mutex<Vec<RecordedRequest>>,
    rate_limited: AtomicBool,
    gateway_lookups: AtomicUsize,
}

impl ServerState {
    fn record(&self, method: &Method, uri: &Uri, headers: &HeaderMap, body: &Bytes) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        self.requests.lock().push(RecordedRequest {
            method: method.to_string(),
            path: uri.path().to_string(),
            authorization: header("authorization"),
            user_agent: header("user-agent"),
            body: serde_json::from_slice(body).ok(),
        });
    }
}

/// In-process REST API and gateway
pub struct FakeServer {
    pub addr: SocketAddr,
    state: Arc<ServerState>,
    connections: Mutex<mpsc::UnboundedReceiver<FakeConnection>>,
    _handle: JoinHandle<()>,
}

impl FakeServer {
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (tx, rx) = mpsc::unbounded_channel();

        let state = Arc::new(ServerState {
            addr,
            connections: tx,
            requests: parking_lot::Mutex::new(Vec::new()),
            rate_limited: AtomicBool::new(false),
            gateway_lookups: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/gateway", get(gateway_lookup))
            .route("/ws", get(gateway_socket))
            .route("/channels/:channel_id/messages", post(create_message))
            .route("/channels/:channel_id/messages/:message_id", delete(delete_message))
            .with_state(Arc::clone(&state));

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            state,
            connections: Mutex::new(rx),
            _handle: handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration pointing at this server
    ///
    /// The gateway URL is looked up over REST; reconnects wait 100ms.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(TOKEN)
            .with_api_url(self.base_url())
            .with_reconnect_delay(Duration::from_millis(100))
    }

    /// Wait for the next gateway connection
    pub async fn accept(&self) -> Result<FakeConnection> {
        self.try_accept(WAIT)
            .await
            .ok_or_else(|| anyhow!("no gateway connection within {WAIT:?}"))
    }

    /// Next gateway connection, or `None` if none arrives within `within`
    pub async fn try_accept(&self, within: Duration) -> Option<FakeConnection> {
        let mut connections = self.connections.lock().await;
        tokio::time::timeout(within, connections.recv()).await.ok().flatten()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    pub fn gateway_lookups(&self) -> usize {
        self.state.gateway_lookups.load(Ordering::SeqCst)
    }
}

/// Server side of one gateway socket
pub struct FakeConnection {
    commands: mpsc::UnboundedSender<ServerCommand>,
    frames: mpsc::UnboundedReceiver<ClientFrame>,
}

impl FakeConnection {
    /// Send a compressed payload in one frame
    pub fn send(&self, payload: Value) {
        let _ = self.commands.send(ServerCommand::Send(payload));
    }

    /// Send a compressed payload split across two frames
    pub fn send_split(&self, payload: Value) {
        let _ = self.commands.send(ServerCommand::SendSplit(payload));
    }

    /// Close the socket with `code`
    pub fn close(&self, code: u16) {
        let _ = self.commands.send(ServerCommand::Close(code));
    }

    /// Drop the socket without a close frame
    pub fn drop_socket(&self) {
        let _ = self.commands.send(ServerCommand::Drop);
    }

    pub async fn next_frame(&mut self) -> Result<ClientFrame> {
        tokio::time::timeout(WAIT, self.frames.recv())
            .await
            .context("timed out waiting for a client frame")?
            .ok_or_else(|| anyhow!("gateway socket closed"))
    }

    /// Wait for a payload with opcode `op`, skipping heartbeats
    pub async fn expect_op(&mut self, op: u64) -> Result<Value> {
        loop {
            match self.next_frame().await? {
                ClientFrame::Payload(payload) if payload["op"] == op => return Ok(payload),
                ClientFrame::Payload(payload) if payload["op"] == 1 => {}
                other => bail!("expected op {op}, got {other:?}"),
            }
        }
    }

    /// Wait for the client's close frame, skipping payloads
    pub async fn expect_close(&mut self) -> Result<Option<u16>> {
        loop {
            if let ClientFrame::Close(code) = self.next_frame().await? {
                return Ok(code);
            }
        }
    }
}

/// Zlib stream with one sync flush per message
struct Deflater(Compress);

impl Deflater {
    fn new() -> Self {
        Self(Compress::new(Compression::default(), true))
    }

    fn compress(&mut self, text: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len() + 64);
        let mut input = text.as_bytes();
        loop {
            out.reserve(1024);
            let before = self.0.total_in();
            if self.0.compress_vec(input, &mut out, FlushCompress::Sync).is_err() {
                return out;
            }
            input = &input[(self.0.total_in() - before) as usize..];
            if input.is_empty() && out.ends_with(&[0x00, 0x00, 0xFF, 0xFF]) {
                return out;
            }
        }
    }
}

// ============================================================================
// Routes
// ============================================================================

async fn gateway_lookup(
    State(state): State<Arc<ServerState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    state.record(&method, &uri, &headers, &body);
    state.gateway_lookups.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "url": format!("ws://{}/ws", state.addr) }))
}

async fn create_message(
    State(state): State<Arc<ServerState>>,
    Path(channel_id): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.record(&method, &uri, &headers, &body);
    let request: Value = serde_json::from_slice(&body).unwrap_or_default();
    let embeds = request.get("embed").map_or_else(Vec::new, |embed| vec![embed.clone()]);

    let message = json!({
        "id": "900",
        "channel_id": channel_id,
        "author": {"id": "5", "username": "bot", "discriminator": "0000"},
        "content": request["content"],
        "embeds": embeds
    });
    (
        [("x-ratelimit-remaining", "4"), ("x-ratelimit-reset", "0")],
        Json(message),
    )
        .into_response()
}

/// Answers 429 once, then succeeds
async fn delete_message(
    State(state): State<Arc<ServerState>>,
    Path((_channel_id, _message_id)): Path<(String, String)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.record(&method, &uri, &headers, &body);
    if !state.rate_limited.swap(true, Ordering::SeqCst) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"message": "You are being rate limited.", "retry_after": 50, "global": false})),
        )
            .into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn gateway_socket(State(state): State<Arc<ServerState>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| serve_socket(state, socket))
}

async fn serve_socket(state: Arc<ServerState>, mut socket: WebSocket) {
    let (command_tx, mut commands) = mpsc::unbounded_channel();
    let (frame_tx, frames) = mpsc::unbounded_channel();
    let _ = state.connections.send(FakeConnection {
        commands: command_tx,
        frames,
    });

    let mut deflater = Deflater::new();
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(ServerCommand::Send(payload)) => {
                    let frame = deflater.compress(&payload.to_string());
                    if socket.send(Message::Binary(frame)).await.is_err() {
                        break;
                    }
                }
                Some(ServerCommand::SendSplit(payload)) => {
                    let frame = deflater.compress(&payload.to_string());
                    let (head, tail) = frame.split_at(frame.len() / 2);
                    if socket.send(Message::Binary(head.to_vec())).await.is_err()
                        || socket.send(Message::Binary(tail.to_vec())).await.is_err()
                    {
                        break;
                    }
                }
                Some(ServerCommand::Close(code)) => {
                    let frame = CloseFrame { code, reason: "".into() };
                    let _ = socket.send(Message::Close(Some(frame))).await;
                    break;
                }
                Some(ServerCommand::Drop) | None => break,
            },
            frame = socket.recv() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if let Ok(payload) = serde_json::from_str(&text) {
                        let _ = frame_tx.send(ClientFrame::Payload(payload));
                    }
                }
                // Keep reading so the close reply gets flushed
                Some(Ok(Message::Close(close))) => {
                    let _ = frame_tx.send(ClientFrame::Close(close.map(|frame| frame.code)));
                }
                Some(Ok(_)) => {}
                Some(Err(_)) | None => break,
            },
        }
    }
}

// ============================================================================
// Waiting helpers
// ============================================================================

/// Next event matching `predicate`, skipping the rest
pub async fn wait_for_event<F>(events: &mut broadcast::Receiver<Event>, predicate: F) -> Result<Event>
where
    F: Fn(&Event) -> bool,
{
    let wait = async {
        loop {
            match events.recv().await {
                Ok(event) if predicate(&event) => return Ok(event),
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => bail!("event stream closed"),
            }
        }
    };
    tokio::time::timeout(WAIT, wait)
        .await
        .context("timed out waiting for event")?
}

/// Poll `condition` until it holds
pub async fn wait_until<F>(condition: F) -> Result<()>
where
    F: Fn() -> bool,
{
    let poll = async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    tokio::time::timeout(WAIT, poll)
        .await
        .context("condition not met in time")
}
