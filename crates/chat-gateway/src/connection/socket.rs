//! Socket reader and writer tasks
//!
//! Each open socket gets one reader task that feeds frames to the session in
//! arrival order and one writer task that drains the session's outbound queue.

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use std::sync::{Arc, Weak};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::GatewaySession;
use crate::protocol::NORMAL_CLOSE;

/// Client socket type
pub type GatewaySocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Frame queued for the writer task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text(String),
    Close(u16, String),
}

/// Hand an open socket to `session` and start its reader and writer
///
/// If the session no longer wants the socket it is closed normally instead.
pub(crate) fn spawn<S>(session: &Arc<GatewaySession>, socket: S)
where
    S: Stream<Item = Result<Message, WsError>> + Sink<Message, Error = WsError> + Send + Unpin + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let (sink, stream) = socket.split();

    match session.attach(tx.clone()) {
        Some(generation) => {
            tokio::spawn(read_loop(stream, Arc::downgrade(session), generation));
        }
        None => {
            drop(stream);
            let _ = tx.send(Outbound::Close(NORMAL_CLOSE, String::new()));
        }
    }
    tokio::spawn(write_loop(sink, rx, session.shard_id()));
}

async fn read_loop<S>(mut stream: S, session: Weak<GatewaySession>, generation: u64)
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    let mut close_code = None;
    while let Some(frame) = stream.next().await {
        let Some(session) = session.upgrade() else {
            return;
        };
        match frame {
            Ok(Message::Text(text)) => session.on_text(generation, &text),
            Ok(Message::Binary(bytes)) => session.on_binary(generation, &bytes),
            Ok(Message::Close(frame)) => {
                close_code = frame.map(|frame| u16::from(frame.code));
                break;
            }
            // Ping/pong are answered by tungstenite
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(shard_id = session.shard_id(), error = %e, "Gateway socket error");
                break;
            }
        }
    }

    if let Some(session) = session.upgrade() {
        session.on_close(generation, close_code);
    }
}

async fn write_loop<S>(mut sink: S, mut rx: mpsc::UnboundedReceiver<Outbound>, shard_id: u32)
where
    S: Sink<Message, Error = WsError> + Unpin,
{
    while let Some(outbound) = rx.recv().await {
        let (message, last) = match outbound {
            Outbound::Text(text) => (Message::Text(text), false),
            Outbound::Close(code, reason) => {
                let frame = CloseFrame {
                    code: code.into(),
                    reason: reason.into(),
                };
                (Message::Close(Some(frame)), true)
            }
        };

        if let Err(e) = sink.send(message).await {
            tracing::warn!(shard_id, error = %e, "Failed to write to gateway socket");
            break;
        }
        if last {
            break;
        }
    }
}
