//! Gateway session
//!
//! One session per shard. It owns the socket handle, the inflate context and
//! the resume state (`session_id`, last sequence), runs the heartbeat timer and
//! reconnects on its own after a recoverable close.
//!
//! Frames from the reader task are processed in arrival order. Every socket is
//! tagged with a generation so callbacks from a replaced socket are ignored.

use chat_common::ClientConfig;
use chat_core::{EntityStore, Event, EventSink, Snowflake};
use dashmap::DashSet;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use super::heartbeat::Heartbeat;
use super::socket::{self, GatewaySocket, Outbound};
use super::state::SessionState;
use crate::codec::Inflater;
use crate::error::{GatewayError, GatewayResult};
use crate::handlers::{Dispatcher, Followup};
use crate::protocol::{
    close_codes, GatewayEnvelope, HelloPayload, IdentifyPayload, OpCode, PresenceUpdatePayload,
    RequestGuildMembersPayload, ResumePayload, NORMAL_CLOSE, RECONNECT_CLOSE,
};
use crate::url::GatewayUrl;

/// Socket open attempts per `connect()`
pub const CONNECT_ATTEMPTS: u32 = 3;

/// Resources of the currently open socket
struct SocketHandle {
    outbound: mpsc::UnboundedSender<Outbound>,
    inflater: Inflater,
}

struct SessionInner {
    state: SessionState,
    session_id: Option<String>,
    /// Last dispatch sequence, -1 when none has been seen
    last_sequence: i64,
    heartbeat_interval: u64,
    connection_attempts: u32,
    generation: u64,
    socket: Option<SocketHandle>,
}

impl Default for SessionInner {
    fn default() -> Self {
        Self {
            state: SessionState::Disconnected,
            session_id: None,
            last_sequence: -1,
            heartbeat_interval: 0,
            connection_attempts: 0,
            generation: 0,
            socket: None,
        }
    }
}

/// Gateway connection for one shard
pub struct GatewaySession {
    shard_id: u32,
    shard_count: u32,
    token: String,
    intents: Option<u64>,
    reconnect_delay: Duration,
    url: Arc<GatewayUrl>,
    dispatcher: Dispatcher,
    me: Weak<Self>,
    inner: Mutex<SessionInner>,
    heartbeat: Heartbeat,
    reconnect: Mutex<Option<AbortHandle>>,
    /// Guilds that live on this shard
    guilds: DashSet<Snowflake>,
    /// Last time each opcode was received
    last_seen: Mutex<[Option<Instant>; OpCode::SLOTS]>,
}

impl GatewaySession {
    pub fn new(
        shard_id: u32,
        config: &ClientConfig,
        url: Arc<GatewayUrl>,
        store: Arc<dyn EntityStore>,
        sink: Arc<dyn EventSink>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            shard_id,
            shard_count: config.shard_count,
            token: config.token.clone(),
            intents: config.intents,
            reconnect_delay: config.reconnect_delay(),
            url,
            dispatcher: Dispatcher::new(shard_id, store, sink),
            me: me.clone(),
            inner: Mutex::new(SessionInner::default()),
            heartbeat: Heartbeat::new(),
            reconnect: Mutex::new(None),
            guilds: DashSet::new(),
            last_seen: Mutex::new([None; OpCode::SLOTS]),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn shard_id(&self) -> u32 {
        self.shard_id
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    pub fn session_id(&self) -> Option<String> {
        self.inner.lock().session_id.clone()
    }

    /// Last dispatch sequence, -1 when none has been seen
    pub fn last_sequence(&self) -> i64 {
        self.inner.lock().last_sequence
    }

    /// Interval from the last Hello, in milliseconds
    pub fn heartbeat_interval(&self) -> u64 {
        self.inner.lock().heartbeat_interval
    }

    pub fn connection_attempts(&self) -> u32 {
        self.inner.lock().connection_attempts
    }

    pub fn is_heartbeat_running(&self) -> bool {
        self.heartbeat.is_running()
    }

    pub fn is_heartbeat_acked(&self) -> bool {
        self.heartbeat.is_acked()
    }

    /// Whether a reconnect is waiting for its delay to pass
    pub fn reconnect_pending(&self) -> bool {
        self.reconnect
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    pub fn has_guild(&self, guild_id: Snowflake) -> bool {
        self.guilds.contains(&guild_id)
    }

    pub fn guild_ids(&self) -> Vec<Snowflake> {
        self.guilds.iter().map(|id| *id).collect()
    }

    /// When `op` was last received on any socket of this session
    pub fn last_seen(&self, op: OpCode) -> Option<Instant> {
        self.last_seen.lock()[op.slot()]
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Open the socket
    ///
    /// Tries up to [`CONNECT_ATTEMPTS`] times. Once the socket is open the
    /// session resumes if it holds a session id, otherwise it waits for Hello
    /// and identifies.
    pub async fn connect(&self) -> GatewayResult<()> {
        let Some(session) = self.me.upgrade() else {
            return Err(GatewayError::NotConnected);
        };
        self.set_state(SessionState::Connecting);

        let url = match self.url.resolve().await {
            Ok(url) => url,
            Err(e) => {
                self.set_state(SessionState::Disconnected);
                return Err(e);
            }
        };

        let mut reason = String::new();
        for attempt in 1..=CONNECT_ATTEMPTS {
            {
                let mut inner = self.inner.lock();
                if inner.state != SessionState::Connecting {
                    tracing::debug!(shard_id = self.shard_id, state = %inner.state, "Connect abandoned");
                    return Ok(());
                }
                inner.connection_attempts = attempt;
            }
            tracing::info!(shard_id = self.shard_id, attempt, "Connecting to gateway");

            match tokio_tungstenite::connect_async(url.as_str()).await {
                Ok((stream, _)) => {
                    let stream: GatewaySocket = stream;
                    socket::spawn(&session, stream);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(shard_id = self.shard_id, attempt, error = %e, "Gateway connect failed");
                    reason = e.to_string();
                }
            }
        }

        self.set_state(SessionState::Disconnected);
        Err(GatewayError::Connect {
            url,
            attempts: CONNECT_ATTEMPTS,
            reason,
        })
    }

    /// Close the socket with a normal closure and stay disconnected
    pub fn disconnect(&self) {
        if let Some(task) = self.reconnect.lock().take() {
            task.abort();
        }
        self.heartbeat.stop();

        let mut inner = self.inner.lock();
        match inner.socket.take() {
            Some(socket) => {
                inner.state = SessionState::Disconnecting;
                let _ = socket.outbound.send(Outbound::Close(NORMAL_CLOSE, String::new()));
                tracing::info!(shard_id = self.shard_id, "Disconnecting from gateway");
            }
            None => {
                tracing::debug!(shard_id = self.shard_id, state = %inner.state, "Disconnect without socket");
                inner.state = SessionState::Disconnected;
            }
        }
    }

    /// Send a presence update
    pub fn set_presence(&self, presence: &PresenceUpdatePayload) -> GatewayResult<()> {
        self.send(OpCode::PresenceUpdate, presence)
    }

    /// Adopt a freshly opened socket whose writer drains `outbound`
    ///
    /// Returns the generation tag for the socket's callbacks, or `None` when
    /// the session stopped connecting while the handshake was in flight. A
    /// socket that was still attached gets a normal closure.
    pub(crate) fn attach(&self, outbound: mpsc::UnboundedSender<Outbound>) -> Option<u64> {
        let (generation, resume, replaced) = {
            let mut inner = self.inner.lock();
            if inner.state != SessionState::Connecting {
                tracing::info!(shard_id = self.shard_id, state = %inner.state, "Discarding socket opened after disconnect");
                return None;
            }
            inner.generation += 1;
            let replaced = inner.socket.replace(SocketHandle {
                outbound,
                inflater: Inflater::new(),
            });
            inner.state = SessionState::Connected;
            inner.connection_attempts = 0;
            (inner.generation, inner.session_id.is_some(), replaced)
        };

        if let Some(old) = replaced {
            tracing::debug!(shard_id = self.shard_id, "Closing replaced socket");
            let _ = old.outbound.send(Outbound::Close(NORMAL_CLOSE, String::new()));
        }

        tracing::info!(shard_id = self.shard_id, resume, "Gateway socket open");
        if resume {
            self.resume();
        }
        Some(generation)
    }

    /// Attach a socket as if `connect()` had just opened it
    #[cfg(test)]
    pub(crate) fn attach_opened(&self, outbound: mpsc::UnboundedSender<Outbound>) -> u64 {
        self.set_state(SessionState::Connecting);
        self.attach(outbound).expect("session is connecting")
    }

    /// Socket closed, by either side or by an I/O error (`code` is `None`)
    pub(crate) fn on_close(&self, generation: u64, code: Option<u16>) {
        let reconnect = {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                tracing::debug!(shard_id = self.shard_id, "Close from a replaced socket");
                return;
            }
            if inner.state == SessionState::Resuming {
                return;
            }

            inner.socket = None;
            let deliberate = inner.state == SessionState::Disconnecting;
            if deliberate || !close_codes::is_recoverable(code) {
                inner.state = SessionState::Disconnected;
                false
            } else {
                inner.state = SessionState::Resuming;
                true
            }
        };
        self.heartbeat.stop();

        if reconnect {
            tracing::info!(
                shard_id = self.shard_id,
                close_code = ?code,
                delay_ms = self.reconnect_delay.as_millis() as u64,
                "Gateway closed, resuming"
            );
        } else {
            tracing::info!(shard_id = self.shard_id, close_code = ?code, "Gateway closed");
        }

        self.dispatcher.sink().publish(Event::ShardDisconnected {
            shard_id: self.shard_id,
            close_code: code,
        });

        if reconnect {
            self.schedule_reconnect();
        }
    }

    fn schedule_reconnect(&self) {
        let session = self.me.clone();
        let delay = self.reconnect_delay;

        let mut slot = self.reconnect.lock();
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(session) = session.upgrade() else {
                return;
            };
            session.reconnect.lock().take();
            if session.state() != SessionState::Resuming {
                return;
            }
            if let Err(e) = session.connect().await {
                tracing::warn!(shard_id = session.shard_id, error = %e, "Reconnect failed, retrying");
                session.set_state(SessionState::Resuming);
                session.schedule_reconnect();
            }
        });
        *slot = Some(handle.abort_handle());
    }

    fn set_state(&self, state: SessionState) {
        self.inner.lock().state = state;
    }

    // =========================================================================
    // Inbound frames
    // =========================================================================

    pub(crate) fn on_binary(&self, generation: u64, frame: &[u8]) {
        let decoded = {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                return;
            }
            let Some(socket) = inner.socket.as_mut() else {
                return;
            };
            socket.inflater.push(frame)
        };

        match decoded {
            Ok(Some(text)) => self.handle_text(&text),
            Ok(None) => {}
            Err(e) => {
                // The shared inflate context cannot recover from a corrupt frame
                tracing::warn!(shard_id = self.shard_id, error = %e, "Dropping undecodable frame, reconnecting");
                self.close_socket(RECONNECT_CLOSE, "decode error");
            }
        }
    }

    pub(crate) fn on_text(&self, generation: u64, text: &str) {
        if self.inner.lock().generation != generation {
            return;
        }
        self.handle_text(text);
    }

    fn handle_text(&self, text: &str) {
        let envelope = match GatewayEnvelope::from_json(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(shard_id = self.shard_id, error = %e, "Dropping malformed frame");
                return;
            }
        };
        let Some(op) = envelope.opcode() else {
            tracing::warn!(shard_id = self.shard_id, op = envelope.op, "Unknown opcode");
            return;
        };
        self.last_seen.lock()[op.slot()] = Some(Instant::now());
        tracing::trace!(shard_id = self.shard_id, op = %op, "Received frame");

        match op {
            OpCode::Dispatch => self.on_dispatch(envelope),
            OpCode::Heartbeat => self.send_heartbeat(),
            OpCode::Reconnect => {
                tracing::info!(shard_id = self.shard_id, "Gateway requested reconnect");
                self.heartbeat.stop();
                self.close_socket(RECONNECT_CLOSE, "reconnect");
            }
            OpCode::InvalidSession => {
                tracing::info!(shard_id = self.shard_id, "Session invalidated, identifying");
                {
                    let mut inner = self.inner.lock();
                    inner.session_id = None;
                    inner.last_sequence = -1;
                }
                self.identify();
            }
            OpCode::Hello => self.on_hello(envelope.d),
            OpCode::HeartbeatAck => self.heartbeat.acknowledge(),
            OpCode::Identify
            | OpCode::PresenceUpdate
            | OpCode::Resume
            | OpCode::RequestGuildMembers => {
                tracing::warn!(shard_id = self.shard_id, op = %op, "Unexpected client opcode from gateway");
            }
        }
    }

    fn on_hello(&self, data: Value) {
        let hello: HelloPayload = match serde_json::from_value(data) {
            Ok(hello) => hello,
            Err(e) => {
                tracing::warn!(shard_id = self.shard_id, error = %e, "Malformed Hello");
                return;
            }
        };

        let identify = {
            let mut inner = self.inner.lock();
            inner.heartbeat_interval = hello.heartbeat_interval;
            inner.session_id.is_none()
        };
        tracing::debug!(shard_id = self.shard_id, interval_ms = hello.heartbeat_interval, "Hello");

        let session = self.me.clone();
        self.heartbeat
            .start(Duration::from_millis(hello.heartbeat_interval), move || {
                session.upgrade().is_some_and(|session| {
                    session.heartbeat_tick();
                    true
                })
            });

        if identify {
            self.identify();
        }
    }

    fn on_dispatch(&self, envelope: GatewayEnvelope) {
        if let Some(sequence) = envelope.s {
            self.inner.lock().last_sequence = sequence;
        }
        let Some(name) = envelope.t.as_deref() else {
            tracing::warn!(shard_id = self.shard_id, "Dispatch without event name");
            return;
        };

        match self.dispatcher.dispatch(name, &envelope.d) {
            Ok(followups) => {
                for followup in followups {
                    self.apply(followup);
                }
            }
            Err(e) => {
                tracing::warn!(shard_id = self.shard_id, event = %name, error = %e, "Dropping malformed dispatch");
            }
        }
    }

    fn apply(&self, followup: Followup) {
        match followup {
            Followup::Ready { session_id } => {
                tracing::info!(shard_id = self.shard_id, session_id = %session_id, "Session ready");
                self.inner.lock().session_id = Some(session_id);
                self.dispatcher.sink().publish(Event::ShardConnected {
                    shard_id: self.shard_id,
                });
            }
            Followup::Resumed => {
                tracing::info!(shard_id = self.shard_id, "Session resumed");
                self.set_state(SessionState::Resumed);
                self.dispatcher.sink().publish(Event::ShardResumed {
                    shard_id: self.shard_id,
                });
            }
            Followup::GuildAvailable(guild_id) => {
                self.guilds.insert(guild_id);
            }
            Followup::GuildRemoved(guild_id) => {
                self.guilds.remove(&guild_id);
            }
            Followup::RequestMembers(guild_id) => {
                self.send_logged(OpCode::RequestGuildMembers, &RequestGuildMembersPayload::all(guild_id));
            }
        }
    }

    /// One heartbeat timer tick
    ///
    /// Sends a heartbeat if the previous one was acknowledged. Returns whether
    /// it was sent.
    pub fn heartbeat_tick(&self) -> bool {
        if self.heartbeat.take_ack() {
            self.send_heartbeat();
            true
        } else {
            tracing::warn!(shard_id = self.shard_id, "Heartbeat ack missing, skipping heartbeat");
            false
        }
    }

    // =========================================================================
    // Outbound frames
    // =========================================================================

    fn identify(&self) {
        let payload = IdentifyPayload::new(self.token.clone(), self.shard_id, self.shard_count)
            .with_intents(self.intents);
        tracing::debug!(shard_id = self.shard_id, "Identifying");
        self.send_logged(OpCode::Identify, &payload);
    }

    fn resume(&self) {
        let payload = {
            let inner = self.inner.lock();
            let Some(session_id) = inner.session_id.clone() else {
                return;
            };
            ResumePayload {
                token: self.token.clone(),
                session_id,
                seq: inner.last_sequence,
            }
        };
        tracing::debug!(shard_id = self.shard_id, seq = payload.seq, "Resuming");
        self.send_logged(OpCode::Resume, &payload);
    }

    fn send_heartbeat(&self) {
        let sequence = self.last_sequence();
        let data = if sequence < 0 {
            Value::Null
        } else {
            Value::from(sequence)
        };
        self.send_logged(OpCode::Heartbeat, &data);
    }

    fn send<T: Serialize + ?Sized>(&self, op: OpCode, payload: &T) -> GatewayResult<()> {
        let text = GatewayEnvelope::new(op, serde_json::to_value(payload)?).to_json()?;
        let inner = self.inner.lock();
        let socket = inner.socket.as_ref().ok_or(GatewayError::NotConnected)?;
        socket
            .outbound
            .send(Outbound::Text(text))
            .map_err(|_| GatewayError::NotConnected)?;
        tracing::trace!(shard_id = self.shard_id, op = %op, "Sent frame");
        Ok(())
    }

    fn send_logged<T: Serialize + ?Sized>(&self, op: OpCode, payload: &T) {
        if let Err(e) = self.send(op, payload) {
            tracing::warn!(shard_id = self.shard_id, op = %op, error = %e, "Failed to send frame");
        }
    }

    fn close_socket(&self, code: u16, reason: &str) {
        if let Some(socket) = self.inner.lock().socket.as_ref() {
            let _ = socket.outbound.send(Outbound::Close(code, reason.to_string()));
        }
    }
}

impl Drop for GatewaySession {
    fn drop(&mut self) {
        if let Some(task) = self.reconnect.get_mut().take() {
            task.abort();
        }
    }
}
