//! TCP client engine.
//!
//! [`ClientEngine`] owns one connection to a Tapewire server. Frames are
//! written directly from the caller's task; a background receive task reads
//! server lines and turns them into [`ClientEvent`]s. Only
//! `REQUEST_DATA` expects an answer, and that answer arrives as an event, so
//! no call here blocks waiting on the server.

use std::sync::Arc;

use bytes::BytesMut;
use tapewire_core::RuleSet;
use tapewire_proto::{Frame, LineBuffer, ServerMessage, command::REQUEST_DATA};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::{Mutex, mpsc, watch},
    task::JoinHandle,
    time,
};

use crate::{
    config::ClientConfig,
    error::ClientError,
    event::{ClientEvent, ConnectionState},
};

/// Write half shared with the receive task, which drops it when the server
/// shuts down.
type SharedWriter = Arc<Mutex<Option<OwnedWriteHalf>>>;

/// Publishes state changes to both the watch channel and the event channel.
#[derive(Debug)]
struct StatusReporter {
    state: watch::Sender<ConnectionState>,
    events: mpsc::UnboundedSender<ClientEvent>,
}

impl StatusReporter {
    fn set(&self, state: ConnectionState, detail: impl Into<String>) {
        let detail = detail.into();
        self.state.send_replace(state);
        tracing::info!(%state, %detail, "connection status");
        self.emit(ClientEvent::StatusChanged { state, detail });
    }

    fn emit(&self, event: ClientEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("client event receiver closed");
        }
    }
}

#[derive(Debug)]
struct Connection {
    client_id: String,
    address: String,
    writer: SharedWriter,
    receive_task: JoinHandle<()>,
}

/// Client side of the Tapewire protocol.
///
/// # Invariants
///
/// - Single Writer: all frames go through one write half, so the server sees
///   them in the order `send` was called.
///
/// - Quiet Disconnect: `disconnect` on an engine that is already
///   disconnected changes nothing and emits nothing.
#[derive(Debug)]
pub struct ClientEngine {
    config: ClientConfig,
    status: Arc<StatusReporter>,
    connection: Option<Connection>,
}

impl ClientEngine {
    /// Engine reporting to `events`. Starts disconnected.
    pub fn new(config: ClientConfig, events: mpsc::UnboundedSender<ClientEvent>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self { config, status: Arc::new(StatusReporter { state, events }), connection: None }
    }

    /// Connect and send the handshake.
    ///
    /// `port` is taken as text since it usually comes straight from user
    /// input. On failure a `StatusChanged` event carrying the error is emitted
    /// as well.
    ///
    /// # Errors
    ///
    /// - `ClientError::AlreadyConnected` if a connection is open
    /// - `ClientError::InvalidPort` if `port` is not a number in 0-65535
    /// - `ClientError::Protocol` if `client_id` or `host` cannot be framed
    /// - `ClientError::Connection` if the server cannot be reached in time
    pub async fn connect(
        &mut self,
        client_id: &str,
        host: &str,
        port: &str,
    ) -> Result<(), ClientError> {
        if self.state() != ConnectionState::Disconnected {
            return Err(ClientError::AlreadyConnected);
        }
        // Left over from a connection the server closed
        if let Some(stale) = self.connection.take() {
            stale.receive_task.abort();
        }

        match self.open(client_id, host, port).await {
            Ok(connection) => {
                self.connection = Some(connection);
                Ok(())
            },
            Err(err) => {
                self.status.set(ConnectionState::Disconnected, err.to_string());
                Err(err)
            },
        }
    }

    async fn open(&self, client_id: &str, host: &str, port: &str) -> Result<Connection, ClientError> {
        let port: u16 = port.trim().parse().map_err(|_| ClientError::InvalidPort(port.to_string()))?;

        let mut handshake = BytesMut::new();
        Frame::hello(client_id, host).encode(&mut handshake)?;

        let address = format!("{host}:{port}");
        self.status.set(ConnectionState::Connecting, format!("connecting to {address}"));

        let connecting = TcpStream::connect((host, port));
        let stream = match time::timeout(self.config.connect_timeout, connecting).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(ClientError::Connection { address, reason: e.to_string() }),
            Err(_) => {
                return Err(ClientError::Connection { address, reason: "timed out".to_string() });
            },
        };
        stream.set_nodelay(true)?;

        let (reader, mut writer) = stream.into_split();
        writer.write_all(&handshake).await?;
        tracing::debug!(client_id, %address, "handshake sent");

        // Before the receive task exists, so no server line can precede it
        self.status.set(ConnectionState::Connected, "connected");

        let writer = Arc::new(Mutex::new(Some(writer)));
        let receive_task = tokio::spawn(receive_loop(
            reader,
            Arc::clone(&writer),
            Arc::clone(&self.status),
            self.config.max_line_len,
        ));

        Ok(Connection {
            client_id: client_id.to_string(),
            address: host.to_string(),
            writer,
            receive_task,
        })
    }

    /// Send one payload. No acknowledgement is awaited.
    ///
    /// # Errors
    ///
    /// - `ClientError::NotConnected` if there is no open connection
    /// - `ClientError::Protocol` if the payload cannot be framed
    /// - `ClientError::Io` if the write fails
    pub async fn send(&self, payload: &str) -> Result<(), ClientError> {
        let connection = self.connection.as_ref().ok_or(ClientError::NotConnected)?;

        let mut buf = BytesMut::new();
        Frame::new(connection.client_id.as_str(), connection.address.as_str(), payload)
            .encode(&mut buf)?;

        let mut writer = connection.writer.lock().await;
        let writer = writer.as_mut().ok_or(ClientError::NotConnected)?;
        writer.write_all(&buf).await?;

        tracing::debug!(len = payload.len(), "frame sent");
        Ok(())
    }

    /// Ask the server for the shared slot. The answer arrives as a
    /// [`ClientEvent::MessageReceived`].
    pub async fn request_data(&self) -> Result<(), ClientError> {
        self.send(REQUEST_DATA).await
    }

    /// Close the connection and stop the receive task. Does nothing if
    /// already disconnected.
    pub async fn disconnect(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        connection.receive_task.abort();
        if let Some(mut writer) = connection.writer.lock().await.take() {
            if let Err(e) = writer.shutdown().await {
                tracing::debug!(error = %e, "socket shutdown failed");
            }
        }

        if self.state() != ConnectionState::Disconnected {
            self.status.set(ConnectionState::Disconnected, "disconnected");
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.status.state.borrow()
    }

    /// Watch connection state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.status.state.subscribe()
    }

    /// Client id of the current connection.
    pub fn client_id(&self) -> Option<&str> {
        self.connection.as_ref().map(|c| c.client_id.as_str())
    }
}

impl Drop for ClientEngine {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.receive_task.abort();
        }
    }
}

async fn receive_loop(
    mut reader: OwnedReadHalf,
    writer: SharedWriter,
    status: Arc<StatusReporter>,
    max_line_len: usize,
) {
    let mut lines = LineBuffer::new(max_line_len);
    let mut welcomed = false;

    let detail = 'read: loop {
        loop {
            match lines.next_line() {
                Ok(Some(line)) => {
                    if let Some(reason) = dispatch_line(line, &mut welcomed, &status) {
                        break 'read reason.to_string();
                    }
                },
                Ok(None) => break,
                Err(e) => break 'read format!("protocol error: {e}"),
            }
        }

        match reader.read_buf(lines.buffer_mut()).await {
            Ok(0) => break "connection lost".to_string(),
            Ok(_) => {},
            Err(e) => break format!("connection lost: {e}"),
        }
    };

    writer.lock().await.take();
    status.set(ConnectionState::Disconnected, detail);
}

/// Emit events for one server line. Returns the disconnect reason if the line
/// ends the session.
///
/// Refusal literals only count before `WELCOME`; afterwards they are stored
/// payloads like any other.
fn dispatch_line(
    line: String,
    welcomed: &mut bool,
    status: &StatusReporter,
) -> Option<&'static str> {
    let message = ServerMessage::parse(&line);
    tracing::debug!(?message, welcomed = *welcomed, "server line");

    let ends = if message.ends_session(*welcomed) {
        match message {
            ServerMessage::ClientIdTaken => Some("client id already in use"),
            ServerMessage::ServerFull => Some("server full"),
            _ => Some("server shut down"),
        }
    } else {
        None
    };
    let rules = match message {
        ServerMessage::Welcome if !*welcomed => {
            *welcomed = true;
            None
        },
        ServerMessage::Data(text) => RuleSet::from_text(text).ok(),
        _ => None,
    };

    status.emit(ClientEvent::MessageReceived(line));
    if let Some(rules) = rules {
        status.emit(ClientEvent::RulesReceived(rules));
    }
    ends
}
