//! Per-client session task.
//!
//! Each accepted socket runs [`run`] on its own task. The task reads the
//! handshake, registers the client, answers `WELCOME` and then serves frames
//! until the peer closes, the server sends a [`SessionCommand`], or an I/O
//! error occurs. Replies go only to the session's own socket; the task is
//! its sole writer.

use std::{net::SocketAddr, sync::Arc};

use bytes::{BufMut, BytesMut};
use tapewire_proto::{
    Command, Frame, LineBuffer, ProtocolError,
    command::{
        CLIENT_ID_TAKEN, HELLO, MALFORMED_FRAME, MESSAGE_STORED, NO_VALUE_REGISTERED,
        SERVER_FULL, SERVER_SHUTDOWN, WELCOME,
    },
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::mpsc,
    time,
};

use crate::{Shared, error::SessionError, event::ServerEvent, registry::SessionInfo};

/// Control messages delivered to a session through its outbound channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionCommand {
    /// Send `SERVER_SHUTDOWN` and close
    Shutdown,
    /// Close without a notice
    Disconnect,
}

/// Serve one connection from handshake to close.
pub(crate) async fn run(
    stream: TcpStream,
    peer: SocketAddr,
    shared: Arc<Shared>,
) -> Result<(), SessionError> {
    let (mut reader, mut writer) = stream.into_split();
    let mut lines = LineBuffer::new(shared.config.max_line_len);

    let handshake =
        match time::timeout(shared.config.handshake_timeout, read_line(&mut reader, &mut lines)).await {
            Ok(line) => line?.ok_or(SessionError::Closed)?,
            Err(_) => return Err(SessionError::HandshakeTimeout),
        };

    let hello = match parse_handshake(&handshake) {
        Ok(hello) => hello,
        Err(err) => {
            write_line(&mut writer, MALFORMED_FRAME).await?;
            return Err(err.into());
        },
    };
    if hello.payload != HELLO {
        tracing::debug!(%peer, payload = %hello.payload, "unexpected handshake payload");
    }

    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let registration = match Registration::register(&shared, &hello, peer, commands_tx) {
        Ok(registration) => registration,
        Err(err) => {
            let reply = match &err {
                SessionError::ClientIdTaken(_) => CLIENT_ID_TAKEN,
                SessionError::ServerFull(_) => SERVER_FULL,
                _ => SERVER_SHUTDOWN,
            };
            write_line(&mut writer, reply).await?;
            return Err(err);
        },
    };

    tracing::info!(client_id = %hello.client_id, %peer, "client connected");
    shared.emit(ServerEvent::ClientConnected { client_id: hello.client_id.clone(), address: peer });

    let mut session = Session { registration, writer };
    session.serve(reader, lines, commands_rx).await
}

fn parse_handshake(line: &str) -> Result<Frame, ProtocolError> {
    let frame = Frame::decode(line)?;
    if frame.client_id.is_empty() {
        return Err(ProtocolError::InvalidField { field: "client_id", reason: "is empty" });
    }
    Ok(frame)
}

/// Registry entry owned by a live session.
///
/// Dropping it unregisters the client, so a session removes itself whether
/// it returns normally or its task is aborted.
struct Registration {
    shared: Arc<Shared>,
    client_id: String,
    session_id: u64,
}

impl Registration {
    fn register(
        shared: &Arc<Shared>,
        hello: &Frame,
        peer: SocketAddr,
        commands: mpsc::UnboundedSender<SessionCommand>,
    ) -> Result<Self, SessionError> {
        let session_id = shared.next_session_id();
        let info = SessionInfo {
            session_id,
            remote_address: peer,
            reported_address: hello.address.clone(),
        };

        let mut state = shared.lock();
        if state.closing {
            return Err(SessionError::Closed);
        }
        state.registry.register(&hello.client_id, info)?;
        state.outbound.insert(session_id, commands);
        drop(state);

        Ok(Self { shared: Arc::clone(shared), client_id: hello.client_id.clone(), session_id })
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let removed = {
            let mut state = self.shared.lock();
            state.outbound.remove(&self.session_id);
            state.registry.unregister(&self.client_id, self.session_id).is_some()
        };

        if removed {
            tracing::info!(client_id = %self.client_id, "client disconnected");
            self.shared.emit(ServerEvent::ClientDisconnected { client_id: self.client_id.clone() });
        }
    }
}

struct Session {
    registration: Registration,
    writer: OwnedWriteHalf,
}

impl Session {
    async fn serve(
        &mut self,
        mut reader: OwnedReadHalf,
        mut lines: LineBuffer,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    ) -> Result<(), SessionError> {
        write_line(&mut self.writer, WELCOME).await?;

        loop {
            while let Some(line) = lines.next_line()? {
                self.handle_line(&line).await?;
            }

            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(SessionCommand::Shutdown) => {
                        write_line(&mut self.writer, SERVER_SHUTDOWN).await?;
                        self.writer.shutdown().await?;
                        return Ok(());
                    },
                    Some(SessionCommand::Disconnect) | None => {
                        tracing::debug!(client_id = %self.client_id(), "session closed by server");
                        return Ok(());
                    },
                },
                read = reader.read_buf(lines.buffer_mut()) => {
                    if read? == 0 {
                        if let Some(rest) = lines.take_remainder() {
                            self.handle_line(&rest).await?;
                        }
                        return Ok(());
                    }
                },
            }
        }
    }

    async fn handle_line(&mut self, line: &str) -> Result<(), SessionError> {
        let frame = match Frame::decode(line) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(client_id = %self.client_id(), error = %e, "malformed frame");
                return write_line(&mut self.writer, MALFORMED_FRAME).await;
            },
        };

        if frame.client_id != self.client_id() {
            tracing::debug!(
                client_id = %self.client_id(),
                frame_client_id = %frame.client_id,
                "frame names a different client id"
            );
        }

        let shared = &self.registration.shared;
        let reply = match frame.command() {
            Command::RequestData => {
                let state = shared.lock();
                state.registry.last_message().unwrap_or(NO_VALUE_REGISTERED).to_string()
            },
            Command::Store(payload) => {
                shared.lock().registry.store(&self.registration.client_id, payload);
                tracing::debug!(client_id = %self.client_id(), len = payload.len(), "message stored");
                shared.emit(ServerEvent::MessageStored {
                    client_id: self.registration.client_id.clone(),
                    payload: payload.to_string(),
                });
                MESSAGE_STORED.to_string()
            },
        };

        write_line(&mut self.writer, &reply).await
    }

    fn client_id(&self) -> &str {
        &self.registration.client_id
    }
}

async fn read_line(
    reader: &mut OwnedReadHalf,
    lines: &mut LineBuffer,
) -> Result<Option<String>, SessionError> {
    loop {
        if let Some(line) = lines.next_line()? {
            return Ok(Some(line));
        }
        if reader.read_buf(lines.buffer_mut()).await? == 0 {
            return Ok(lines.take_remainder());
        }
    }
}

async fn write_line(writer: &mut OwnedWriteHalf, line: &str) -> Result<(), SessionError> {
    let mut buf = BytesMut::with_capacity(line.len() + 1);
    buf.put_slice(line.as_bytes());
    buf.put_u8(b'\n');
    writer.write_all(&buf).await?;
    Ok(())
}
