//! Tapewire relay server.
//!
//! Accepts TCP connections from Tapewire clients, gives each one a session
//! task, and keeps a single shared message slot that any client can
//! overwrite and any client can read back with `REQUEST_DATA`.
//!
//! # Architecture
//!
//! [`SessionRegistry`] is plain data (sessions, shared slot, message log).
//! The server wraps it in one mutex together with every session's outbound
//! control channel. Socket I/O happens only in the accept loop and the
//! session tasks, never while the lock is held.
//!
//! # Components
//!
//! - [`Server`]: binds the listener and spawns the accept loop
//! - [`ServerHandle`]: stop, forced disconnect, and read-only queries
//! - [`SessionRegistry`]: client id → session, shared slot, message log
//! - [`ServerEvent`]: notifications for the server's owner

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod error;
mod event;
mod registry;
mod session;

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

pub use config::{DEFAULT_PORT, ServerConfig};
pub use error::{ServerError, SessionError};
pub use event::{ServerEvent, ServerState};
pub use registry::{MessageRecord, SessionInfo, SessionRegistry};
use session::SessionCommand;
use tokio::{
    net::TcpListener,
    sync::{mpsc, watch},
    task::{JoinHandle, JoinSet},
    time,
};

/// State shared by the accept loop, every session, and every handle.
struct Shared {
    config: ServerConfig,
    state: Mutex<SharedState>,
    events: mpsc::UnboundedSender<ServerEvent>,
    lifecycle: watch::Sender<ServerState>,
    next_session_id: AtomicU64,
}

/// Everything behind the server's single lock.
struct SharedState {
    registry: SessionRegistry,
    /// Session ID → control channel of that session
    outbound: HashMap<u64, mpsc::UnboundedSender<SessionCommand>>,
    /// Set once shutdown begins; late handshakes are refused
    closing: bool,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: ServerEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("server event receiver closed");
        }
    }

    fn next_session_id(&self) -> u64 {
        self.next_session_id.fetch_add(1, Ordering::Relaxed)
    }

    fn set_state(&self, state: ServerState) {
        let previous = self.lifecycle.send_replace(state);
        if previous != state {
            tracing::info!(?state, "server state changed");
            self.emit(ServerEvent::StateChanged(state));
        }
    }
}

/// Tapewire server entry point.
pub struct Server;

impl Server {
    /// Bind the listener and start accepting connections.
    ///
    /// Events are sent to `events` for as long as the server runs; a closed
    /// receiver is not an error.
    ///
    /// # Errors
    ///
    /// - `ServerError::Config` if the configuration is unusable
    /// - `ServerError::Bind` if the listener cannot be bound
    pub async fn start(
        config: ServerConfig,
        events: mpsc::UnboundedSender<ServerEvent>,
    ) -> Result<ServerHandle, ServerError> {
        if config.max_sessions == 0 {
            return Err(ServerError::Config("max_sessions must be at least 1".to_string()));
        }
        if config.max_line_len == 0 {
            return Err(ServerError::Config("max_line_len must be at least 1".to_string()));
        }

        let listener = TcpListener::bind(&config.bind_address)
            .await
            .map_err(|source| ServerError::Bind { address: config.bind_address.clone(), source })?;
        let local_addr = listener.local_addr()?;

        let (lifecycle, _) = watch::channel(ServerState::Stopped);
        let shared = Arc::new(Shared {
            state: Mutex::new(SharedState {
                registry: SessionRegistry::new(config.max_sessions, config.message_log_capacity),
                outbound: HashMap::new(),
                closing: false,
            }),
            config,
            events,
            lifecycle,
            next_session_id: AtomicU64::new(1),
        });

        tracing::info!(%local_addr, "server listening");
        shared.set_state(ServerState::Listening);

        let (stop_tx, stop_rx) = watch::channel(false);
        let accept_task = tokio::spawn(accept_loop(listener, Arc::clone(&shared), stop_rx));

        Ok(ServerHandle {
            inner: Arc::new(HandleInner {
                shared,
                local_addr,
                stop_tx,
                accept_task: Mutex::new(Some(accept_task)),
            }),
        })
    }
}

struct HandleInner {
    shared: Arc<Shared>,
    local_addr: SocketAddr,
    stop_tx: watch::Sender<bool>,
    accept_task: Mutex<Option<JoinHandle<()>>>,
}

/// Cloneable control handle for a running server.
///
/// Dropping every handle stops the server as if [`ServerHandle::stop`] had
/// been called, without waiting for it.
#[derive(Clone)]
pub struct ServerHandle {
    inner: Arc<HandleInner>,
}

impl ServerHandle {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServerState {
        *self.inner.shared.lifecycle.borrow()
    }

    /// Watch lifecycle state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<ServerState> {
        self.inner.shared.lifecycle.subscribe()
    }

    /// Number of registered sessions.
    pub fn session_count(&self) -> usize {
        self.inner.shared.lock().registry.session_count()
    }

    /// Connected client ids, sorted.
    pub fn client_ids(&self) -> Vec<String> {
        self.inner.shared.lock().registry.client_ids()
    }

    /// Current contents of the shared slot.
    pub fn last_message(&self) -> Option<String> {
        self.inner.shared.lock().registry.last_message().map(str::to_string)
    }

    /// Stored payloads, oldest first.
    pub fn message_log(&self) -> Vec<MessageRecord> {
        self.inner.shared.lock().registry.message_log().cloned().collect()
    }

    /// Close one client's session without a shutdown notice.
    ///
    /// Returns `false` if no such client is connected.
    pub fn disconnect_client(&self, client_id: &str) -> bool {
        let state = self.inner.shared.lock();
        let Some(info) = state.registry.session(client_id) else {
            return false;
        };
        let sent = state
            .outbound
            .get(&info.session_id)
            .is_some_and(|tx| tx.send(SessionCommand::Disconnect).is_ok());

        tracing::info!(client_id, sent, "forced disconnect");
        sent
    }

    /// Notify every client, close every session and the listener.
    ///
    /// Sessions get [`ServerConfig::shutdown_grace`] to flush
    /// `SERVER_SHUTDOWN` and close; the rest are aborted. Returns once the
    /// server is [`ServerState::Stopped`]. Calling it again, from any task,
    /// just waits for that.
    pub async fn stop(&self) {
        self.inner.stop_tx.send_replace(true);

        let task = self.inner.accept_task.lock().unwrap_or_else(PoisonError::into_inner).take();
        match task {
            Some(task) => {
                if let Err(e) = task.await {
                    tracing::error!(error = %e, "accept loop failed");
                    self.inner.shared.set_state(ServerState::Stopped);
                }
            },
            None => {
                let mut state = self.inner.shared.lifecycle.subscribe();
                // Err only if the sender is gone, which cannot outlive `self`
                let _ = state.wait_for(|s| *s == ServerState::Stopped).await;
            },
        }
    }
}

async fn accept_loop(listener: TcpListener, shared: Arc<Shared>, mut stop_rx: watch::Receiver<bool>) {
    let mut sessions = JoinSet::new();

    loop {
        tokio::select! {
            biased;
            // Err means every handle was dropped
            _ = stop_rx.changed() => break,
            Some(joined) = sessions.join_next(), if !sessions.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!(error = %e, "session task failed");
                }
            },
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tracing::debug!(%peer, "connection accepted");
                    let shared = Arc::clone(&shared);
                    sessions.spawn(async move {
                        if let Err(e) = session::run(stream, peer, shared).await {
                            tracing::warn!(%peer, error = %e, "session ended with error");
                        }
                    });
                },
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                },
            },
        }
    }

    drop(listener);
    shutdown_sessions(&shared, sessions).await;
    shared.set_state(ServerState::Stopped);
}

async fn shutdown_sessions(shared: &Shared, mut sessions: JoinSet<()>) {
    let notified = {
        let mut state = shared.lock();
        state.closing = true;
        state.outbound.values().filter(|tx| tx.send(SessionCommand::Shutdown).is_ok()).count()
    };
    tracing::info!(sessions = notified, "shutting down");

    let drained = time::timeout(shared.config.shutdown_grace, async {
        while sessions.join_next().await.is_some() {}
    })
    .await;

    if drained.is_err() {
        tracing::warn!(remaining = sessions.len(), "aborting sessions after shutdown grace");
        sessions.shutdown().await;
    }

    let leftover = {
        let mut state = shared.lock();
        state.outbound.clear();
        state.registry.clear_sessions()
    };
    for client_id in leftover {
        shared.emit(ServerEvent::ClientDisconnected { client_id });
    }
}
