//! Connection lifecycle: capability detection, opening, and close handling.
//!
//! [`ConnectionManager`] is the sole owner and writer of the session's
//! [`Connection`]. It creates it on [`ConnectionManager::init`] and clears it
//! when the close event arrives. Other components only read it through
//! [`ConnectionManager::connection`].

use crate::domain::{CloseInfo, ConnectionState, HostPage, LifecycleEvent};
use crate::presentation::{FALLBACK_URL, Navigator};
use crate::ws::{Connection, EventStream, Transport, TransportEvent};

/// Result of [`ConnectionManager::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// The transport was created; the handshake is in flight.
    Connecting,
    /// The environment is unsupported; the navigator was sent to
    /// [`FALLBACK_URL`].
    Redirected,
    /// `init` already ran for this session. Nothing happened.
    AlreadyInitialized,
}

/// Owns the single connection of a session and drives its state machine.
#[derive(Debug)]
pub struct ConnectionManager {
    state: ConnectionState,
    connection: Option<Connection>,
    events: Option<EventStream>,
    last_close: Option<CloseInfo>,
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionManager {
    /// Creates a manager in the `Uninitialized` state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ConnectionState::Uninitialized,
            connection: None,
            events: None,
            last_close: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// The live connection, if any. `None` before init, after a redirect,
    /// and after close.
    #[must_use]
    pub const fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    /// Close details of the connection, once it has closed.
    #[must_use]
    pub const fn last_close(&self) -> Option<&CloseInfo> {
        self.last_close.as_ref()
    }

    /// Detects socket support and either opens the connection or navigates
    /// to the fallback page.
    ///
    /// The endpoint comes from the page's `data-realTimeServer` attribute,
    /// unvalidated. A missing attribute is passed on as an empty endpoint and
    /// surfaces as a transport close.
    ///
    /// Idempotent: any call after the first logs a warning and returns
    /// [`InitOutcome::AlreadyInitialized`] without touching the connection.
    pub fn init<T, N>(&mut self, page: &HostPage, transport: &T, navigator: &mut N) -> InitOutcome
    where
        T: Transport + ?Sized,
        N: Navigator + ?Sized,
    {
        if self.state != ConnectionState::Uninitialized {
            tracing::warn!(state = %self.state, "init called more than once; ignoring");
            return InitOutcome::AlreadyInitialized;
        }

        let capability = transport.capability();
        if !capability.is_supported() {
            tracing::warn!(fallback = FALLBACK_URL, "environment does not support WebSocket");
            self.apply(LifecycleEvent::Unsupported);
            navigator.navigate(FALLBACK_URL);
            return InitOutcome::Redirected;
        }

        let endpoint = page.realtime_server().unwrap_or_default();
        tracing::debug!(endpoint, ?capability, "opening realtime socket");
        let (connection, events) = transport.open(endpoint);
        self.connection = Some(connection);
        self.events = Some(events);
        self.apply(LifecycleEvent::Started);
        InitOutcome::Connecting
    }

    /// Waits for the next transport event.
    ///
    /// Returns `None` when there is no connection, or when the transport
    /// went away without reporting a close.
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        match self.events.as_mut() {
            Some(events) => events.next().await,
            None => None,
        }
    }

    /// Handles the platform open event.
    ///
    /// Returns `true` only for the `Connecting → Open` transition; a repeated
    /// or late open is ignored and returns `false`.
    pub fn handle_open(&mut self) -> bool {
        if !self.apply(LifecycleEvent::Opened) {
            return false;
        }
        if let Some(conn) = &self.connection {
            tracing::info!(
                endpoint = conn.endpoint(),
                connection_id = %conn.id(),
                "connected to {}",
                conn.endpoint()
            );
        }
        true
    }

    /// Handles the platform close event: clears the connection and logs
    /// the close details.
    ///
    /// Returns `false` if the session was not connecting or open.
    pub fn handle_close(&mut self, info: CloseInfo) -> bool {
        if !self.apply(LifecycleEvent::Closed) {
            return false;
        }
        let connection = self.connection.take();
        self.events = None;

        let connection_id = connection.as_ref().map(|c| c.id().to_string());
        let lifetime_ms = connection
            .as_ref()
            .map(|c| (chrono::Utc::now() - c.created_at()).num_milliseconds());
        if info.was_clean {
            tracing::info!(
                code = info.code,
                was_clean = info.was_clean,
                reason = %info.reason,
                connection_id = connection_id.as_deref(),
                lifetime_ms,
                "connection closed ({info})"
            );
        } else {
            tracing::warn!(
                code = info.code,
                was_clean = info.was_clean,
                reason = %info.reason,
                connection_id = connection_id.as_deref(),
                lifetime_ms,
                "connection closed ({info})"
            );
        }
        self.last_close = Some(info);
        true
    }

    fn apply(&mut self, event: LifecycleEvent) -> bool {
        match self.state.transition(event) {
            Ok(next) => {
                self.state = next;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "ignoring lifecycle event");
                false
            }
        }
    }
}
