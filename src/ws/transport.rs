//! Transport abstraction for the realtime socket.
//!
//! A [`Transport`] reports whether the environment can open a socket at all
//! ([`Capability`]) and, if it can, opens one. Opening yields two halves:
//!
//! - [`Connection`]: the outbound handle owned by the session. Dropping it
//!   asks the transport to close.
//! - [`EventStream`]: the ordered stream of [`TransportEvent`]s (open, one
//!   message per frame, close).
//!
//! Implementations sit on the far side of a [`TransportLink`], obtained
//! from [`link`].

use std::fmt;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::domain::CloseInfo;

/// Whether, and how, the environment supports the realtime socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// The standard socket implementation is available.
    Primary,
    /// Only a vendor-prefixed implementation is available.
    VendorPrefixed,
    /// No socket implementation is available.
    Unsupported,
}

impl Capability {
    /// Returns `true` if a connection can be opened.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// Events delivered by the transport, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The handshake completed.
    Open,
    /// One inbound text frame, verbatim.
    Message(String),
    /// The connection closed. Always the last event.
    Close(CloseInfo),
}

/// Unique identifier for one connection lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    /// Creates a new random `ConnectionId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outbound handle for a single connection.
///
/// Not `Clone`: exactly one owner holds it, and dropping it releases the
/// connection.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    endpoint: String,
    created_at: DateTime<Utc>,
    outbound: mpsc::UnboundedSender<String>,
}

impl Connection {
    /// Identifier of this connection.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Endpoint the connection was opened against.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// When the transport was constructed.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Queues `payload` for transmission.
    ///
    /// Returns `false` if the transport side has already gone away.
    pub fn transmit(&self, payload: &str) -> bool {
        self.outbound.send(payload.to_owned()).is_ok()
    }
}

/// Ordered stream of [`TransportEvent`]s for one connection.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::UnboundedReceiver<TransportEvent>,
}

impl EventStream {
    /// Waits for the next event. Returns `None` once the transport side is
    /// dropped without sending anything further.
    pub async fn next(&mut self) -> Option<TransportEvent> {
        self.rx.recv().await
    }
}

/// Transport-side end of a connection: outbound payloads in, events out.
#[derive(Debug)]
pub struct TransportLink {
    /// Payloads queued through [`Connection::transmit`].
    pub outbound: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<TransportEvent>,
}

impl TransportLink {
    /// Delivers an event to the session.
    ///
    /// Returns `false` if the session is no longer listening.
    pub fn emit(&self, event: TransportEvent) -> bool {
        self.events.send(event).is_ok()
    }
}

/// Creates a connected [`Connection`] / [`EventStream`] / [`TransportLink`]
/// triple for `endpoint`.
///
/// Channels are unbounded so the transport never blocks on, or drops, an
/// inbound frame.
#[must_use]
pub fn link(endpoint: &str) -> (Connection, EventStream, TransportLink) {
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let connection = Connection {
        id: ConnectionId::new(),
        endpoint: endpoint.to_owned(),
        created_at: Utc::now(),
        outbound: outbound_tx,
    };
    (
        connection,
        EventStream { rx: event_rx },
        TransportLink {
            outbound: outbound_rx,
            events: event_tx,
        },
    )
}

/// A realtime socket implementation.
pub trait Transport: Send {
    /// Detects socket support in the current environment.
    fn capability(&self) -> Capability;

    /// Starts connecting to `endpoint`.
    ///
    /// Never fails synchronously: connection errors arrive as a
    /// [`TransportEvent::Close`] on the returned stream.
    fn open(&self, endpoint: &str) -> (Connection, EventStream);
}
