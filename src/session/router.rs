//! Outbound subscription and inbound dispatch.
//!
//! [`MessageRouter`] never owns the connection. It is handed the manager's
//! `Option<&Connection>` and only checks for presence before sending.

use std::sync::Arc;

use crate::domain::{HostPage, StepElement};
use crate::error::ClientError;
use crate::presentation::{PresentationSink, UrlBuilder};
use crate::ws::{Connection, ConnectionId};

/// Whether a payload went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum SendOutcome {
    /// Handed to the transport.
    Sent,
    /// No connection (or the transport is gone); the payload was discarded.
    Dropped,
}

impl SendOutcome {
    /// Returns `true` for [`SendOutcome::Sent`].
    #[must_use]
    pub const fn is_sent(self) -> bool {
        matches!(self, Self::Sent)
    }

    /// Converts a drop into an error.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SendWithNoConnection`] for
    /// [`SendOutcome::Dropped`].
    pub fn into_result(self) -> Result<(), ClientError> {
        match self {
            Self::Sent => Ok(()),
            Self::Dropped => Err(ClientError::SendWithNoConnection),
        }
    }
}

/// Transmits `payload` if a connection exists.
///
/// A missing connection is not an error: the payload is dropped and
/// nothing is logged.
pub fn send(connection: Option<&Connection>, payload: &str) -> SendOutcome {
    match connection {
        Some(conn) if conn.transmit(payload) => SendOutcome::Sent,
        _ => SendOutcome::Dropped,
    }
}

/// Sends the subscription on open and forwards every inbound frame to the
/// presentation sink, in arrival order.
#[derive(Debug)]
pub struct MessageRouter<S, U> {
    sink: S,
    url_builder: U,
    steps: Arc<[StepElement]>,
    subscribed: Option<ConnectionId>,
    forwarded: u64,
}

impl<S, U> MessageRouter<S, U>
where
    S: PresentationSink,
    U: UrlBuilder,
{
    /// Creates a router with an empty step list.
    pub fn new(sink: S, url_builder: U) -> Self {
        Self {
            sink,
            url_builder,
            steps: Arc::from(Vec::new()),
            subscribed: None,
            forwarded: 0,
        }
    }

    /// Sets the step list passed to the sink with every message.
    pub fn bind_steps(&mut self, steps: Arc<[StepElement]>) {
        self.steps = steps;
    }

    /// Sends the subscription request for `page`.
    ///
    /// At most one request goes out per connection; a repeat for the same
    /// connection returns [`SendOutcome::Dropped`] without sending.
    pub fn on_open(&mut self, connection: Option<&Connection>, page: &HostPage) -> SendOutcome {
        let Some(conn) = connection else {
            return SendOutcome::Dropped;
        };
        if self.subscribed == Some(conn.id()) {
            return SendOutcome::Dropped;
        }
        let url = self.url_builder.json_url(page);
        tracing::debug!(connection_id = %conn.id(), url = %url, "subscribing");
        self.subscribed = Some(conn.id());
        send(Some(conn), &url)
    }

    /// Forwards one inbound frame to the sink, unmodified.
    pub fn on_message(&mut self, payload: &str) {
        self.forwarded += 1;
        tracing::debug!(seq = self.forwarded, bytes = payload.len(), "message received");
        self.sink.build_detail(payload, &self.steps);
    }

    /// Number of frames forwarded so far.
    #[must_use]
    pub const fn forwarded(&self) -> u64 {
        self.forwarded
    }
}
