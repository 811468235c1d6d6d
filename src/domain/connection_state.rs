//! Connection lifecycle state machine.
//!
//! ```text
//! Uninitialized ──unsupported──▶ Redirected
//!       │
//!       └──init──▶ Connecting ──open──▶ Open
//!                       │                 │
//!                       └─────close───────┴──▶ Closed
//! ```
//!
//! `Redirected` and `Closed` are terminal. There is no edge back to
//! `Connecting`: closing ends the session.

use std::fmt;

/// Lifecycle state of the session's single connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// `init` has not run yet.
    Uninitialized,
    /// The environment lacks socket support; the user agent was sent to the
    /// fallback page.
    Redirected,
    /// The transport was created and the handshake is in flight.
    Connecting,
    /// The open event fired.
    Open,
    /// The close event fired; the connection handle is gone.
    Closed,
}

/// Inputs that drive [`ConnectionState`] transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Capability detection failed.
    Unsupported,
    /// Transport constructed against the endpoint.
    Started,
    /// Platform open callback.
    Opened,
    /// Platform close callback.
    Closed,
}

/// Returned when an event does not apply to the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid transition from {from} on {event:?}")]
pub struct InvalidTransition {
    /// State the machine was in.
    pub from: ConnectionState,
    /// Event that was rejected.
    pub event: LifecycleEvent,
}

impl ConnectionState {
    /// Returns `true` for states that no event can leave.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Redirected | Self::Closed)
    }

    /// Computes the next state for `event`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] when `event` has no edge out of the
    /// current state, e.g. a second open or anything after `Closed`.
    pub const fn transition(self, event: LifecycleEvent) -> Result<Self, InvalidTransition> {
        match (self, event) {
            (Self::Uninitialized, LifecycleEvent::Unsupported) => Ok(Self::Redirected),
            (Self::Uninitialized, LifecycleEvent::Started) => Ok(Self::Connecting),
            (Self::Connecting, LifecycleEvent::Opened) => Ok(Self::Open),
            (Self::Connecting | Self::Open, LifecycleEvent::Closed) => Ok(Self::Closed),
            (from, event) => Err(InvalidTransition { from, event }),
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Redirected => "redirected",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}
