//! WebSocket layer: transport abstraction and the native implementation.
//!
//! The session talks only to [`Transport`]; [`TungsteniteTransport`] is the
//! implementation used outside tests.

pub mod transport;
pub mod tungstenite;

pub use transport::{
    Capability, Connection, ConnectionId, EventStream, Transport, TransportEvent, TransportLink,
};
pub use tungstenite::TungsteniteTransport;
