//! `tokio-tungstenite` backed transport.
//!
//! Each [`Transport::open`] spawns one task that performs the handshake
//! and then runs the read/write loop, translating socket traffic into
//! [`TransportEvent`]s. Must be called from within a Tokio runtime.

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;

use super::transport::{
    self, Capability, Connection, EventStream, Transport, TransportEvent, TransportLink,
};
use crate::domain::CloseInfo;
use crate::domain::close_info::CLOSE_NO_STATUS;

/// Native WebSocket transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteTransport;

impl TungsteniteTransport {
    /// Creates the transport.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Transport for TungsteniteTransport {
    fn capability(&self) -> Capability {
        Capability::Primary
    }

    fn open(&self, endpoint: &str) -> (Connection, EventStream) {
        let (connection, events, link) = transport::link(endpoint);
        tokio::spawn(run_socket(endpoint.to_owned(), link));
        (connection, events)
    }
}

/// Handshake, then the read/write loop for a single socket.
///
/// Emits `Open` once the handshake succeeds, one `Message` per data frame,
/// and exactly one `Close` at the end, whatever the cause.
async fn run_socket(endpoint: String, mut link: TransportLink) {
    let stream = match connect_async(endpoint.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(err) => {
            link.emit(TransportEvent::Close(CloseInfo::abnormal(err.to_string())));
            return;
        }
    };
    if !link.emit(TransportEvent::Open) {
        return;
    }

    let (mut ws_tx, mut ws_rx) = stream.split();

    let close = loop {
        tokio::select! {
            // Inbound frame from the server
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if !link.emit(TransportEvent::Message(text.as_str().to_owned())) {
                            break None;
                        }
                    }
                    Some(Ok(Message::Binary(bytes))) => {
                        let text = String::from_utf8_lossy(&bytes).into_owned();
                        if !link.emit(TransportEvent::Message(text)) {
                            break None;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => break Some(close_from_frame(frame)),
                    Some(Ok(_)) => {}
                    Some(Err(err)) => break Some(CloseInfo::abnormal(err.to_string())),
                    None => break Some(CloseInfo::abnormal("stream ended without close frame")),
                }
            }
            // Payload queued by the session
            outbound = link.outbound.recv() => {
                match outbound {
                    Some(payload) => {
                        if let Err(err) = ws_tx.send(Message::text(payload)).await {
                            break Some(CloseInfo::abnormal(err.to_string()));
                        }
                    }
                    // Connection handle dropped: nobody is listening anymore.
                    None => break None,
                }
            }
        }
    };

    // Completes the closing handshake, or starts one if we are the side
    // giving up.
    if let Err(err) = ws_tx.close().await {
        tracing::debug!(error = %err, "ws close handshake did not complete");
    }

    if let Some(info) = close {
        link.emit(TransportEvent::Close(info));
    }
}

fn close_from_frame(frame: Option<CloseFrame>) -> CloseInfo {
    match frame {
        Some(frame) => CloseInfo::clean(u16::from(frame.code), frame.reason.as_str()),
        None => CloseInfo::clean(CLOSE_NO_STATUS, ""),
    }
}
