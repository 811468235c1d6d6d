//! Presentation sinks: where inbound frames end up.
//!
//! The router hands every frame, verbatim, to a [`PresentationSink`]
//! together with the page's step list. What the sink makes of it (DOM
//! updates, terminal output, a channel for another task) is its own
//! business.

use std::io::Write;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::domain::StepElement;

/// Turns a status message into visible changes to a list of steps.
pub trait PresentationSink: Send {
    /// Applies one inbound message to `steps`.
    fn build_detail(&mut self, message: &str, steps: &[StepElement]);
}

impl<F> PresentationSink for F
where
    F: FnMut(&str, &[StepElement]) + Send,
{
    fn build_detail(&mut self, message: &str, steps: &[StepElement]) {
        self(message, steps);
    }
}

/// One forwarded message as seen by a [`ChannelSink`] consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Frame payload, unmodified.
    pub message: String,
    /// Step list the message applies to.
    pub steps: Arc<[StepElement]>,
}

/// Forwards each message to an unbounded channel.
///
/// Messages are silently discarded once the receiver is dropped.
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<StatusUpdate>,
}

impl ChannelSink {
    /// Creates the sink and the receiver that observes it.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<StatusUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl PresentationSink for ChannelSink {
    fn build_detail(&mut self, message: &str, steps: &[StepElement]) {
        let update = StatusUpdate {
            message: message.to_owned(),
            steps: steps.into(),
        };
        // Receiver gone means nobody renders anymore.
        let _ = self.tx.send(update);
    }
}

/// Emits each message as an `info` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl PresentationSink for TracingSink {
    fn build_detail(&mut self, message: &str, steps: &[StepElement]) {
        tracing::info!(steps = steps.len(), payload = message, "status update");
    }
}

/// Writes each message on its own line.
///
/// Writes and flushes synchronously on the session task. With a blocking
/// writer such as `std::io::stdout()` a slow consumer stalls event
/// processing; use [`ChannelSink`] to hand output to another task instead.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write + Send> WriterSink<W> {
    /// Wraps `writer`.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> PresentationSink for WriterSink<W> {
    fn build_detail(&mut self, message: &str, _steps: &[StepElement]) {
        let result = writeln!(self.writer, "{message}").and_then(|()| self.writer.flush());
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to write status update");
        }
    }
}
