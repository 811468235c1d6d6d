//! Close event details reported by the transport.
//!
//! [`CloseInfo`] carries the three values a close diagnostic needs: the
//! numeric close code, whether the closing handshake completed cleanly,
//! and the reason text supplied by the peer (possibly empty).

use std::fmt;

/// Normal closure (RFC 6455 §7.4.1).
pub const CLOSE_NORMAL: u16 = 1000;

/// No status code was present in the close frame.
pub const CLOSE_NO_STATUS: u16 = 1005;

/// The connection dropped without a closing handshake.
pub const CLOSE_ABNORMAL: u16 = 1006;

/// Details of a transport close event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    /// Close code as sent by the peer, or [`CLOSE_ABNORMAL`] when the
    /// connection was lost.
    pub code: u16,
    /// `true` if the closing handshake completed.
    pub was_clean: bool,
    /// Reason text from the close frame; empty when none was given.
    pub reason: String,
}

impl CloseInfo {
    /// Close event for a connection that went away without a handshake.
    #[must_use]
    pub fn abnormal(reason: impl Into<String>) -> Self {
        Self {
            code: CLOSE_ABNORMAL,
            was_clean: false,
            reason: reason.into(),
        }
    }

    /// Close event for a completed closing handshake.
    #[must_use]
    pub fn clean(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            was_clean: true,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CloseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wasClean = {}, code = {}, reason = '{}'",
            self.was_clean, self.code, self.reason
        )
    }
}
