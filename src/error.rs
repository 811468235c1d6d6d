//! Client error types.
//!
//! The connection core never returns errors while handling transport
//! events: failures are logged or turned into navigation, and the session
//! ends. [`ClientError`] exists for callers that want to treat a session
//! outcome or a dropped send as a failure with `?`, and for configuration
//! loading.

use crate::domain::CloseInfo;

/// Client-side error enum.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The environment cannot open a realtime socket; the user agent was
    /// sent to the fallback page.
    #[error("realtime socket unsupported; redirected to {fallback_url}")]
    UnsupportedEnvironment {
        /// Where the user agent was sent.
        fallback_url: String,
    },

    /// The connection closed.
    #[error("connection closed (wasClean = {was_clean}, code = {code}, reason = '{reason}')")]
    ConnectionClosed {
        /// Close code.
        code: u16,
        /// Whether the closing handshake completed.
        was_clean: bool,
        /// Close reason text.
        reason: String,
    },

    /// A payload was dropped because no connection exists.
    #[error("no connection; payload dropped")]
    SendWithNoConnection,

    /// A required configuration variable is not set.
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    /// A configuration variable has a value outside its allowed set.
    #[error("invalid value for {key}: '{value}'")]
    InvalidConfig {
        /// Variable name.
        key: &'static str,
        /// Rejected value.
        value: String,
    },

    /// `STEP_LIST` is not a JSON array of strings.
    #[error("invalid step list: {0}")]
    InvalidStepList(#[from] serde_json::Error),

    /// I/O failure outside the transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CloseInfo> for ClientError {
    fn from(info: CloseInfo) -> Self {
        Self::ConnectionClosed {
            code: info.code,
            was_clean: info.was_clean,
            reason: info.reason,
        }
    }
}
