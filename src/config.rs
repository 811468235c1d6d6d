//! Client configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Outside a browser the environment
//! stands in for the hosting page, so the result is turned into a
//! [`HostPage`] with [`ClientConfig::host_page`].

use std::str::FromStr;

use crate::domain::{HostPage, StepElement};
use crate::error::ClientError;

/// Where status updates are written (`SINK`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkKind {
    /// One line per message on stdout.
    #[default]
    Stdout,
    /// An `info` event per message through `tracing`.
    Log,
}

impl FromStr for SinkKind {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "log" => Ok(Self::Log),
            _ => Err(ClientError::InvalidConfig {
                key: "SINK",
                value: s.to_string(),
            }),
        }
    }
}

/// Log output format (`LOG_FORMAT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ClientError::InvalidConfig {
                key: "LOG_FORMAT",
                value: s.to_string(),
            }),
        }
    }
}

/// Top-level client configuration.
///
/// Loaded once at startup via [`ClientConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Realtime socket endpoint (e.g. `ws://master:9000/ws`). Not validated.
    pub realtime_server: String,

    /// Location of the page being watched (e.g. `/builders/linux/builds/7`).
    pub page_location: String,

    /// Prefix the JSON API is mounted under.
    pub json_api_prefix: String,

    /// Ordered step names shown on the page.
    pub steps: Vec<StepElement>,

    /// Status update destination.
    pub sink: SinkKind,

    /// Log output format.
    pub log_format: LogFormat,
}

impl ClientConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingConfig`] if `REALTIME_SERVER` is unset,
    /// [`ClientError::InvalidStepList`] if `STEP_LIST` is not a JSON array
    /// of strings, or [`ClientError::InvalidConfig`] for an unknown `SINK`
    /// or `LOG_FORMAT`.
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let realtime_server =
            lookup("REALTIME_SERVER").ok_or(ClientError::MissingConfig("REALTIME_SERVER"))?;
        let page_location = lookup("PAGE_LOCATION").unwrap_or_else(|| "/".to_string());
        let json_api_prefix = lookup("JSON_API_PREFIX").unwrap_or_else(|| "/json".to_string());
        let steps = match lookup("STEP_LIST") {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };
        let sink = lookup("SINK").map_or(Ok(SinkKind::default()), |v| v.parse())?;
        let log_format = lookup("LOG_FORMAT").map_or(Ok(LogFormat::default()), |v| v.parse())?;

        Ok(Self {
            realtime_server,
            page_location,
            json_api_prefix,
            steps,
            sink,
            log_format,
        })
    }

    /// Builds the page context this configuration describes.
    #[must_use]
    pub fn host_page(&self) -> HostPage {
        HostPage::new(self.page_location.clone())
            .with_realtime_server(self.realtime_server.clone())
            .with_steps(self.steps.iter().cloned())
    }
}
