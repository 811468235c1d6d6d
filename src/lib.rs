//! # live-build-status
//!
//! Realtime build status client. Opens one WebSocket to the status
//! server, subscribes to a single feed, and hands every inbound frame,
//! untouched and in order, to a presentation sink.
//!
//! ## Architecture
//!
//! ```text
//! HostPage (endpoint attribute, step list)
//!     │
//!     ├── Session (session/)
//!     │     ├── ConnectionManager  capability check, open, close
//!     │     └── MessageRouter      subscription send, frame dispatch
//!     │
//!     ├── Transport (ws/)          tokio-tungstenite
//!     │
//!     └── Collaborators (presentation/)
//!           PresentationSink, UrlBuilder, Navigator
//! ```
//!
//! A session is single-use: when the connection closes, it stays closed.

pub mod config;
pub mod domain;
pub mod error;
pub mod presentation;
pub mod session;
pub mod ws;
