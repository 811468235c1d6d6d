//! Collaborators outside the connection core: the presentation sink, the
//! subscription URL builder, and user-agent navigation.
//!
//! Each is a trait with a blanket impl for closures, plus stock
//! implementations for running outside a browser.

pub mod navigator;
pub mod sink;
pub mod url_builder;

pub use navigator::{FALLBACK_URL, LogNavigator, Navigator};
pub use sink::{ChannelSink, PresentationSink, StatusUpdate, TracingSink, WriterSink};
pub use url_builder::{JsonUrlBuilder, UrlBuilder};
