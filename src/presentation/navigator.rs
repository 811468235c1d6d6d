//! User-agent navigation, used only for the unsupported-environment
//! fallback.

/// Fixed page shown when the environment cannot open a realtime socket.
pub const FALLBACK_URL: &str = "http://autobahn.ws/unsupportedbrowser";

/// Sends the user agent to another location.
pub trait Navigator: Send {
    /// Navigates to `url`.
    fn navigate(&mut self, url: &str);
}

impl<F> Navigator for F
where
    F: FnMut(&str) + Send,
{
    fn navigate(&mut self, url: &str) {
        self(url);
    }
}

/// Navigator for hosts without a user agent: records the target and
/// logs it.
#[derive(Debug, Clone, Default)]
pub struct LogNavigator {
    visited: Option<String>,
}

impl LogNavigator {
    /// Creates a navigator that has not navigated yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { visited: None }
    }

    /// Last navigation target, if any.
    #[must_use]
    pub fn visited(&self) -> Option<&str> {
        self.visited.as_deref()
    }
}

impl Navigator for LogNavigator {
    fn navigate(&mut self, url: &str) {
        tracing::warn!(url, "navigating to fallback page");
        self.visited = Some(url.to_owned());
    }
}
