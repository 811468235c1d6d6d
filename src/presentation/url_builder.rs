//! Builds the subscription payload for the current page.

use crate::domain::HostPage;

/// Produces the resource locator of the status feed to subscribe to.
pub trait UrlBuilder: Send {
    /// Returns the JSON resource URL for `page`.
    fn json_url(&self, page: &HostPage) -> String;
}

impl<F> UrlBuilder for F
where
    F: Fn(&HostPage) -> String + Send,
{
    fn json_url(&self, page: &HostPage) -> String {
        self(page)
    }
}

/// Maps the page location onto the JSON API: `/builders/x` becomes
/// `<prefix>/builders/x`.
#[derive(Debug, Clone)]
pub struct JsonUrlBuilder {
    prefix: String,
}

impl JsonUrlBuilder {
    /// Creates a builder that mounts page paths under `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for JsonUrlBuilder {
    fn default() -> Self {
        Self::new("/json")
    }
}

impl UrlBuilder for JsonUrlBuilder {
    fn json_url(&self, page: &HostPage) -> String {
        let prefix = self.prefix.trim_end_matches('/');
        let path = page.location().trim_start_matches('/');
        format!("{prefix}/{path}")
    }
}
