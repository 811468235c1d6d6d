//! The hosting page context.
//!
//! [`HostPage`] is everything the client reads from the page it runs in:
//! the current location, the attributes on the root element (one of which
//! names the realtime endpoint), and the ordered list of step elements the
//! presentation sink updates.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Root-element attribute holding the realtime socket endpoint.
pub const REALTIME_SERVER_ATTR: &str = "data-realTimeServer";

/// One entry of the page's step list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepElement(String);

impl StepElement {
    /// Creates a step element with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the step name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StepElement {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Snapshot of the page hosting the client.
#[derive(Debug, Clone)]
pub struct HostPage {
    location: String,
    root_attributes: HashMap<String, String>,
    steps: Arc<[StepElement]>,
}

impl HostPage {
    /// Creates a page at `location` with no attributes and no steps.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            root_attributes: HashMap::new(),
            steps: Arc::from(Vec::new()),
        }
    }

    /// Sets an attribute on the root element.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.root_attributes.insert(name.into(), value.into());
        self
    }

    /// Sets the `data-realTimeServer` attribute.
    #[must_use]
    pub fn with_realtime_server(self, endpoint: impl Into<String>) -> Self {
        self.with_attribute(REALTIME_SERVER_ATTR, endpoint)
    }

    /// Replaces the step list.
    #[must_use]
    pub fn with_steps(mut self, steps: impl IntoIterator<Item = StepElement>) -> Self {
        self.steps = steps.into_iter().collect();
        self
    }

    /// Current page location (path or full URL).
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Looks up a root-element attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.root_attributes.get(name).map(String::as_str)
    }

    /// The realtime endpoint, verbatim. No format validation happens here.
    #[must_use]
    pub fn realtime_server(&self) -> Option<&str> {
        self.attribute(REALTIME_SERVER_ATTR)
    }

    /// Shared handle to the ordered step list.
    #[must_use]
    pub fn steps(&self) -> Arc<[StepElement]> {
        Arc::clone(&self.steps)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn realtime_server_reads_root_attribute() {
        let page = HostPage::new("/builders/linux/builds/7").with_realtime_server("wss://host/ws");
        assert_eq!(page.realtime_server(), Some("wss://host/ws"));
        assert_eq!(page.attribute(REALTIME_SERVER_ATTR), Some("wss://host/ws"));
    }

    #[test]
    fn missing_endpoint_is_none() {
        let page = HostPage::new("/");
        assert_eq!(page.realtime_server(), None);
    }

    #[test]
    fn endpoint_is_not_validated() {
        let page = HostPage::new("/").with_realtime_server("not a url");
        assert_eq!(page.realtime_server(), Some("not a url"));
    }

    #[test]
    fn steps_keep_order() {
        let steps = ["checkout", "compile", "test"].map(StepElement::from);
        let page = HostPage::new("/").with_steps(steps);
        let steps = page.steps();
        let names: Vec<&str> = steps.iter().map(StepElement::name).collect();
        assert_eq!(names, vec!["checkout", "compile", "test"]);
    }

    #[test]
    fn step_element_serializes_as_string() {
        let json = serde_json::to_string(&StepElement::new("compile")).ok();
        assert_eq!(json.as_deref(), Some("\"compile\""));
    }
}
