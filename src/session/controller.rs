//! Session-scoped controller tying the lifecycle to dispatch.
//!
//! A [`Session`] is created once per page. It owns the page context, the
//! transport, the collaborators, the [`ConnectionManager`] and the
//! [`MessageRouter`], and processes transport events one at a time:
//!
//! ```text
//! init ─▶ Open ─▶ subscription sent ─▶ Message* ─▶ sink ─▶ Close ─▶ end
//! ```
//!
//! Events are awaited in sequence on a single task, so frames reach the
//! sink in exactly the order the transport delivered them.

use crate::domain::{CloseInfo, ConnectionState, HostPage};
use crate::error::ClientError;
use crate::presentation::{FALLBACK_URL, Navigator, PresentationSink, UrlBuilder};
use crate::ws::{Transport, TransportEvent};

use super::manager::{ConnectionManager, InitOutcome};
use super::router::{self, MessageRouter, SendOutcome};

/// How a session finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The environment was unsupported and the user agent was redirected.
    Redirected {
        /// Navigation target.
        url: String,
    },
    /// The connection closed.
    Closed(CloseInfo),
}

impl SessionEnd {
    /// Treats every ending except a clean close as a failure.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnsupportedEnvironment`] for a redirect and
    /// [`ClientError::ConnectionClosed`] for an unclean close.
    pub fn into_result(self) -> Result<CloseInfo, ClientError> {
        match self {
            Self::Redirected { url } => {
                Err(ClientError::UnsupportedEnvironment { fallback_url: url })
            }
            Self::Closed(info) if info.was_clean => Ok(info),
            Self::Closed(info) => Err(info.into()),
        }
    }
}

/// One realtime status session.
#[derive(Debug)]
pub struct Session<T, S, U, N> {
    page: HostPage,
    transport: T,
    navigator: N,
    manager: ConnectionManager,
    router: MessageRouter<S, U>,
}

impl<T, S, U, N> Session<T, S, U, N>
where
    T: Transport,
    S: PresentationSink,
    U: UrlBuilder,
    N: Navigator,
{
    /// Creates an uninitialized session.
    pub fn new(page: HostPage, transport: T, sink: S, url_builder: U, navigator: N) -> Self {
        Self {
            page,
            transport,
            navigator,
            manager: ConnectionManager::new(),
            router: MessageRouter::new(sink, url_builder),
        }
    }

    /// Detects socket support and opens the connection, or redirects.
    ///
    /// Captures the page's step list for the router. Calling it again is a
    /// no-op returning [`InitOutcome::AlreadyInitialized`].
    pub fn init(&mut self) -> InitOutcome {
        let outcome = self
            .manager
            .init(&self.page, &self.transport, &mut self.navigator);
        if outcome == InitOutcome::Connecting {
            self.router.bind_steps(self.page.steps());
        }
        outcome
    }

    /// Runs the session to completion, calling [`Session::init`] first if
    /// needed.
    ///
    /// Returns once the connection has closed or the user agent has been
    /// redirected. Never reconnects.
    pub async fn run(&mut self) -> SessionEnd {
        loop {
            if let Some(end) = self.process_next().await {
                return end;
            }
        }
    }

    /// Waits for and handles one transport event.
    ///
    /// Calls [`Session::init`] first if it has not run yet. Returns `Some`
    /// once the session has ended. If the transport goes away without
    /// reporting a close, that is handled as an abnormal close.
    pub async fn process_next(&mut self) -> Option<SessionEnd> {
        if self.manager.state() == ConnectionState::Uninitialized {
            self.init();
        }
        if let Some(end) = self.ended() {
            return Some(end);
        }
        let event = self
            .manager
            .next_event()
            .await
            .unwrap_or_else(|| TransportEvent::Close(CloseInfo::abnormal("transport went away")));
        self.dispatch(event);
        self.ended()
    }

    /// Sends `payload` over the connection if there is one.
    pub fn broadcast(&self, payload: &str) -> SendOutcome {
        router::send(self.manager.connection(), payload)
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.manager.state()
    }

    /// The page this session runs in.
    #[must_use]
    pub const fn page(&self) -> &HostPage {
        &self.page
    }

    /// The connection manager.
    #[must_use]
    pub const fn manager(&self) -> &ConnectionManager {
        &self.manager
    }

    /// The message router.
    #[must_use]
    pub const fn router(&self) -> &MessageRouter<S, U> {
        &self.router
    }

    /// The navigator.
    #[must_use]
    pub const fn navigator(&self) -> &N {
        &self.navigator
    }

    fn dispatch(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Open => {
                if self.manager.handle_open() {
                    // Sent after the Open transition, never before.
                    let outcome = self.router.on_open(self.manager.connection(), &self.page);
                    if outcome == SendOutcome::Dropped {
                        tracing::debug!("subscription dropped; transport already gone");
                    }
                }
            }
            TransportEvent::Message(payload) => self.router.on_message(&payload),
            TransportEvent::Close(info) => {
                self.manager.handle_close(info);
            }
        }
    }

    fn ended(&self) -> Option<SessionEnd> {
        match self.manager.state() {
            ConnectionState::Redirected => Some(SessionEnd::Redirected {
                url: FALLBACK_URL.to_string(),
            }),
            ConnectionState::Closed => self.manager.last_close().cloned().map(SessionEnd::Closed),
            ConnectionState::Uninitialized
            | ConnectionState::Connecting
            | ConnectionState::Open => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::sync::mpsc;

    use super::*;
    use crate::domain::StepElement;
    use crate::presentation::{ChannelSink, JsonUrlBuilder, LogNavigator, StatusUpdate};
    use crate::ws::transport::{self, Capability, TransportLink};
    use crate::ws::{Connection, EventStream};

    /// Transport whose socket side is driven by the test.
    #[derive(Clone)]
    struct ScriptedTransport {
        capability: Capability,
        links: Arc<Mutex<Vec<TransportLink>>>,
    }

    impl ScriptedTransport {
        fn new(capability: Capability) -> Self {
            Self {
                capability,
                links: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn opened(&self) -> usize {
            self.links.lock().map(|l| l.len()).unwrap_or_default()
        }

        fn take_link(&self) -> TransportLink {
            let link = self.links.lock().ok().and_then(|mut l| l.pop());
            let Some(link) = link else {
                panic!("transport was never opened");
            };
            link
        }
    }

    impl Transport for ScriptedTransport {
        fn capability(&self) -> Capability {
            self.capability
        }

        fn open(&self, endpoint: &str) -> (Connection, EventStream) {
            let (conn, events, link) = transport::link(endpoint);
            if let Ok(mut links) = self.links.lock() {
                links.push(link);
            }
            (conn, events)
        }
    }

    type TestSession = Session<ScriptedTransport, ChannelSink, JsonUrlBuilder, LogNavigator>;

    fn session(
        capability: Capability,
    ) -> (TestSession, ScriptedTransport, mpsc::UnboundedReceiver<StatusUpdate>) {
        let transport = ScriptedTransport::new(capability);
        let (sink, rx) = ChannelSink::new();
        let page = HostPage::new("/builders/linux/builds/7")
            .with_realtime_server("wss://host/ws")
            .with_steps(["compile", "test"].map(StepElement::from));
        let session = Session::new(
            page,
            transport.clone(),
            sink,
            JsonUrlBuilder::default(),
            LogNavigator::new(),
        );
        (session, transport, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<StatusUpdate>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(update) = rx.try_recv() {
            out.push(update.message);
        }
        out
    }

    #[tokio::test]
    async fn unsupported_redirects_without_connection() {
        let (mut session, transport, mut rx) = session(Capability::Unsupported);

        let end = session.run().await;

        assert_eq!(
            end,
            SessionEnd::Redirected {
                url: FALLBACK_URL.to_string()
            }
        );
        assert_eq!(session.navigator().visited(), Some(FALLBACK_URL));
        assert_eq!(transport.opened(), 0);
        assert!(session.manager().connection().is_none());
        assert!(drain(&mut rx).is_empty());
        assert!(!session.broadcast("anything").is_sent());
    }

    #[tokio::test]
    async fn subscription_follows_open() {
        let (mut session, transport, _rx) = session(Capability::Primary);
        assert_eq!(session.init(), InitOutcome::Connecting);
        let mut link = transport.take_link();

        // Nothing goes out while connecting.
        assert!(link.outbound.try_recv().is_err());

        assert!(link.emit(TransportEvent::Open));
        assert_eq!(session.process_next().await, None);
        assert_eq!(session.state(), ConnectionState::Open);

        assert_eq!(
            link.outbound.try_recv().ok().as_deref(),
            Some("/json/builders/linux/builds/7")
        );
        assert!(link.outbound.try_recv().is_err());
    }

    #[tokio::test]
    async fn duplicate_open_sends_one_subscription() {
        let (mut session, transport, _rx) = session(Capability::Primary);
        session.init();
        let mut link = transport.take_link();

        link.emit(TransportEvent::Open);
        link.emit(TransportEvent::Open);
        session.process_next().await;
        session.process_next().await;

        assert!(link.outbound.try_recv().is_ok());
        assert!(link.outbound.try_recv().is_err());
    }

    #[tokio::test]
    async fn frames_reach_sink_in_order_with_steps() {
        let (mut session, transport, mut rx) = session(Capability::Primary);
        session.init();
        let link = transport.take_link();

        link.emit(TransportEvent::Open);
        for frame in ["a", "b", "c"] {
            link.emit(TransportEvent::Message(frame.to_string()));
        }
        link.emit(TransportEvent::Close(CloseInfo::clean(1000, "done")));

        let end = session.run().await;
        assert_eq!(end, SessionEnd::Closed(CloseInfo::clean(1000, "done")));

        let Ok(first) = rx.try_recv() else {
            panic!("sink received nothing");
        };
        assert_eq!(first.message, "a");
        assert_eq!(first.steps.len(), 2);
        assert_eq!(drain(&mut rx), vec!["b", "c"]);
        assert_eq!(session.router().forwarded(), 3);
    }

    #[tokio::test]
    async fn abnormal_close_clears_connection() {
        let (mut session, transport, _rx) = session(Capability::Primary);
        session.init();
        let link = transport.take_link();

        link.emit(TransportEvent::Open);
        link.emit(TransportEvent::Close(CloseInfo::abnormal("")));

        let end = session.run().await;
        let SessionEnd::Closed(info) = &end else {
            panic!("expected close, got {end:?}");
        };
        assert_eq!(info.code, 1006);
        assert!(!info.was_clean);
        assert!(session.manager().connection().is_none());
        assert_eq!(session.broadcast("late"), SendOutcome::Dropped);
        assert!(end.into_result().is_err());
    }

    #[tokio::test]
    async fn transport_vanishing_counts_as_abnormal_close() {
        let (mut session, transport, _rx) = session(Capability::Primary);
        session.init();
        let link = transport.take_link();
        link.emit(TransportEvent::Open);
        drop(link);

        let end = session.run().await;
        let SessionEnd::Closed(info) = end else {
            panic!("expected close");
        };
        assert!(!info.was_clean);
    }

    #[tokio::test]
    async fn broadcast_while_open_is_sent() {
        let (mut session, transport, _rx) = session(Capability::Primary);
        session.init();
        let mut link = transport.take_link();
        link.emit(TransportEvent::Open);
        session.process_next().await;
        let _subscription = link.outbound.try_recv();

        assert_eq!(session.broadcast("ping"), SendOutcome::Sent);
        assert_eq!(link.outbound.try_recv().ok().as_deref(), Some("ping"));
    }

    #[tokio::test]
    async fn second_init_keeps_existing_connection() {
        let (mut session, transport, _rx) = session(Capability::Primary);
        assert_eq!(session.init(), InitOutcome::Connecting);
        assert_eq!(session.init(), InitOutcome::AlreadyInitialized);
        assert_eq!(transport.opened(), 1);
    }

    #[tokio::test]
    async fn process_next_initializes_a_fresh_session() {
        let (mut session, transport, _rx) = session(Capability::Unsupported);

        let end = session.process_next().await;

        assert_eq!(
            end,
            Some(SessionEnd::Redirected {
                url: FALLBACK_URL.to_string()
            })
        );
        assert_eq!(transport.opened(), 0);
    }

    #[tokio::test]
    async fn process_next_alone_drives_session_to_close() {
        let (mut session, transport, mut rx) = session(Capability::Primary);

        // The first call opens the connection, then waits for an event.
        let (end, _link) = tokio::join!(session.process_next(), async {
            loop {
                if transport.opened() == 1 {
                    let link = transport.take_link();
                    link.emit(TransportEvent::Open);
                    link.emit(TransportEvent::Message("a".to_string()));
                    link.emit(TransportEvent::Close(CloseInfo::abnormal("")));
                    break link;
                }
                tokio::task::yield_now().await;
            }
        });
        assert_eq!(end, None);
        assert_eq!(session.state(), ConnectionState::Open);

        let mut end = None;
        for _ in 0..2 {
            end = session.process_next().await;
        }
        assert_eq!(end, Some(SessionEnd::Closed(CloseInfo::abnormal(""))));
        // The only link was taken above; no second connection was opened.
        assert_eq!(transport.opened(), 0);
        assert_eq!(drain(&mut rx), vec!["a"]);
    }

    #[tokio::test]
    async fn dropped_subscription_keeps_session_running() {
        let (mut session, transport, mut rx) = session(Capability::Primary);
        session.init();
        let mut link = transport.take_link();
        // Outbound side gone: the subscription has nowhere to go.
        let (_conn, _events, spare) = transport::link("wss://spare/ws");
        drop(std::mem::replace(&mut link.outbound, spare.outbound));

        link.emit(TransportEvent::Open);
        link.emit(TransportEvent::Message("still here".to_string()));
        assert_eq!(session.process_next().await, None);
        assert_eq!(session.process_next().await, None);

        assert_eq!(session.state(), ConnectionState::Open);
        assert_eq!(drain(&mut rx), vec!["still here"]);
        assert_eq!(session.broadcast("ping"), SendOutcome::Dropped);
    }

    #[tokio::test]
    async fn run_after_end_returns_same_outcome() {
        let (mut session, transport, _rx) = session(Capability::Primary);
        session.init();
        let link = transport.take_link();
        link.emit(TransportEvent::Close(CloseInfo::abnormal("refused")));

        let first = session.run().await;
        let second = session.run().await;
        assert_eq!(first, second);
        assert_eq!(session.state(), ConnectionState::Closed);
    }
}
