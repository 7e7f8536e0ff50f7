//! WebSocket relay between the editor and any number of runtime clients.
//!
//! The hub owns at most one listening socket and the set of sessions that
//! connected through it. It is a plain fan-out/fan-in bus: [`RelayHub::broadcast`]
//! sends a message to every session, and every message a session sends back
//! is surfaced as a [`HubEvent`] on the channel returned by [`RelayHub::new`].
//! There is no per-session addressing.

mod session;

use automaton_transport::{Message, decode_frame};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HubEvent {
    Connected { session: SessionId, peer: SocketAddr },
    Disconnected { session: SessionId },
    Message { session: SessionId, message: Message },
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Relay is already running on {0}")]
    AlreadyRunning(SocketAddr),

    #[error("Relay is not running")]
    NotRunning,

    #[error("Failed to listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
}

pub type EventReceiver = mpsc::UnboundedReceiver<HubEvent>;

type Outbound = mpsc::UnboundedSender<Arc<str>>;

struct Listener {
    local_addr: SocketAddr,
    shutdown: CancellationToken,
    accept_task: JoinHandle<()>,
}

pub(crate) struct Shared {
    /// Held across the bind so two concurrent opens cannot both succeed.
    listener: tokio::sync::Mutex<Option<Listener>>,
    sessions: Mutex<HashMap<SessionId, Outbound>>,
    events: mpsc::UnboundedSender<HubEvent>,
    next_session: AtomicU64,
}

#[derive(Clone)]
pub struct RelayHub {
    shared: Arc<Shared>,
}

impl fmt::Debug for RelayHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayHub")
            .field("sessions", &self.session_count())
            .finish_non_exhaustive()
    }
}

impl RelayHub {
    pub fn new() -> (Self, EventReceiver) {
        let (events, receiver) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            listener: tokio::sync::Mutex::new(None),
            sessions: Mutex::new(HashMap::new()),
            events,
            next_session: AtomicU64::new(1),
        });
        (Self { shared }, receiver)
    }

    /// Listen on `port` on every interface.
    pub async fn open_listener(&self, port: u16) -> Result<SocketAddr, RelayError> {
        self.open_listener_on(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
            .await
    }

    /// Listen on `addr`, returning the address actually bound.
    ///
    /// Fails with [`RelayError::AlreadyRunning`] while a listener exists; the
    /// running listener is left untouched.
    pub async fn open_listener_on(&self, addr: SocketAddr) -> Result<SocketAddr, RelayError> {
        let mut slot = self.shared.listener.lock().await;
        if let Some(existing) = slot.as_ref() {
            return Err(RelayError::AlreadyRunning(existing.local_addr));
        }

        let bind_error = |source| RelayError::Bind { addr, source };
        let socket = TcpListener::bind(addr).await.map_err(bind_error)?;
        let local_addr = socket.local_addr().map_err(bind_error)?;

        let shutdown = CancellationToken::new();
        let accept_task = tokio::spawn(accept_loop(
            Arc::clone(&self.shared),
            socket,
            shutdown.clone(),
        ));

        *slot = Some(Listener {
            local_addr,
            shutdown,
            accept_task,
        });

        tracing::info!(%local_addr, "relay listening");
        Ok(local_addr)
    }

    /// Stop listening and forget every session.
    ///
    /// Returns once the accept loop has stopped. Sessions are dropped from the
    /// set even if their close handshake is still in flight, and anything they
    /// send afterwards is discarded.
    pub async fn close_listener(&self) -> Result<(), RelayError> {
        let mut slot = self.shared.listener.lock().await;
        let Some(listener) = slot.take() else {
            return Err(RelayError::NotRunning);
        };

        listener.shutdown.cancel();
        if let Err(err) = listener.accept_task.await {
            tracing::warn!(%err, "relay accept task ended abnormally");
        }

        let dropped = {
            let mut sessions = self.shared.sessions.lock();
            let count = sessions.len();
            sessions.clear();
            count
        };

        tracing::info!(local_addr = %listener.local_addr, dropped, "relay closed");
        Ok(())
    }

    /// Send `message` to every connected session.
    ///
    /// Fire-and-forget: a session that cannot take the message is skipped.
    pub fn broadcast(&self, message: &Message) {
        let text: Arc<str> = match message.encode() {
            Ok(text) => text.into(),
            Err(err) => {
                tracing::warn!(%err, kind = message.kind(), "not broadcasting message");
                return;
            }
        };

        let targets: Vec<(SessionId, Outbound)> = self
            .shared
            .sessions
            .lock()
            .iter()
            .map(|(id, outbound)| (*id, outbound.clone()))
            .collect();

        for (session, outbound) in &targets {
            if outbound.send(Arc::clone(&text)).is_err() {
                tracing::debug!(%session, "session is closing, message dropped");
            }
        }

        tracing::trace!(kind = message.kind(), sessions = targets.len(), "broadcast");
    }

    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.shared
            .listener
            .lock()
            .await
            .as_ref()
            .map(|listener| listener.local_addr)
    }

    pub fn session_count(&self) -> usize {
        self.shared.sessions.lock().len()
    }

    pub fn is_connected(&self, session: SessionId) -> bool {
        self.shared.sessions.lock().contains_key(&session)
    }
}

impl Shared {
    /// Add a session unless the listener it came from is already shut down.
    fn register(
        &self,
        shutdown: &CancellationToken,
        peer: SocketAddr,
        outbound: Outbound,
    ) -> Option<SessionId> {
        let session = SessionId(self.next_session.fetch_add(1, Ordering::Relaxed));
        {
            let mut sessions = self.sessions.lock();
            if shutdown.is_cancelled() {
                return None;
            }
            sessions.insert(session, outbound);
        }

        tracing::info!(%session, %peer, "session connected");
        let _ = self.events.send(HubEvent::Connected { session, peer });
        Some(session)
    }

    fn unregister(&self, session: SessionId) {
        if self.sessions.lock().remove(&session).is_some() {
            tracing::info!(%session, "session disconnected");
            let _ = self.events.send(HubEvent::Disconnected { session });
        }
    }

    /// Decode an inbound frame and pass every well-formed message on.
    fn forward(&self, session: SessionId, frame: &str) {
        for decoded in decode_frame(frame) {
            match decoded {
                Ok(message) => {
                    if !self.sessions.lock().contains_key(&session) {
                        tracing::debug!(%session, "ignoring message from stale session");
                        return;
                    }
                    let _ = self.events.send(HubEvent::Message { session, message });
                }
                Err(err) => tracing::debug!(%session, %err, "ignoring inbound message"),
            }
        }
    }
}

async fn accept_loop(shared: Arc<Shared>, socket: TcpListener, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = socket.accept() => match accepted {
                Ok((stream, peer)) => {
                    tokio::spawn(session::run(
                        Arc::clone(&shared),
                        stream,
                        peer,
                        shutdown.child_token(),
                    ));
                }
                Err(err) => {
                    tracing::warn!(%err, "failed to accept connection");
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};
    use tokio::net::TcpStream;
    use tokio::time::timeout;
    use tokio_tungstenite::tungstenite::Message as WsMessage;
    use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

    type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

    const WAIT: Duration = Duration::from_secs(5);
    const QUIET: Duration = Duration::from_millis(200);

    fn loopback() -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, 0))
    }

    async fn start_hub() -> (RelayHub, EventReceiver, SocketAddr) {
        let (hub, events) = RelayHub::new();
        let addr = hub.open_listener_on(loopback()).await.expect("open listener");
        (hub, events, addr)
    }

    async fn next_event(events: &mut EventReceiver) -> HubEvent {
        timeout(WAIT, events.recv())
            .await
            .expect("timed out waiting for hub event")
            .expect("event channel closed")
    }

    async fn connect(addr: SocketAddr, events: &mut EventReceiver) -> (Client, SessionId) {
        let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("connect");
        match next_event(events).await {
            HubEvent::Connected { session, .. } => (client, session),
            other => panic!("expected Connected, got {other:?}"),
        }
    }

    async fn next_text(client: &mut Client) -> String {
        loop {
            match timeout(WAIT, client.next()).await.expect("timed out") {
                Some(Ok(WsMessage::Text(text))) => return text,
                Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_))) => continue,
                other => panic!("expected text frame, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_open_twice_keeps_first_listener() {
        let (hub, mut events, addr) = start_hub().await;

        let second = hub.open_listener_on(loopback()).await;
        assert!(matches!(second, Err(RelayError::AlreadyRunning(running)) if running == addr));
        assert_eq!(hub.local_addr().await, Some(addr));

        let (_client, _) = connect(addr, &mut events).await;
        assert_eq!(hub.session_count(), 1);
    }

    #[tokio::test]
    async fn test_close_without_listener() {
        let (hub, _events) = RelayHub::new();
        assert!(matches!(
            hub.close_listener().await,
            Err(RelayError::NotRunning)
        ));
    }

    #[tokio::test]
    async fn test_bind_failure_leaves_hub_closed() {
        let blocker = std::net::TcpListener::bind(loopback()).expect("bind blocker");
        let taken = blocker.local_addr().expect("blocker addr");
        let (hub, _events) = RelayHub::new();

        let result = hub.open_listener_on(taken).await;
        assert!(matches!(result, Err(RelayError::Bind { addr, .. }) if addr == taken));
        assert_eq!(hub.local_addr().await, None);

        hub.open_listener_on(loopback()).await.expect("open after failure");
    }

    #[tokio::test]
    async fn test_play_reaches_session_exactly_once() {
        let (hub, mut events, addr) = start_hub().await;
        let (mut client, _) = connect(addr, &mut events).await;

        hub.broadcast(&Message::Play);

        assert_eq!(next_text(&mut client).await, r#"{"type":"play"}"#);
        assert!(timeout(QUIET, client.next()).await.is_err());
    }

    #[tokio::test]
    async fn test_broadcast_seek_to_two_sessions() {
        let (hub, mut events, addr) = start_hub().await;
        let (mut first, _) = connect(addr, &mut events).await;
        let (mut second, _) = connect(addr, &mut events).await;

        hub.broadcast(&Message::seek(42.125));

        for client in [&mut first, &mut second] {
            let text = next_text(client).await;
            assert_eq!(Message::decode(&text).expect("decode"), Message::seek(42.125));
        }
    }

    #[tokio::test]
    async fn test_broadcast_preserves_order_per_session() {
        let (hub, mut events, addr) = start_hub().await;
        let (mut client, _) = connect(addr, &mut events).await;

        hub.broadcast(&Message::Play);
        hub.broadcast(&Message::seek(1.0));
        hub.broadcast(&Message::Pause);

        let received = [
            next_text(&mut client).await,
            next_text(&mut client).await,
            next_text(&mut client).await,
        ];
        let kinds: Vec<_> = received
            .iter()
            .map(|text| Message::decode(text).expect("decode").kind())
            .collect();
        assert_eq!(kinds, vec!["play", "seek", "pause"]);
    }

    #[tokio::test]
    async fn test_broadcast_survives_aborted_session() {
        let (hub, mut events, addr) = start_hub().await;
        let (mut healthy, _) = connect(addr, &mut events).await;
        let (aborted, aborted_id) = connect(addr, &mut events).await;

        // Dropping the stream closes the socket without a close handshake.
        drop(aborted);

        hub.broadcast(&Message::Play);
        hub.broadcast(&Message::Pause);

        assert_eq!(next_text(&mut healthy).await, r#"{"type":"play"}"#);
        assert_eq!(next_text(&mut healthy).await, r#"{"type":"pause"}"#);

        assert_eq!(
            next_event(&mut events).await,
            HubEvent::Disconnected {
                session: aborted_id
            }
        );
        assert!(!hub.is_connected(aborted_id));

        let (mut late, _) = connect(addr, &mut events).await;
        hub.broadcast(&Message::seek(3.0));
        for client in [&mut healthy, &mut late] {
            let text = next_text(client).await;
            assert_eq!(Message::decode(&text).expect("decode"), Message::seek(3.0));
        }
    }

    #[tokio::test]
    async fn test_broadcast_without_sessions_is_noop() {
        let (hub, _events) = RelayHub::new();
        hub.broadcast(&Message::Pause);
        assert_eq!(hub.session_count(), 0);
    }

    #[tokio::test]
    async fn test_inbound_messages_become_events() {
        let (_hub, mut events, addr) = start_hub().await;
        let (mut client, session) = connect(addr, &mut events).await;

        client
            .send(WsMessage::Text(r#"{"type":"update","time":7.5}"#.to_string()))
            .await
            .expect("send");

        assert_eq!(
            next_event(&mut events).await,
            HubEvent::Message {
                session,
                message: Message::Update { time: 7.5 }
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_inbound_is_ignored() {
        let (hub, mut events, addr) = start_hub().await;
        let (mut client, session) = connect(addr, &mut events).await;

        client
            .send(WsMessage::Text("{ definitely not json".to_string()))
            .await
            .expect("send garbage");
        client
            .send(WsMessage::Text(r#"{"type":"bogus"}"#.to_string()))
            .await
            .expect("send unknown");
        client
            .send(WsMessage::Binary(br#"{"type":"auto","name":"fov"}"#.to_vec()))
            .await
            .expect("send binary");

        assert_eq!(
            next_event(&mut events).await,
            HubEvent::Message {
                session,
                message: Message::Auto {
                    name: "fov".to_string()
                }
            }
        );
        assert!(hub.is_connected(session));
    }

    #[tokio::test]
    async fn test_disconnect_removes_session() {
        let (hub, mut events, addr) = start_hub().await;
        let (mut client, session) = connect(addr, &mut events).await;
        assert!(hub.is_connected(session));

        client.close(None).await.expect("close");

        assert_eq!(
            next_event(&mut events).await,
            HubEvent::Disconnected { session }
        );
        assert_eq!(hub.session_count(), 0);
    }

    #[tokio::test]
    async fn test_close_listener_forgets_sessions() {
        let (hub, mut events, addr) = start_hub().await;
        let (mut first, first_id) = connect(addr, &mut events).await;
        let (_second, _) = connect(addr, &mut events).await;
        assert_eq!(hub.session_count(), 2);

        hub.close_listener().await.expect("close");

        assert_eq!(hub.session_count(), 0);
        assert!(!hub.is_connected(first_id));
        assert_eq!(hub.local_addr().await, None);

        let _ = first
            .send(WsMessage::Text(r#"{"type":"update","time":1}"#.to_string()))
            .await;
        while let Ok(Some(event)) = timeout(QUIET, events.recv()).await {
            assert!(
                !matches!(event, HubEvent::Message { .. }),
                "stale session produced {event:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_reopen_after_close() {
        let (hub, _events, _) = start_hub().await;
        hub.close_listener().await.expect("close");
        hub.open_listener_on(loopback()).await.expect("reopen");
    }
}
