//! The shell context: one document session, one relay hub and the editor
//! they serve.

use crate::host::{Dialogs, Editor, Toast, Window};
use crate::session::{CloseDecision, DocumentSession, Outcome};
use automaton_project::{FxDefinitions, ProjectError, default_fx_directory, load_fx_definitions};
use automaton_relay::{EventReceiver, HubEvent, RelayError, RelayHub};
use automaton_transport::Message;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

/// Port the editor suggests for the relay listener.
pub const DEFAULT_PORT: u16 = 17490;

const BUSY_MESSAGE: &str = "Another file operation is still in progress";

/// Something the user did in the editor that the shell reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    Play,
    Pause,
    Seek { time: f64 },
    DirtyChanged(bool),
}

pub struct Shell {
    document: DocumentSession,
    relay: RelayHub,
    editor: Arc<dyn Editor>,
    dialogs: Arc<dyn Dialogs>,
    fx_directory: Option<PathBuf>,
}

impl Shell {
    /// Build a shell and the stream of relay events to feed into [`Shell::pump`].
    pub fn new(
        dialogs: Arc<dyn Dialogs>,
        window: Arc<dyn Window>,
        editor: Arc<dyn Editor>,
    ) -> (Self, EventReceiver) {
        let (relay, events) = RelayHub::new();
        let shell = Self {
            document: DocumentSession::new(Arc::clone(&dialogs), window),
            relay,
            editor,
            dialogs,
            fx_directory: None,
        };
        (shell, events)
    }

    /// Look for fx definitions in `dir` instead of `~/.automaton/fxs`.
    pub fn with_fx_directory(mut self, dir: Option<PathBuf>) -> Self {
        self.fx_directory = dir;
        self
    }

    pub fn document(&self) -> &DocumentSession {
        &self.document
    }

    pub fn relay(&self) -> &RelayHub {
        &self.relay
    }

    pub async fn new_document(&self) -> Outcome {
        let outcome = self.document.new_document().await;
        self.warn_if_busy(outcome);
        outcome
    }

    pub async fn open_document(&self) -> Result<String, Outcome> {
        let opened = self.document.open_document().await;
        if let Err(outcome) = opened {
            self.warn_if_busy(outcome);
        }
        opened
    }

    pub async fn save_document(&self, data: &str) -> Outcome {
        let outcome = self.document.save(data).await;
        self.after_save(outcome)
    }

    pub async fn save_document_as(&self, data: &str) -> Outcome {
        let outcome = self.document.save_as(data).await;
        self.after_save(outcome)
    }

    pub fn notify_dirty_changed(&self, dirty: bool) {
        self.document.notify_dirty_changed(dirty);
    }

    pub async fn request_close_window(&self) -> CloseDecision {
        self.document.handle_window_close().await
    }

    /// Start the relay on `port` on every interface.
    pub async fn open_listener(&self, port: u16) -> Outcome {
        self.open_listener_on(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
            .await
    }

    pub async fn open_listener_on(&self, addr: SocketAddr) -> Outcome {
        match self.relay.open_listener_on(addr).await {
            Ok(local_addr) => {
                self.editor.toast(Toast::info(
                    format!("WebSocket server is running @ port {}", local_addr.port()),
                    5.0,
                ));
                Outcome::Completed
            }
            Err(RelayError::AlreadyRunning(_)) => {
                self.editor.toast(Toast::error(
                    "WebSocket server is already running! Close the existing one before opening.",
                ));
                Outcome::Failed
            }
            Err(err) => {
                self.report_error(&err.to_string()).await;
                Outcome::Failed
            }
        }
    }

    pub async fn close_listener(&self) -> Outcome {
        match self.relay.close_listener().await {
            Ok(()) => {
                self.editor.toast(Toast::info("Closed WebSocket server", 2.0));
                Outcome::Completed
            }
            Err(RelayError::NotRunning) => {
                self.editor
                    .toast(Toast::error("WebSocket server is not running!"));
                Outcome::Failed
            }
            Err(err) => {
                self.report_error(&err.to_string()).await;
                Outcome::Failed
            }
        }
    }

    pub fn broadcast(&self, message: &Message) {
        self.relay.broadcast(message);
    }

    /// Surface a failure the editor ran into.
    pub async fn report_error(&self, message: &str) {
        tracing::error!(detail = message, "surfacing error");
        self.dialogs.show_error(message).await;
    }

    /// Scan the fx directory for effect scripts.
    pub async fn load_fx_definitions(&self) -> Result<FxDefinitions, Outcome> {
        let root = self.fx_directory.clone();
        let scanned = tokio::task::spawn_blocking(move || -> Result<_, ProjectError> {
            let root = match root {
                Some(root) => root,
                None => default_fx_directory()?,
            };
            load_fx_definitions(&root)
        })
        .await;

        match scanned {
            Ok(Ok(definitions)) => {
                tracing::info!(count = definitions.len(), "loaded fx definitions");
                Ok(definitions)
            }
            Ok(Err(err)) => {
                self.report_error(&err.to_string()).await;
                Err(Outcome::Failed)
            }
            Err(err) => {
                tracing::error!(%err, "fx scan did not finish");
                Err(Outcome::Failed)
            }
        }
    }

    pub fn on_editor_event(&self, event: EditorEvent) {
        match event {
            EditorEvent::Play => self.broadcast(&Message::Play),
            EditorEvent::Pause => self.broadcast(&Message::Pause),
            EditorEvent::Seek { time } => self.broadcast(&Message::Seek { time }),
            EditorEvent::DirtyChanged(dirty) => self.notify_dirty_changed(dirty),
        }
    }

    pub fn on_hub_event(&self, event: HubEvent) {
        match event {
            HubEvent::Connected { .. } => self
                .editor
                .toast(Toast::info("Someone connects to the WebSocket server", 2.0)),
            HubEvent::Disconnected { .. } => self
                .editor
                .toast(Toast::info("Someone left the WebSocket session", 2.0)),
            HubEvent::Message { session, message } => {
                // Queued before a close; the session is gone now.
                if !self.relay.is_connected(session) {
                    tracing::debug!(%session, kind = message.kind(), "dropping stale message");
                    return;
                }
                self.on_message(message);
            }
        }
    }

    /// Apply a message a runtime client sent.
    pub fn on_message(&self, message: Message) {
        match message {
            Message::Update { time } if time.is_finite() => {
                self.editor.reset();
                self.editor.update(time);
            }
            Message::Auto { name } => self.editor.claim_channel(&name),
            other => tracing::debug!(kind = other.kind(), "ignoring inbound message"),
        }
    }

    /// Feed relay events into the shell until the hub goes away.
    pub async fn pump(self: Arc<Self>, mut events: EventReceiver) {
        while let Some(event) = events.recv().await {
            self.on_hub_event(event);
        }
    }

    fn after_save(&self, outcome: Outcome) -> Outcome {
        if outcome.is_completed() {
            self.editor.toast(Toast::info("Saved!", 2.0));
        }
        self.warn_if_busy(outcome);
        outcome
    }

    fn warn_if_busy(&self, outcome: Outcome) {
        if outcome == Outcome::Busy {
            self.editor.toast(Toast::warning(BUSY_MESSAGE));
        }
    }
}
