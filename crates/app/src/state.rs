//! Application state shared by every request handler.

use crate::config::Config;
use crate::editor::{EventStream, IpcEditor};
use automaton_core::{Dialogs, EventReceiver, Shell};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub struct AppState {
    pub shell: Arc<Shell>,
    pub editor: IpcEditor,
    config: Mutex<Config>,
    config_path: Option<PathBuf>,
    exit: CancellationToken,
}

impl AppState {
    /// Returns the state, the events to write to the editor and the relay
    /// events to pump into the shell.
    pub fn new(
        dialogs: Arc<dyn Dialogs>,
        config: Config,
        config_path: Option<PathBuf>,
    ) -> (Self, EventStream, EventReceiver) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let editor = IpcEditor::new(events_tx);

        let (shell, hub_events) = Shell::new(
            dialogs,
            Arc::new(editor.clone()),
            Arc::new(editor.clone()),
        );
        let shell = shell.with_fx_directory(config.fx_directory.clone());

        let state = Self {
            shell: Arc::new(shell),
            editor,
            config: Mutex::new(config),
            config_path,
            exit: CancellationToken::new(),
        };
        (state, events_rx, hub_events)
    }

    pub fn relay_port(&self) -> u16 {
        self.config.lock().relay.port
    }

    pub fn autostart(&self) -> bool {
        self.config.lock().relay.autostart
    }

    /// Offer `port` next time.
    ///
    /// The file is written off the runtime and after the lock is released.
    pub async fn remember_port(&self, port: u16) {
        let snapshot = {
            let mut config = self.config.lock();
            if config.relay.port == port {
                return;
            }
            config.relay.port = port;
            config.clone()
        };

        let path = self.config_path.clone();
        if let Err(err) =
            tokio::task::spawn_blocking(move || snapshot.save(path.as_deref())).await
        {
            tracing::warn!(%err, "config save task failed");
        }
    }

    pub fn exit_token(&self) -> CancellationToken {
        self.exit.clone()
    }

    /// Stop the relay if it runs and let the process wind down.
    pub async fn shutdown(&self) {
        let relay = self.shell.relay();
        if relay.local_addr().await.is_some() {
            if let Err(err) = relay.close_listener().await {
                tracing::debug!(%err, "relay already closed");
            }
        }
        self.exit.cancel();
    }
}
