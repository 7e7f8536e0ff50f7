//! The open document: where it lives on disk, whether it has unsaved
//! changes, and the new/open/save/close flows that move between those states.

use crate::host::{Choice, Dialogs, Prompt, Window};
use crate::title::window_title;
use automaton_project::{DOCUMENT_FILTER, ProjectError, read_document, write_document};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// How a file operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The user backed out of a confirmation or a picker.
    Canceled,
    /// An I/O error was reported to the user.
    Failed,
    /// Another file operation was still waiting on the user.
    Busy,
}

impl Outcome {
    pub fn is_completed(self) -> bool {
        self == Outcome::Completed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    Allow,
    Veto,
}

#[derive(Debug, Default)]
struct SessionState {
    current_path: Option<PathBuf>,
    dirty: bool,
    /// Bumped every time the editor reports new changes.
    edits: u64,
}

/// Clears the in-flight flag when the operation holding it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct DocumentSession {
    dialogs: Arc<dyn Dialogs>,
    window: Arc<dyn Window>,
    state: Mutex<SessionState>,
    in_flight: AtomicBool,
}

impl DocumentSession {
    pub fn new(dialogs: Arc<dyn Dialogs>, window: Arc<dyn Window>) -> Self {
        let session = Self {
            dialogs,
            window,
            state: Mutex::new(SessionState::default()),
            in_flight: AtomicBool::new(false),
        };
        session.refresh_title();
        session
    }

    pub fn current_path(&self) -> Option<PathBuf> {
        self.state.lock().current_path.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.state.lock().dirty
    }

    pub fn title(&self) -> String {
        let state = self.state.lock();
        window_title(state.current_path.as_deref(), state.dirty)
    }

    /// Whether a file operation is waiting on a dialog or the disk.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Start over with an untitled document.
    ///
    /// The editor clears its own content when this completes.
    pub async fn new_document(&self) -> Outcome {
        let Some(_in_flight) = self.begin() else {
            return Outcome::Busy;
        };
        if !self.confirm_if_dirty(Prompt::NewProject).await {
            return Outcome::Canceled;
        }

        self.state.lock().current_path = None;
        self.refresh_title();
        tracing::info!("new document");
        Outcome::Completed
    }

    /// Pick a document and read it, returning its text for the editor.
    ///
    /// The current path only moves once the read has succeeded.
    pub async fn open_document(&self) -> Result<String, Outcome> {
        let Some(_in_flight) = self.begin() else {
            return Err(Outcome::Busy);
        };
        if !self.confirm_if_dirty(Prompt::OpenFile).await {
            return Err(Outcome::Canceled);
        }
        let Some(path) = self.dialogs.pick_open_path(&DOCUMENT_FILTER).await else {
            return Err(Outcome::Canceled);
        };

        match read_document(&path).await {
            Ok(data) => {
                self.state.lock().current_path = Some(path.clone());
                self.refresh_title();
                tracing::info!(path = %path.display(), "opened document");
                Ok(data)
            }
            Err(err) => {
                self.report(&err).await;
                Err(Outcome::Failed)
            }
        }
    }

    /// Write `data` to the current path, or ask for one first.
    pub async fn save(&self, data: &str) -> Outcome {
        let Some(_in_flight) = self.begin() else {
            return Outcome::Busy;
        };

        let current = self.current_path();
        match current {
            Some(path) => self.write_to(&path, data).await,
            None => self.pick_and_write(data).await,
        }
    }

    /// Ask for a path and write `data` there.
    pub async fn save_as(&self, data: &str) -> Outcome {
        let Some(_in_flight) = self.begin() else {
            return Outcome::Busy;
        };
        self.pick_and_write(data).await
    }

    pub fn notify_dirty_changed(&self, dirty: bool) {
        let mut state = self.state.lock();
        state.dirty = dirty;
        if dirty {
            state.edits += 1;
        }
        self.window
            .set_title(&window_title(state.current_path.as_deref(), state.dirty));
    }

    /// Decide whether the window may close.
    ///
    /// A close that arrives while another operation is waiting on the user is
    /// refused; that operation's dialog is still up.
    pub async fn handle_window_close(&self) -> CloseDecision {
        let Some(_in_flight) = self.begin() else {
            tracing::debug!("close requested during a file operation");
            return CloseDecision::Veto;
        };

        if self.confirm_if_dirty(Prompt::CloseWindow).await {
            CloseDecision::Allow
        } else {
            CloseDecision::Veto
        }
    }

    fn begin(&self) -> Option<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(&self.in_flight))
    }

    /// `true` when the flow may go on: the document is clean or the user
    /// agreed to discard it.
    async fn confirm_if_dirty(&self, prompt: Prompt) -> bool {
        if !self.is_dirty() {
            return true;
        }
        let choice = self.dialogs.confirm_discard(prompt).await;
        tracing::debug!(?prompt, ?choice, "discard confirmation");
        choice == Choice::Discard
    }

    async fn pick_and_write(&self, data: &str) -> Outcome {
        let Some(path) = self.dialogs.pick_save_path(&DOCUMENT_FILTER).await else {
            return Outcome::Canceled;
        };
        self.write_to(&path, data).await
    }

    async fn write_to(&self, path: &Path, data: &str) -> Outcome {
        let edits_before = self.state.lock().edits;

        if let Err(err) = write_document(path, data).await {
            self.report(&err).await;
            return Outcome::Failed;
        }

        {
            let mut state = self.state.lock();
            state.current_path = Some(path.to_path_buf());
            // Changes made while the write was running are not on disk.
            if state.edits == edits_before {
                state.dirty = false;
            }
        }
        self.refresh_title();
        tracing::info!(path = %path.display(), bytes = data.len(), "saved document");
        Outcome::Completed
    }

    async fn report(&self, err: &ProjectError) {
        tracing::error!(%err, "file operation failed");
        self.dialogs.show_error(&err.to_string()).await;
    }

    fn refresh_title(&self) {
        let state = self.state.lock();
        self.window
            .set_title(&window_title(state.current_path.as_deref(), state.dirty));
    }
}
