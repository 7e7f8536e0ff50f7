//! Recording stand-ins for the host capabilities.

use crate::host::{Choice, Dialogs, Editor, Prompt, Toast, Window};
use async_trait::async_trait;
use automaton_project::DocumentFilter;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq)]
pub enum DialogCall {
    Confirm(Prompt),
    PickOpen,
    PickSave,
    Error(String),
}

/// Answers dialogs from pre-loaded queues. An empty queue means the user
/// backed out.
#[derive(Default)]
pub struct ScriptedDialogs {
    choices: Mutex<VecDeque<Choice>>,
    open_paths: Mutex<VecDeque<PathBuf>>,
    save_paths: Mutex<VecDeque<PathBuf>>,
    calls: Mutex<Vec<DialogCall>>,
    /// When set, the open picker waits for a notification before answering.
    open_gate: Option<Arc<Notify>>,
}

impl ScriptedDialogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn choose(self, choice: Choice) -> Self {
        self.choices.lock().push_back(choice);
        self
    }

    pub fn open_path(self, path: impl Into<PathBuf>) -> Self {
        self.open_paths.lock().push_back(path.into());
        self
    }

    pub fn save_path(self, path: impl Into<PathBuf>) -> Self {
        self.save_paths.lock().push_back(path.into());
        self
    }

    pub fn gate_open(mut self, gate: Arc<Notify>) -> Self {
        self.open_gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<DialogCall> {
        self.calls.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                DialogCall::Error(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Dialogs for ScriptedDialogs {
    async fn confirm_discard(&self, prompt: Prompt) -> Choice {
        self.calls.lock().push(DialogCall::Confirm(prompt));
        self.choices.lock().pop_front().unwrap_or(Choice::Cancel)
    }

    async fn pick_open_path(&self, _filter: &DocumentFilter) -> Option<PathBuf> {
        self.calls.lock().push(DialogCall::PickOpen);
        if let Some(gate) = &self.open_gate {
            gate.notified().await;
        }
        self.open_paths.lock().pop_front()
    }

    async fn pick_save_path(&self, _filter: &DocumentFilter) -> Option<PathBuf> {
        self.calls.lock().push(DialogCall::PickSave);
        self.save_paths.lock().pop_front()
    }

    async fn show_error(&self, message: &str) {
        self.calls.lock().push(DialogCall::Error(message.to_string()));
    }
}

#[derive(Default)]
pub struct TitleRecorder {
    titles: Mutex<Vec<String>>,
}

impl TitleRecorder {
    pub fn titles(&self) -> Vec<String> {
        self.titles.lock().clone()
    }

    pub fn last(&self) -> String {
        self.titles.lock().last().cloned().unwrap_or_default()
    }
}

impl Window for TitleRecorder {
    fn set_title(&self, title: &str) {
        self.titles.lock().push(title.to_string());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorCall {
    Reset,
    Update(f64),
    Claim(String),
    Toast(Toast),
}

#[derive(Default)]
pub struct EditorRecorder {
    calls: Mutex<Vec<EditorCall>>,
}

impl EditorRecorder {
    pub fn calls(&self) -> Vec<EditorCall> {
        self.calls.lock().clone()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                EditorCall::Toast(toast) => Some(toast.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn playback_calls(&self) -> Vec<EditorCall> {
        self.calls
            .lock()
            .iter()
            .filter(|call| !matches!(call, EditorCall::Toast(_)))
            .cloned()
            .collect()
    }
}

impl Editor for EditorRecorder {
    fn reset(&self) {
        self.calls.lock().push(EditorCall::Reset);
    }

    fn update(&self, time: f64) {
        self.calls.lock().push(EditorCall::Update(time));
    }

    fn claim_channel(&self, name: &str) {
        self.calls.lock().push(EditorCall::Claim(name.to_string()));
    }

    fn toast(&self, toast: Toast) {
        self.calls.lock().push(EditorCall::Toast(toast));
    }
}
