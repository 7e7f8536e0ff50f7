//! Capabilities the shell needs from its host: dialogs, the window title and
//! the editor itself.
//!
//! Everything here is implemented outside the core. The native app backs
//! them with `rfd` dialogs and the editor IPC stream; tests use recorders.

use async_trait::async_trait;
use automaton_project::DocumentFilter;
use serde::Serialize;
use std::path::PathBuf;

pub const DISCARD_LABEL: &str = "Discard Changes";
pub const CANCEL_LABEL: &str = "Nope Nope Nope";

/// Answer to a discard-changes confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Discard,
    Cancel,
}

/// Which destructive action is asking to throw away unsaved changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    NewProject,
    OpenFile,
    CloseWindow,
}

impl Prompt {
    pub fn message(self) -> &'static str {
        match self {
            Prompt::NewProject => {
                "You are going to make a new project.\nAre you sure? You are going to lose your current changes!"
            }
            Prompt::OpenFile => {
                "You are going to open a file.\nAre you sure? You will lose your current changes after opening a file!"
            }
            Prompt::CloseWindow => {
                "You are going to close the window.\nAre you sure? You are going to lose your current changes!"
            }
        }
    }
}

#[async_trait]
pub trait Dialogs: Send + Sync {
    async fn confirm_discard(&self, prompt: Prompt) -> Choice;

    /// `None` when the user dismissed the picker.
    async fn pick_open_path(&self, filter: &DocumentFilter) -> Option<PathBuf>;

    /// `None` when the user dismissed the picker.
    async fn pick_save_path(&self, filter: &DocumentFilter) -> Option<PathBuf>;

    /// Show an error and wait until the user has seen it.
    async fn show_error(&self, message: &str);
}

pub trait Window: Send + Sync {
    fn set_title(&self, title: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Info,
    Warning,
    Error,
}

/// Short, non-blocking notification shown by the editor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    /// Seconds until the toast hides itself; sticky when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
}

impl Toast {
    pub fn info(message: impl Into<String>, timeout: f64) -> Self {
        Self {
            kind: ToastKind::Info,
            message: message.into(),
            timeout: Some(timeout),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Warning,
            message: message.into(),
            timeout: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
            timeout: None,
        }
    }
}

/// The command surface of the hosted editor that the shell drives.
pub trait Editor: Send + Sync {
    /// Drop transient playback state before a time update.
    fn reset(&self);

    fn update(&self, time: f64);

    /// A runtime client is driving the channel `name`.
    fn claim_channel(&self, name: &str);

    fn toast(&self, toast: Toast);
}
