//! JSON lines exchanged with the editor over stdin/stdout.
//!
//! Each request is one line `{"id": 7, "cmd": "saveDocument", "data": "…"}`;
//! `id` is optional and echoed back on the reply. Everything the shell tells
//! the editor is an event line tagged with `"event"`.

use crate::app_menus::{Menu, MenuCommand};
use automaton_core::{CloseDecision, Outcome, Toast};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "cmd", rename_all = "camelCase")]
pub enum Command {
    NewDocument,
    OpenDocument,
    SaveDocument { data: String },
    SaveDocumentAs { data: String },
    NotifyDirtyChanged { dirty: bool },
    RequestCloseWindow,
    /// Falls back to the configured port.
    OpenListener {
        #[serde(default)]
        port: Option<u16>,
    },
    CloseListener,
    Play,
    Pause,
    Seek { time: f64 },
    ReportError { message: String },
    LoadFxDefinitions,
    Menu { command: MenuCommand },
    Accelerator { keys: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Completed,
    Canceled,
    Failed,
    Busy,
    Allow,
    Veto,
}

impl From<Outcome> for Status {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Completed => Status::Completed,
            Outcome::Canceled => Status::Canceled,
            Outcome::Failed => Status::Failed,
            Outcome::Busy => Status::Busy,
        }
    }
}

impl From<CloseDecision> for Status {
    fn from(decision: CloseDecision) -> Self {
        match decision {
            CloseDecision::Allow => Status::Allow,
            CloseDecision::Veto => Status::Veto,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Event {
    Reply {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<u64>,
        status: Status,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<serde_json::Value>,
    },
    Title {
        title: String,
    },
    Toast(Toast),
    Reset,
    Update {
        time: f64,
    },
    Auto {
        name: String,
    },
    /// A menu command the editor handles itself.
    Menu {
        command: &'static str,
    },
    Menus {
        menus: Vec<Menu>,
    },
}

impl Event {
    pub fn reply(id: Option<u64>, status: impl Into<Status>) -> Self {
        Event::Reply {
            id,
            status: status.into(),
            data: None,
        }
    }

    pub fn reply_with(id: Option<u64>, status: impl Into<Status>, data: serde_json::Value) -> Self {
        Event::Reply {
            id,
            status: status.into(),
            data: Some(data),
        }
    }
}
