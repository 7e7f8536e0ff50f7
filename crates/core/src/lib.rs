pub mod host;
pub mod session;
pub mod shell;
pub mod title;

#[cfg(test)]
pub(crate) mod testing;

pub use host::{CANCEL_LABEL, Choice, DISCARD_LABEL, Dialogs, Editor, Prompt, Toast, ToastKind, Window};
pub use session::{CloseDecision, DocumentSession, Outcome};
pub use shell::{DEFAULT_PORT, EditorEvent, Shell};
pub use title::{APP_TITLE, window_title};

pub use automaton_project::{DOCUMENT_FILTER, DocumentFilter, FxDefinitions, ProjectError};
pub use automaton_relay::{EventReceiver, HubEvent, RelayError, RelayHub, SessionId};
pub use automaton_transport::Message;
