//! Request handlers.
//!
//! Requests that only touch in-memory state run in place, in the order they
//! arrive. The rest may wait on a dialog, so each gets its own task and never
//! holds up dirty notifications or playback events behind it.

use crate::app_menus::{MenuAction, MenuCommand};
use crate::dto::{Command, Event, Request};
use crate::keybindings;
use crate::state::AppState;
use automaton_core::{CloseDecision, EditorEvent, Outcome};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Read request lines until the input ends or the app exits.
pub async fn serve(state: Arc<AppState>, mut lines: mpsc::UnboundedReceiver<String>) {
    let exit = state.exit_token();
    loop {
        let line = tokio::select! {
            _ = exit.cancelled() => break,
            line = lines.recv() => match line {
                Some(line) => line,
                None => break,
            },
        };
        if line.trim().is_empty() {
            continue;
        }

        let request = match serde_json::from_str::<Request>(&line) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(%err, "ignoring malformed request");
                continue;
            }
        };

        if let Some(request) = handle_immediate(&state, request) {
            let state = Arc::clone(&state);
            tokio::spawn(async move { dispatch(&state, request).await });
        }
    }
}

/// Run `request` now if it cannot wait on the user, otherwise hand it back.
pub fn handle_immediate(state: &AppState, request: Request) -> Option<Request> {
    let Request { id, command } = request;
    let shell = &state.shell;

    match command {
        Command::NotifyDirtyChanged { dirty } => {
            shell.on_editor_event(EditorEvent::DirtyChanged(dirty))
        }
        Command::Play => shell.on_editor_event(EditorEvent::Play),
        Command::Pause => shell.on_editor_event(EditorEvent::Pause),
        Command::Seek { time } => shell.on_editor_event(EditorEvent::Seek { time }),
        Command::Menu { command } => match command.action() {
            MenuAction::Forward(name) => state.editor.send(Event::Menu { command: name }),
            _ => return Some(Request { id, command: Command::Menu { command } }),
        },
        Command::Accelerator { keys } => match keybindings::lookup(&keys) {
            Some(command) => match command.action() {
                MenuAction::Forward(name) => state.editor.send(Event::Menu { command: name }),
                _ => return Some(Request { id, command: Command::Menu { command } }),
            },
            None => tracing::debug!(%keys, "no binding"),
        },
        command => return Some(Request { id, command }),
    }
    None
}

pub async fn dispatch(state: &AppState, request: Request) {
    let Some(Request { id, command }) = handle_immediate(state, request) else {
        return;
    };
    let shell = &state.shell;

    match command {
        Command::NewDocument => {
            let outcome = shell.new_document().await;
            state.editor.send(Event::reply(id, outcome));
        }
        Command::OpenDocument => match shell.open_document().await {
            Ok(text) => state.editor.send(Event::reply_with(
                id,
                Outcome::Completed,
                serde_json::Value::String(text),
            )),
            Err(outcome) => state.editor.send(Event::reply(id, outcome)),
        },
        Command::SaveDocument { data } => {
            let outcome = shell.save_document(&data).await;
            state.editor.send(Event::reply(id, outcome));
        }
        Command::SaveDocumentAs { data } => {
            let outcome = shell.save_document_as(&data).await;
            state.editor.send(Event::reply(id, outcome));
        }
        Command::RequestCloseWindow => close_window(state, id).await,
        Command::OpenListener { port } => {
            let outcome = shell.open_listener(port.unwrap_or_else(|| state.relay_port())).await;
            if outcome.is_completed() {
                if let Some(addr) = shell.relay().local_addr().await {
                    state.remember_port(addr.port()).await;
                }
            }
            state.editor.send(Event::reply(id, outcome));
        }
        Command::CloseListener => {
            let outcome = shell.close_listener().await;
            state.editor.send(Event::reply(id, outcome));
        }
        Command::ReportError { message } => shell.report_error(&message).await,
        Command::LoadFxDefinitions => {
            let reply = match shell.load_fx_definitions().await {
                Ok(definitions) => match serde_json::to_value(&definitions) {
                    Ok(data) => Event::reply_with(id, Outcome::Completed, data),
                    Err(err) => {
                        tracing::warn!(%err, "fx definitions are not representable as JSON");
                        Event::reply(id, Outcome::Failed)
                    }
                },
                Err(outcome) => Event::reply(id, outcome),
            };
            state.editor.send(reply);
        }
        Command::Menu { command } => run_menu(state, id, command).await,
        // Already handled in place.
        Command::NotifyDirtyChanged { .. }
        | Command::Play
        | Command::Pause
        | Command::Seek { .. }
        | Command::Accelerator { .. } => {}
    }
}

async fn run_menu(state: &AppState, id: Option<u64>, command: MenuCommand) {
    tracing::debug!(?command, "menu");
    match command.action() {
        MenuAction::Forward(name) => state.editor.send(Event::Menu { command: name }),
        MenuAction::CloseWindow => close_window(state, id).await,
        MenuAction::CloseListener => {
            let outcome = state.shell.close_listener().await;
            state.editor.send(Event::reply(id, outcome));
        }
    }
}

async fn close_window(state: &AppState, id: Option<u64>) {
    let decision = state.shell.request_close_window().await;
    state.editor.send(Event::reply(id, decision));
    if decision == CloseDecision::Allow {
        state.shutdown().await;
    }
}
