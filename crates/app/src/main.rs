mod app_menus;
mod commands;
mod config;
mod dialogs;
mod dto;
mod editor;
mod keybindings;
mod state;

use anyhow::Context;
use app_menus::app_menus;
use config::Config;
use dialogs::NativeDialogs;
use dto::Event;
use state::AppState;
use std::io::BufRead;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the editor protocol.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config_path = Config::config_path();
    let config = Config::load(config_path.as_deref());
    let (state, events, hub_events) = AppState::new(Arc::new(NativeDialogs), config, config_path);
    let state = Arc::new(state);

    let writer = tokio::spawn(editor::write_events(
        events,
        tokio::io::stdout(),
        state.exit_token(),
    ));
    tokio::spawn(Arc::clone(&state.shell).pump(hub_events));

    state.editor.send(Event::Menus { menus: app_menus() });
    if state.autostart() {
        state.shell.open_listener(state.relay_port()).await;
    }

    commands::serve(Arc::clone(&state), read_stdin_lines()).await;

    tracing::info!("shutting down");
    state.shutdown().await;
    writer
        .await
        .context("event writer panicked")?
        .context("failed to write to the editor")?;
    Ok(())
}

/// Read stdin on a plain thread; a pending tokio stdin read would hold up
/// runtime shutdown.
fn read_stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!(%err, "failed to read from stdin");
                    break;
                }
            }
        }
    });
    rx
}
