//! The editor and window as seen from the shell: every call becomes an event
//! line on stdout.

use crate::dto::Event;
use automaton_core::{Editor, Toast, Window};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub type EventSender = mpsc::UnboundedSender<Event>;
pub type EventStream = mpsc::UnboundedReceiver<Event>;

#[derive(Debug, Clone)]
pub struct IpcEditor {
    events: EventSender,
}

impl IpcEditor {
    pub fn new(events: EventSender) -> Self {
        Self { events }
    }

    pub fn send(&self, event: Event) {
        if self.events.send(event).is_err() {
            tracing::debug!("editor output closed, event dropped");
        }
    }
}

impl Editor for IpcEditor {
    fn reset(&self) {
        self.send(Event::Reset);
    }

    fn update(&self, time: f64) {
        self.send(Event::Update { time });
    }

    fn claim_channel(&self, name: &str) {
        self.send(Event::Auto {
            name: name.to_string(),
        });
    }

    fn toast(&self, toast: Toast) {
        self.send(Event::Toast(toast));
    }
}

impl Window for IpcEditor {
    fn set_title(&self, title: &str) {
        self.send(Event::Title {
            title: title.to_string(),
        });
    }
}

/// Write events as JSON lines until every sender is gone or `exit` fires.
///
/// Events already queued when `exit` fires are still written.
pub async fn write_events<W>(
    mut events: EventStream,
    mut out: W,
    exit: CancellationToken,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        let event = tokio::select! {
            biased;
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
            _ = exit.cancelled() => match events.try_recv() {
                Ok(event) => event,
                Err(_) => break,
            },
        };

        let mut line = match serde_json::to_string(&event) {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(%err, "failed to encode event");
                continue;
            }
        };
        line.push('\n');
        out.write_all(line.as_bytes()).await?;
        out.flush().await?;
    }
    Ok(())
}
