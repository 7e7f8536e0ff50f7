use crate::{SessionId, Shared};
use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;

/// Drive one accepted connection from handshake to disconnect.
pub(crate) async fn run(
    shared: Arc<Shared>,
    stream: TcpStream,
    peer: SocketAddr,
    shutdown: CancellationToken,
) {
    let socket = tokio::select! {
        _ = shutdown.cancelled() => return,
        handshake = tokio_tungstenite::accept_async(stream) => match handshake {
            Ok(socket) => socket,
            Err(err) => {
                tracing::debug!(%peer, %err, "websocket handshake failed");
                return;
            }
        },
    };

    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let Some(session) = shared.register(&shutdown, peer, outbound_tx) else {
        return;
    };

    if let Err(err) = pump(&shared, session, socket, outbound_rx, &shutdown).await {
        tracing::debug!(%session, "session ended: {err:#}");
    }

    shared.unregister(session);
}

async fn pump(
    shared: &Shared,
    session: SessionId,
    socket: WebSocketStream<TcpStream>,
    mut outbound: mpsc::UnboundedReceiver<Arc<str>>,
    shutdown: &CancellationToken,
) -> anyhow::Result<()> {
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                let _ = sink.send(WsMessage::Close(None)).await;
                return Ok(());
            }
            Some(text) = outbound.recv() => {
                sink.send(WsMessage::Text(text.to_string()))
                    .await
                    .context("failed to send to peer")?;
            }
            incoming = stream.next() => match incoming {
                Some(Ok(WsMessage::Text(text))) => shared.forward(session, &text),
                Some(Ok(WsMessage::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                    Ok(text) => shared.forward(session, text),
                    Err(_) => tracing::debug!(%session, "ignoring non-UTF-8 binary frame"),
                },
                Some(Ok(WsMessage::Close(_))) | None => return Ok(()),
                // Ping/pong replies are handled by tungstenite itself.
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err).context("failed to read from peer"),
            },
        }
    }
}
