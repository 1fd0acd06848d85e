//! WebSocket transport carrying NNTP text.
//!
//! Outbound commands go through an unbounded channel to a writer task that
//! owns the socket sink. A reader task hands every inbound text message to
//! [`NntpClient::on_message`] and reports the end of the stream through
//! [`NntpClient::on_disconnect`]; the writer does the same when a send
//! fails.

use std::sync::{Arc, Weak};

use futures::stream::SplitStream;
use futures::{Sink, SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::client::NntpClient;
use crate::error::NntpError;
use crate::model::NewsServer;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Outbound half of a duplex, message-framed connection.
///
/// `send` is synchronous so the client can transmit and queue a command in
/// one critical section.
pub trait Transport: Send + Sync + 'static {
    fn send(&self, text: String) -> Result<(), NntpError>;
}

#[derive(Debug)]
enum Outbound {
    Text(String),
    Close,
}

#[derive(Debug, Clone)]
pub struct WsTransport {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl WsTransport {
    /// Ask the writer task to send a close frame and stop.
    pub fn close(&self) {
        let _ = self.tx.send(Outbound::Close);
    }
}

impl Transport for WsTransport {
    fn send(&self, text: String) -> Result<(), NntpError> {
        self.tx
            .send(Outbound::Text(text))
            .map_err(|_| NntpError::ConnectionClosed("websocket writer stopped".into()))
    }
}

impl NntpClient<WsTransport> {
    /// Open a websocket to `server.url` and start the reader and writer tasks.
    pub async fn connect(server: &NewsServer) -> Result<Arc<Self>, NntpError> {
        let connecting = tokio_tungstenite::connect_async(server.url.as_str());
        let (ws_stream, _) = match server.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, connecting)
                .await
                .map_err(|_| NntpError::Timeout)??,
            None => connecting.await?,
        };
        tracing::info!(server = %server.name, url = %server.url, "connected");

        let (sink, stream) = ws_stream.split();
        let (tx, rx) = mpsc::unbounded_channel();
        let client = Arc::new(
            NntpClient::new(WsTransport { tx }).with_command_timeout(server.command_timeout),
        );
        tokio::spawn(writer_loop(sink, rx, Arc::downgrade(&client)));
        tokio::spawn(reader_loop(stream, Arc::downgrade(&client)));
        Ok(client)
    }

    pub fn close(&self) {
        self.transport().close();
    }
}

/// Drain outbound commands into the socket. A failed write fails every
/// queued command.
async fn writer_loop<S>(
    mut sink: S,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    client: Weak<NntpClient<WsTransport>>,
) where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    while let Some(outbound) = rx.recv().await {
        let result = match outbound {
            Outbound::Text(text) => sink.send(Message::Text(text.into())).await,
            Outbound::Close => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
        };
        if let Err(err) = result {
            tracing::warn!(error = %err, "websocket send failed");
            if let Some(client) = client.upgrade() {
                client.on_disconnect(&format!("websocket send failed: {err}"));
            }
            break;
        }
    }
}

async fn reader_loop(mut stream: SplitStream<WsStream>, client: Weak<NntpClient<WsTransport>>) {
    let reason = loop {
        let text = match stream.next().await {
            Some(Ok(Message::Text(text))) => text.as_str().to_owned(),
            Some(Ok(Message::Binary(data))) => String::from_utf8_lossy(&data).into_owned(),
            Some(Ok(Message::Close(_))) => break "server sent close frame".to_string(),
            Some(Ok(_)) => continue,
            Some(Err(err)) => break err.to_string(),
            None => break "stream ended".to_string(),
        };

        let Some(live) = client.upgrade() else {
            return;
        };
        if let Err(err) = live.on_message(&text) {
            tracing::error!(error = %err, "dropping inbound message");
        }
    };

    tracing::info!(%reason, "websocket closed");
    if let Some(client) = client.upgrade() {
        client.on_disconnect(&reason);
    }
}
