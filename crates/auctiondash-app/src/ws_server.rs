// WebSocket server for the dashboard page.
//
// Connection tasks only move messages: every request is forwarded to the
// application loop together with a oneshot reply slot, so refreshes are
// computed one at a time by whoever owns the dashboard.

use std::fmt::Display;
use std::io;
use std::net::SocketAddr;

use async_trait::async_trait;
use auctiondash_core::protocol::ServerMessage;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, info, warn};

/// Events emitted by the WebSocket server to the application loop.
#[derive(Debug)]
pub enum WsEvent {
    /// A page connected and needs its initial snapshot.
    Connected {
        addr: String,
        reply: oneshot::Sender<ServerMessage>,
    },
    /// A text message arrived (raw JSON).
    Message {
        addr: String,
        text: String,
        reply: oneshot::Sender<ServerMessage>,
    },
    /// The page went away.
    Disconnected { addr: String },
}

/// Source of raw byte streams to run the WebSocket handshake over.
#[async_trait]
pub trait Listener: Send {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Wait for the next connection; returns the stream and a peer label.
    async fn accept(&mut self) -> io::Result<(Self::Stream, String)>;
}

/// TCP listener used in production.
pub struct TungsteniteListener {
    inner: TcpListener,
}

impl TungsteniteListener {
    pub async fn bind(addr: SocketAddr) -> io::Result<Self> {
        let inner = TcpListener::bind(addr).await?;
        Ok(Self { inner })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }
}

#[async_trait]
impl Listener for TungsteniteListener {
    type Stream = TcpStream;

    async fn accept(&mut self) -> io::Result<(TcpStream, String)> {
        let (stream, addr) = self.inner.accept().await?;
        Ok((stream, addr.to_string()))
    }
}

/// Accept connections forever, serving each on its own task.
///
/// Returns when the listener fails or the application loop has shut down.
pub async fn run<L: Listener>(mut listener: L, tx: mpsc::Sender<WsEvent>) -> anyhow::Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        if tx.is_closed() {
            info!("Application loop closed, WebSocket server stopping");
            break;
        }
        info!("Accepted connection from {addr}");

        let tx = tx.clone();
        tokio::spawn(async move {
            let ws_stream = match tokio_tungstenite::accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    warn!("WebSocket handshake failed for {addr}: {e}");
                    return;
                }
            };
            let (mut write, read) = ws_stream.split();
            if serve_connection(read, &mut write, &tx, &addr).await.is_err() {
                debug!("Application loop gone while serving {addr}");
            }
        });
    }

    Ok(())
}

/// Serve one connection: send the snapshot, then answer every text message.
///
/// Returns `Err(())` if the application loop is gone (channel closed or a
/// reply dropped), signalling the caller to stop. Generic over the stream
/// and sink so it can be driven without sockets.
pub async fn serve_connection<St, Si>(
    mut read: St,
    write: &mut Si,
    tx: &mpsc::Sender<WsEvent>,
    addr: &str,
) -> Result<(), ()>
where
    St: Stream<Item = Result<Message, WsError>> + Unpin,
    Si: Sink<Message> + Unpin,
    Si::Error: Display,
{
    let (reply, rx) = oneshot::channel();
    tx.send(WsEvent::Connected {
        addr: addr.to_string(),
        reply,
    })
    .await
    .map_err(|_| ())?;
    let snapshot = rx.await.map_err(|_| ())?;

    if send_message(write, &snapshot, addr).await {
        while let Some(msg_result) = read.next().await {
            match msg_result {
                Ok(Message::Text(text)) => {
                    let (reply, rx) = oneshot::channel();
                    tx.send(WsEvent::Message {
                        addr: addr.to_string(),
                        text: text.to_string(),
                        reply,
                    })
                    .await
                    .map_err(|_| ())?;
                    let response = rx.await.map_err(|_| ())?;
                    if !send_message(write, &response, addr).await {
                        break;
                    }
                }
                Ok(Message::Close(_)) => {
                    info!("Client {addr} sent close frame");
                    break;
                }
                Err(e) => {
                    warn!("WebSocket error from {addr}: {e}");
                    break;
                }
                _ => {
                    // Ignore Binary, Ping, Pong, Frame variants.
                }
            }
        }
    }

    tx.send(WsEvent::Disconnected {
        addr: addr.to_string(),
    })
    .await
    .map_err(|_| ())
}

/// Serialize and send one message. Returns false when the connection is
/// no longer writable.
async fn send_message<Si>(write: &mut Si, msg: &ServerMessage, addr: &str) -> bool
where
    Si: Sink<Message> + Unpin,
    Si::Error: Display,
{
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize message for {addr}: {e}");
            return true;
        }
    };
    match write.send(Message::Text(json.into())).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to write to {addr}: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use std::convert::Infallible;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Sink that records every frame written to it.
    #[derive(Default)]
    struct RecordingSink(Vec<Message>);

    impl Sink<Message> for RecordingSink {
        type Error = Infallible;

        fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Infallible>> {
            Poll::Ready(Ok(()))
        }

        fn start_send(mut self: Pin<&mut Self>, item: Message) -> Result<(), Infallible> {
            self.0.push(item);
            Ok(())
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Infallible>> {
            Poll::Ready(Ok(()))
        }

        fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Infallible>> {
            Poll::Ready(Ok(()))
        }
    }

    fn mock_stream(
        messages: Vec<Result<Message, WsError>>,
    ) -> impl Stream<Item = Result<Message, WsError>> + Unpin {
        stream::iter(messages)
    }

    fn error_reply(message: &str) -> ServerMessage {
        ServerMessage::Error {
            timestamp: 0,
            message: message.to_string(),
        }
    }

    /// Answer every request with an ERROR echoing the request text, and
    /// record which events arrived.
    fn spawn_echo_app(mut rx: mpsc::Receiver<WsEvent>) -> tokio::task::JoinHandle<Vec<String>> {
        tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(event) = rx.recv().await {
                match event {
                    WsEvent::Connected { reply, .. } => {
                        seen.push("connected".to_string());
                        let _ = reply.send(error_reply("snapshot"));
                    }
                    WsEvent::Message { text, reply, .. } => {
                        seen.push(format!("message:{text}"));
                        let _ = reply.send(error_reply(&text));
                    }
                    WsEvent::Disconnected { .. } => {
                        seen.push("disconnected".to_string());
                    }
                }
            }
            seen
        })
    }

    fn sent_texts(sink: &[Message]) -> Vec<serde_json::Value> {
        sink.iter()
            .map(|m| match m {
                Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
                other => panic!("unexpected frame {other:?}"),
            })
            .collect()
    }

    #[tokio::test]
    async fn snapshot_then_one_reply_per_message() {
        let (tx, rx) = mpsc::channel(16);
        let app = spawn_echo_app(rx);
        let mut sink = RecordingSink::default();

        let messages = vec![
            Ok(Message::Text("first".into())),
            Ok(Message::Text("second".into())),
        ];
        serve_connection(mock_stream(messages), &mut sink, &tx, "test")
            .await
            .unwrap();
        drop(tx);

        let sent = sent_texts(&sink.0);
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0]["message"], "snapshot");
        assert_eq!(sent[1]["message"], "first");
        assert_eq!(sent[2]["message"], "second");

        assert_eq!(
            app.await.unwrap(),
            vec!["connected", "message:first", "message:second", "disconnected"]
        );
    }

    #[tokio::test]
    async fn close_frame_stops_processing() {
        let (tx, rx) = mpsc::channel(16);
        let app = spawn_echo_app(rx);
        let mut sink = RecordingSink::default();

        let messages = vec![
            Ok(Message::Text("before_close".into())),
            Ok(Message::Close(None)),
            Ok(Message::Text("after_close".into())),
        ];
        serve_connection(mock_stream(messages), &mut sink, &tx, "test")
            .await
            .unwrap();
        drop(tx);

        assert_eq!(sent_texts(&sink.0).len(), 2);
        assert_eq!(
            app.await.unwrap(),
            vec!["connected", "message:before_close", "disconnected"]
        );
    }

    #[tokio::test]
    async fn error_stops_processing() {
        let (tx, rx) = mpsc::channel(16);
        let app = spawn_echo_app(rx);
        let mut sink = RecordingSink::default();

        let messages = vec![
            Err(WsError::ConnectionClosed),
            Ok(Message::Text("after_error".into())),
        ];
        serve_connection(mock_stream(messages), &mut sink, &tx, "test")
            .await
            .unwrap();
        drop(tx);

        assert_eq!(sent_texts(&sink.0).len(), 1);
        assert_eq!(app.await.unwrap(), vec!["connected", "disconnected"]);
    }

    #[tokio::test]
    async fn binary_and_ping_messages_are_ignored() {
        let (tx, rx) = mpsc::channel(16);
        let app = spawn_echo_app(rx);
        let mut sink = RecordingSink::default();

        let messages = vec![
            Ok(Message::Binary(vec![1, 2, 3].into())),
            Ok(Message::Ping(vec![].into())),
            Ok(Message::Pong(vec![].into())),
            Ok(Message::Text("after_ignored".into())),
        ];
        serve_connection(mock_stream(messages), &mut sink, &tx, "test")
            .await
            .unwrap();
        drop(tx);

        assert_eq!(sent_texts(&sink.0).len(), 2);
        assert_eq!(
            app.await.unwrap(),
            vec!["connected", "message:after_ignored", "disconnected"]
        );
    }

    #[tokio::test]
    async fn returns_err_when_app_loop_gone() {
        let (tx, rx) = mpsc::channel(16);
        drop(rx);
        let mut sink = RecordingSink::default();

        let messages = vec![Ok(Message::Text("orphan".into()))];
        let result = serve_connection(mock_stream(messages), &mut sink, &tx, "test").await;
        assert!(result.is_err());
        assert!(sink.0.is_empty());
    }

    #[tokio::test]
    async fn returns_err_when_reply_dropped() {
        let (tx, mut rx) = mpsc::channel::<WsEvent>(16);
        tokio::spawn(async move {
            // Drop every reply slot without answering.
            while rx.recv().await.is_some() {}
        });
        let mut sink = RecordingSink::default();

        let result = serve_connection(mock_stream(vec![]), &mut sink, &tx, "test").await;
        assert!(result.is_err());
    }
}
