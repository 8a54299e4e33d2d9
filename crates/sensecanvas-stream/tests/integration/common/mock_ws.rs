//! Mock hardware-sensor WebSocket server for integration tests.
//!
//! Accepts connections and pushes whatever frames the test hands it to
//! every connected client. Can also drop all clients to force a reconnect.

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::{accept_async, tungstenite::Message};

#[derive(Debug, Clone)]
enum ServerFrame {
    Text(String),
    Binary(Vec<u8>),
    Close,
}

/// A mock sensor server for testing.
pub struct MockSensorServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    frames: broadcast::Sender<ServerFrame>,
    connections: Arc<AtomicU32>,
    active: Arc<AtomicU32>,
}

impl MockSensorServer {
    /// Start a new mock server on an available port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (frames, _) = broadcast::channel::<ServerFrame>(64);
        let connections = Arc::new(AtomicU32::new(0));
        let active = Arc::new(AtomicU32::new(0));
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let frames_clone = frames.clone();
        let connections_clone = connections.clone();
        let active_clone = active.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Ok((stream, _)) = listener.accept() => {
                        tokio::spawn(handle_connection(
                            stream,
                            frames_clone.subscribe(),
                            connections_clone.clone(),
                            active_clone.clone(),
                        ));
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx,
            frames,
            connections,
            active,
        }
    }

    /// Get the server's WebSocket URL.
    pub fn url(&self) -> String {
        format!("ws://{}/sensors", self.addr)
    }

    /// Completed handshakes since start.
    pub fn connection_count(&self) -> u32 {
        self.connections.load(Ordering::SeqCst)
    }

    /// Currently open connections.
    pub fn active_connections(&self) -> u32 {
        self.active.load(Ordering::SeqCst)
    }

    /// Push a text frame to every connected client.
    pub fn send_text(&self, text: impl Into<String>) {
        let _ = self.frames.send(ServerFrame::Text(text.into()));
    }

    /// Push a binary frame to every connected client.
    pub fn send_binary(&self, bytes: impl Into<Vec<u8>>) {
        let _ = self.frames.send(ServerFrame::Binary(bytes.into()));
    }

    /// Close every open connection from the server side.
    pub fn close_all(&self) {
        let _ = self.frames.send(ServerFrame::Close);
    }

    /// Shutdown the server.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

async fn handle_connection(
    stream: TcpStream,
    mut frames: broadcast::Receiver<ServerFrame>,
    connections: Arc<AtomicU32>,
    active: Arc<AtomicU32>,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {}", e);
            return;
        }
    };

    connections.fetch_add(1, Ordering::SeqCst);
    active.fetch_add(1, Ordering::SeqCst);

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            frame = frames.recv() => match frame {
                Ok(ServerFrame::Text(text)) => {
                    if write.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Ok(ServerFrame::Binary(bytes)) => {
                    if write.send(Message::Binary(bytes)).await.is_err() {
                        break;
                    }
                }
                Ok(ServerFrame::Close) | Err(broadcast::error::RecvError::Closed) => {
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {}
            },
            msg = read.next() => match msg {
                Some(Ok(Message::Ping(data))) => {
                    let _ = write.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                _ => {}
            },
        }
    }

    active.fetch_sub(1, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_starts() {
        let server = MockSensorServer::start().await;
        assert!(server.url().starts_with("ws://127.0.0.1:"));
        server.shutdown().await;
    }
}
