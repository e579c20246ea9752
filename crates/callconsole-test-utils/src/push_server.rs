// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A local WebSocket server imitating the assigned-calls push endpoint.
//!
//! Frames passed to [`PushServer::send_text`] are broadcast to every open
//! connection. Each accepted connection is greeted with a `connected` frame,
//! and the `token` query parameter of its handshake is recorded.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;
use url::Url;

use callconsole_core::Call;

use crate::fixtures::new_call_frame;

#[derive(Debug, Clone)]
enum Outbound {
    Text(String),
    Close,
}

#[derive(Default)]
struct Counters {
    accepted: AtomicUsize,
    open: AtomicUsize,
    tokens: Mutex<Vec<String>>,
}

pub struct PushServer {
    addr: SocketAddr,
    outbound: broadcast::Sender<Outbound>,
    counters: Arc<Counters>,
    accept_task: JoinHandle<()>,
}

impl PushServer {
    /// Binds to an ephemeral localhost port and starts accepting.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (outbound, _) = broadcast::channel(64);
        let counters = Arc::new(Counters::default());

        let accept_task = tokio::spawn(accept_loop(listener, outbound.clone(), counters.clone()));

        Ok(Self {
            addr,
            outbound,
            counters,
            accept_task,
        })
    }

    /// `ws://127.0.0.1:<port>/ws/assigned`
    pub fn url(&self) -> Url {
        let raw = format!("ws://{}/ws/assigned", self.addr);
        Url::parse(&raw).unwrap_or_else(|e| panic!("invalid push server url {raw}: {e}"))
    }

    pub fn send_text(&self, text: impl Into<String>) {
        let _ = self.outbound.send(Outbound::Text(text.into()));
    }

    pub fn send_new_call(&self, call: &Call) {
        self.send_text(new_call_frame(call));
    }

    /// Sends a close frame on every open connection.
    pub fn close_all(&self) {
        let _ = self.outbound.send(Outbound::Close);
    }

    /// Handshakes completed since start.
    pub fn connection_count(&self) -> usize {
        self.counters.accepted.load(Ordering::SeqCst)
    }

    /// Connections currently open.
    pub fn open_connections(&self) -> usize {
        self.counters.open.load(Ordering::SeqCst)
    }

    /// Tokens presented in the handshake query, one per connection.
    pub fn tokens(&self) -> Vec<String> {
        self.counters
            .tokens
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    /// Waits until at least `n` handshakes have completed.
    pub async fn wait_for_connections(&self, n: usize, timeout: Duration) -> bool {
        self.wait_until(timeout, || self.connection_count() >= n).await
    }

    /// Waits until no connection is open.
    pub async fn wait_for_disconnect(&self, timeout: Duration) -> bool {
        self.wait_until(timeout, || self.open_connections() == 0).await
    }

    async fn wait_until(&self, timeout: Duration, done: impl Fn() -> bool) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if done() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        done()
    }
}

impl Drop for PushServer {
    fn drop(&mut self) {
        self.accept_task.abort();
        self.close_all();
    }
}

async fn accept_loop(
    listener: TcpListener,
    outbound: broadcast::Sender<Outbound>,
    counters: Arc<Counters>,
) {
    while let Ok((stream, peer)) = listener.accept().await {
        // Subscribe before the handshake so frames sent right after a
        // connection is counted are not missed.
        let frames = outbound.subscribe();
        tokio::spawn(serve_connection(stream, peer, frames, counters.clone()));
    }
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    mut frames: broadcast::Receiver<Outbound>,
    counters: Arc<Counters>,
) {
    let mut token = None;
    let capture_token = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        token = req.uri().query().and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == "token")
                .map(|(_, value)| value.into_owned())
        });
        Ok(resp)
    };
    let handshake = tokio_tungstenite::accept_hdr_async(stream, capture_token).await;

    let mut socket = match handshake {
        Ok(socket) => socket,
        Err(e) => {
            debug!(%peer, error = %e, "push handshake failed");
            return;
        }
    };

    if let Ok(mut tokens) = counters.tokens.lock() {
        tokens.push(token.unwrap_or_default());
    }
    counters.open.fetch_add(1, Ordering::SeqCst);
    counters.accepted.fetch_add(1, Ordering::SeqCst);

    let greeting = serde_json::json!({
        "type": "connected",
        "message": "Connected to assigned calls stream"
    });
    let _ = socket.send(Message::text(greeting.to_string())).await;

    loop {
        tokio::select! {
            frame = frames.recv() => match frame {
                Ok(Outbound::Text(text)) => {
                    if socket.send(Message::text(text)).await.is_err() {
                        break;
                    }
                }
                Ok(Outbound::Close) | Err(broadcast::error::RecvError::Closed) => {
                    let _ = socket.close(None).await;
                    break;
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {}
            },
            incoming = socket.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    counters.open.fetch_sub(1, Ordering::SeqCst);
}
