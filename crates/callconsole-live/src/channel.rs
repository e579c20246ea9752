// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The reconnecting push connection.
//!
//! One background task owns the WebSocket. It walks
//! `Disconnected -> Connecting -> Connected -> Disconnected`, sleeping a fixed
//! delay between attempts, until the owner cancels it; only then does the
//! state become `Closed`.

use std::time::Duration;

use callconsole_config::{LiveConfig, ServerConfig};
use callconsole_core::{Call, ConsoleError, Credential};
use futures::StreamExt;
use strum::Display;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::protocol::{self, PushMessage};

/// Connection state of the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Connected,
    /// Torn down by its owner. Terminal.
    Closed,
}

impl ChannelState {
    pub fn is_connected(self) -> bool {
        self == ChannelState::Connected
    }
}

/// Events delivered to the consumer of the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveEvent {
    Status(ChannelState),
    CallArrived(Call),
}

/// Settings for one live channel.
#[derive(Debug, Clone)]
pub struct LiveChannelConfig {
    /// Push endpoint without the token parameter.
    pub url: Url,
    pub reconnect_delay: Duration,
    /// Consecutive failed connection attempts before giving up.
    pub max_reconnect_attempts: Option<u32>,
    pub event_buffer: usize,
}

impl LiveChannelConfig {
    pub fn new(url: Url) -> Self {
        let defaults = LiveConfig::default();
        Self {
            url,
            reconnect_delay: defaults.reconnect_delay(),
            max_reconnect_attempts: defaults.max_reconnect_attempts,
            event_buffer: defaults.event_buffer,
        }
    }

    pub fn from_config(server: &ServerConfig, live: &LiveConfig) -> Result<Self, ConsoleError> {
        let url = Url::parse(&server.ws_url).map_err(|e| {
            ConsoleError::Config(format!("server.ws_url `{}` is invalid: {e}", server.ws_url))
        })?;
        Ok(Self {
            url,
            reconnect_delay: live.reconnect_delay(),
            max_reconnect_attempts: live.max_reconnect_attempts,
            event_buffer: live.event_buffer.max(1),
        })
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: Option<u32>) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// The URL actually dialed, with the credential as `token` query parameter.
    pub(crate) fn endpoint(&self, credential: &Credential) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("token", credential.expose());
        url
    }
}

/// Handle to a running push channel.
///
/// Dropping the handle tears the channel down.
#[derive(Debug)]
pub struct LiveChannel {
    cancel: CancellationToken,
    state: watch::Receiver<ChannelState>,
    task: Option<JoinHandle<()>>,
}

impl LiveChannel {
    /// Starts the channel task and returns the handle plus the event stream.
    ///
    /// `cancel` tears the channel down when cancelled; pass a child of the
    /// session token so ending the session closes the connection.
    pub fn spawn(
        config: LiveChannelConfig,
        credential: Credential,
        cancel: CancellationToken,
    ) -> (Self, LiveEvents) {
        let (events_tx, events_rx) = mpsc::channel(config.event_buffer.max(1));
        let (state_tx, state_rx) = watch::channel(ChannelState::Disconnected);

        let worker = Worker {
            config,
            credential,
            events: events_tx,
            state: state_tx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(worker.run());

        (
            Self {
                cancel: cancel.clone(),
                state: state_rx,
                task: Some(task),
            },
            LiveEvents::new(events_rx, cancel),
        )
    }

    pub fn state(&self) -> ChannelState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ChannelState> {
        self.state.clone()
    }

    /// Cancels any pending reconnect and closes the connection.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Closes the channel and waits for the task to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!(error = %e, "live channel task failed");
            }
        }
    }
}

impl Drop for LiveChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Receiving half of a live channel.
///
/// Yields nothing once the channel's token is cancelled, even if events
/// are still buffered.
#[derive(Debug)]
pub struct LiveEvents {
    rx: mpsc::Receiver<LiveEvent>,
    cancel: CancellationToken,
}

impl LiveEvents {
    pub fn new(rx: mpsc::Receiver<LiveEvent>, cancel: CancellationToken) -> Self {
        Self { rx, cancel }
    }

    /// Next event, or `None` once the channel is closed or its task is gone.
    pub async fn recv(&mut self) -> Option<LiveEvent> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            event = self.rx.recv() => event,
        }
    }
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Why a connected session ended.
enum Ended {
    Dropped,
    Cancelled,
    ConsumerGone,
}

struct Worker {
    config: LiveChannelConfig,
    credential: Credential,
    events: mpsc::Sender<LiveEvent>,
    state: watch::Sender<ChannelState>,
    cancel: CancellationToken,
}

impl Worker {
    async fn run(self) {
        let endpoint = self.config.endpoint(&self.credential);
        let mut failures: u32 = 0;

        loop {
            if !self.publish(ChannelState::Connecting).await {
                break;
            }
            debug!(url = %self.config.url, "connecting live channel");

            let attempt = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                result = connect_async(endpoint.as_str()) => result,
            };

            match attempt {
                Ok((socket, _response)) => {
                    failures = 0;
                    if !self.publish(ChannelState::Connected).await {
                        break;
                    }
                    info!(url = %self.config.url, "live channel connected");

                    match self.pump(socket).await {
                        Ended::Dropped => info!("live channel disconnected"),
                        Ended::Cancelled | Ended::ConsumerGone => break,
                    }
                }
                Err(e) => {
                    failures += 1;
                    warn!(error = %e, attempt = failures, "live channel connection failed");
                }
            }

            if !self.publish(ChannelState::Disconnected).await {
                break;
            }

            if let Some(max) = self.config.max_reconnect_attempts {
                if failures >= max {
                    error!(attempts = failures, "giving up on live channel");
                    return;
                }
            }

            debug!(delay_ms = self.config.reconnect_delay.as_millis() as u64, "reconnect scheduled");
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.reconnect_delay) => {}
            }
        }

        self.state.send_replace(ChannelState::Closed);
        debug!("live channel closed");
    }

    /// Reads frames until the connection drops or the channel is cancelled.
    async fn pump(&self, mut socket: Socket) -> Ended {
        loop {
            let frame = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return close_socket(socket).await,
                frame = socket.next() => frame,
            };

            match frame {
                Some(Ok(Message::Text(text))) => match protocol::decode(text.as_str()) {
                    Ok(PushMessage::NewCall(call)) => {
                        debug!(call_id = %call.call_id, "call pushed");
                        match self.deliver(LiveEvent::CallArrived(call)).await {
                            Some(true) => {}
                            Some(false) => return Ended::ConsumerGone,
                            None => return close_socket(socket).await,
                        }
                    }
                    Ok(PushMessage::Connected(message)) => {
                        info!(message = message.as_deref().unwrap_or(""), "server greeting");
                    }
                    Ok(PushMessage::Other(kind)) => {
                        debug!(kind = kind.as_str(), "ignoring push frame");
                    }
                    Err(e) => warn!(error = %e, "dropping malformed push frame"),
                },
                Some(Ok(Message::Close(_))) | None => return Ended::Dropped,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "live channel read failed");
                    return Ended::Dropped;
                }
            }
        }
    }

    /// Records the new state and forwards it as an event if it changed.
    ///
    /// Returns `false` once nobody is listening or the channel is cancelled.
    async fn publish(&self, state: ChannelState) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        let previous = self.state.send_replace(state);
        if previous == state {
            return true;
        }
        self.deliver(LiveEvent::Status(state)).await == Some(true)
    }

    /// Sends one event unless the channel is cancelled first.
    ///
    /// `None` means cancelled, `Some(false)` means the consumer is gone.
    async fn deliver(&self, event: LiveEvent) -> Option<bool> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            sent = self.events.send(event) => Some(sent.is_ok()),
        }
    }
}

async fn close_socket(mut socket: Socket) -> Ended {
    if let Err(e) = socket.close(None).await {
        debug!(error = %e, "close handshake failed");
    }
    Ended::Cancelled
}
