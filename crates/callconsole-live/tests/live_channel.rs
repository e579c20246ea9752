// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live channel behavior against a local push server.

use std::time::Duration;

use callconsole_core::{CallId, Credential};
use callconsole_live::{ChannelState, LiveChannel, LiveChannelConfig, LiveEvent, LiveEvents};
use callconsole_test_utils::fixtures::call;
use callconsole_test_utils::PushServer;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

const WAIT: Duration = Duration::from_secs(5);

fn config(server: &PushServer, delay: Duration) -> LiveChannelConfig {
    LiveChannelConfig::new(server.url()).with_reconnect_delay(delay)
}

/// Next event that is not a status change.
async fn next_call(events: &mut LiveEvents) -> Option<CallId> {
    loop {
        match timeout(WAIT, events.recv()).await.ok()?? {
            LiveEvent::CallArrived(call) => return Some(call.call_id),
            LiveEvent::Status(_) => continue,
        }
    }
}

async fn wait_for_state(channel: &LiveChannel, wanted: ChannelState) -> bool {
    let mut states = channel.subscribe_state();
    timeout(WAIT, states.wait_for(|s| *s == wanted)).await.is_ok()
}

#[tokio::test]
async fn connects_with_token_and_forwards_new_calls() {
    let server = PushServer::start().await.unwrap();
    let (channel, mut events) = LiveChannel::spawn(
        config(&server, Duration::from_secs(5)),
        Credential::new("tok en/1"),
        CancellationToken::new(),
    );

    assert!(server.wait_for_connections(1, WAIT).await);
    assert!(wait_for_state(&channel, ChannelState::Connected).await);
    assert_eq!(server.tokens(), vec!["tok en/1".to_string()]);

    server.send_new_call(&call("c2"));
    assert_eq!(next_call(&mut events).await, Some(CallId::from("c2")));

    channel.shutdown().await;
}

#[tokio::test]
async fn status_events_report_connection() {
    let server = PushServer::start().await.unwrap();
    let (channel, mut events) = LiveChannel::spawn(
        config(&server, Duration::from_secs(5)),
        Credential::new("t"),
        CancellationToken::new(),
    );

    let first = timeout(WAIT, events.recv()).await.unwrap();
    assert_eq!(first, Some(LiveEvent::Status(ChannelState::Connecting)));
    let second = timeout(WAIT, events.recv()).await.unwrap();
    assert_eq!(second, Some(LiveEvent::Status(ChannelState::Connected)));

    channel.shutdown().await;
}

#[tokio::test]
async fn malformed_frames_are_dropped_and_connection_survives() {
    let server = PushServer::start().await.unwrap();
    let (channel, mut events) = LiveChannel::spawn(
        config(&server, Duration::from_secs(5)),
        Credential::new("t"),
        CancellationToken::new(),
    );
    assert!(server.wait_for_connections(1, WAIT).await);

    server.send_text("not json");
    server.send_text(r#"{"type":"new_call","data":{"call_id":"broken"}}"#);
    server.send_text(r#"{"type":"agent_status","data":{}}"#);
    server.send_new_call(&call("c3"));

    assert_eq!(next_call(&mut events).await, Some(CallId::from("c3")));
    assert_eq!(channel.state(), ChannelState::Connected);
    assert_eq!(server.connection_count(), 1);

    channel.shutdown().await;
}

#[tokio::test]
async fn reconnects_after_fixed_delay() {
    let server = PushServer::start().await.unwrap();
    let (channel, _events) = LiveChannel::spawn(
        config(&server, Duration::from_millis(400)),
        Credential::new("t"),
        CancellationToken::new(),
    );
    assert!(server.wait_for_connections(1, WAIT).await);

    server.close_all();
    assert!(wait_for_state(&channel, ChannelState::Disconnected).await);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.connection_count(), 1, "reconnected before the delay");

    assert!(server.wait_for_connections(2, WAIT).await);
    assert!(wait_for_state(&channel, ChannelState::Connected).await);

    channel.shutdown().await;
}

#[tokio::test]
async fn close_during_delay_prevents_reconnect() {
    let server = PushServer::start().await.unwrap();
    let (channel, mut events) = LiveChannel::spawn(
        config(&server, Duration::from_millis(300)),
        Credential::new("t"),
        CancellationToken::new(),
    );
    assert!(server.wait_for_connections(1, WAIT).await);

    server.close_all();
    assert!(wait_for_state(&channel, ChannelState::Disconnected).await);
    channel.close();
    assert!(wait_for_state(&channel, ChannelState::Closed).await);

    assert_eq!(timeout(WAIT, events.recv()).await.unwrap(), None);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(server.connection_count(), 1);
    assert_eq!(channel.state(), ChannelState::Closed);
}

#[tokio::test]
async fn no_calls_delivered_after_close() {
    let server = PushServer::start().await.unwrap();
    let (channel, mut events) = LiveChannel::spawn(
        config(&server, Duration::from_secs(5)),
        Credential::new("t"),
        CancellationToken::new(),
    );
    assert!(server.wait_for_connections(1, WAIT).await);
    assert!(wait_for_state(&channel, ChannelState::Connected).await);

    // Let both calls land in the event buffer unread.
    server.send_new_call(&call("late1"));
    server.send_new_call(&call("late2"));
    tokio::time::sleep(Duration::from_millis(300)).await;

    channel.close();
    assert!(wait_for_state(&channel, ChannelState::Closed).await);

    let mut delivered = Vec::new();
    while let Ok(Some(event)) = timeout(Duration::from_millis(200), events.recv()).await {
        delivered.push(event);
    }
    assert!(delivered.is_empty(), "delivered after close: {delivered:?}");
    assert!(server.wait_for_disconnect(WAIT).await);
}

#[tokio::test]
async fn cancelling_parent_token_closes_connection() {
    let server = PushServer::start().await.unwrap();
    let session = CancellationToken::new();
    let (channel, _events) = LiveChannel::spawn(
        config(&server, Duration::from_secs(5)),
        Credential::new("t"),
        session.child_token(),
    );
    assert!(server.wait_for_connections(1, WAIT).await);

    session.cancel();
    assert!(wait_for_state(&channel, ChannelState::Closed).await);
    assert!(server.wait_for_disconnect(WAIT).await);
}

#[tokio::test]
async fn gives_up_after_max_attempts() {
    // Reserve a port, then free it so connections are refused.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = url::Url::parse(&format!("ws://{addr}/ws/assigned")).unwrap();
    let config = LiveChannelConfig::new(url)
        .with_reconnect_delay(Duration::from_millis(20))
        .with_max_reconnect_attempts(Some(2));
    let (channel, mut events) =
        LiveChannel::spawn(config, Credential::new("t"), CancellationToken::new());

    let mut seen = Vec::new();
    while let Ok(Some(event)) = timeout(WAIT, events.recv()).await {
        seen.push(event);
    }
    assert_eq!(
        seen,
        vec![
            LiveEvent::Status(ChannelState::Connecting),
            LiveEvent::Status(ChannelState::Disconnected),
            LiveEvent::Status(ChannelState::Connecting),
            LiveEvent::Status(ChannelState::Disconnected),
        ]
    );
    assert_eq!(channel.state(), ChannelState::Disconnected);
}
