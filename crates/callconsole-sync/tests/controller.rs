// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Controller behavior with a mock REST server and hand-fed live events.

use std::sync::Arc;
use std::time::Duration;

use callconsole_core::CallId;
use callconsole_live::{ChannelState, LiveEvent, LiveEvents};
use callconsole_sync::{ControllerHandle, DashboardView, SyncController};
use callconsole_test_utils::fixtures::{call, completed_call};
use callconsole_test_utils::MockCallApi;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

const WAIT: Duration = Duration::from_secs(5);
const NOTES: &str = "Call completed via dashboard";

fn start(api: &MockCallApi) -> (ControllerHandle, mpsc::Sender<LiveEvent>) {
    let (live_tx, live_rx) = mpsc::channel(16);
    let handle = SyncController::spawn(
        Arc::new(api.clone()),
        LiveEvents::new(live_rx, CancellationToken::new()),
        NOTES,
        CancellationToken::new(),
    );
    (handle, live_tx)
}

async fn wait_view(handle: &ControllerHandle, pred: impl FnMut(&DashboardView) -> bool) -> DashboardView {
    let mut view = handle.view();
    let result = timeout(WAIT, view.wait_for(pred)).await;
    match result {
        Ok(Ok(view)) => view.clone(),
        _ => panic!("view never matched; last: {:?}", handle.current()),
    }
}

async fn wait_fetches(api: &MockCallApi, n: usize) {
    let deadline = tokio::time::Instant::now() + WAIT;
    while api.fetch_count() < n {
        assert!(tokio::time::Instant::now() < deadline, "expected {n} fetches");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

fn id(s: &str) -> CallId {
    CallId::from(s)
}

#[tokio::test]
async fn loads_snapshot_then_applies_push() {
    let api = MockCallApi::with_calls(vec![call("c1")]);
    let (handle, live) = start(&api);

    wait_view(&handle, |v| v.calls.pending == vec![call("c1")] && !v.loading).await;

    live.send(LiveEvent::Status(ChannelState::Connected)).await.unwrap();
    live.send(LiveEvent::CallArrived(call("c2"))).await.unwrap();

    let view = wait_view(&handle, |v| v.calls.pending.len() == 2).await;
    assert_eq!(view.calls.pending, vec![call("c2"), call("c1")]);
    assert!(view.calls.completed.is_empty());
    assert_eq!(view.connection, ChannelState::Connected);

    handle.shutdown().await;
}

#[tokio::test]
async fn failed_completion_stays_completed_and_can_be_retried() {
    let api = MockCallApi::with_calls(vec![call("c1")]);
    api.fail_completions(true);
    let (handle, _live) = start(&api);
    wait_view(&handle, |v| v.calls.pending.len() == 1).await;

    handle.complete(id("c1")).await.unwrap();
    let view = wait_view(&handle, |v| v.last_error.is_some()).await;
    assert_eq!(view.calls.completed, vec![completed_call("c1")]);
    assert!(view.calls.pending.is_empty());
    assert_eq!(view.unconfirmed, vec![id("c1")]);

    api.fail_completions(false);
    handle.retry_unconfirmed().await.unwrap();
    let view = wait_view(&handle, |v| v.unconfirmed.is_empty()).await;
    assert_eq!(view.calls.completed, vec![completed_call("c1")]);

    let sent = api.completions().await;
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|(call_id, notes)| call_id == &id("c1") && notes == NOTES));

    handle.shutdown().await;
}

#[tokio::test]
async fn failed_refresh_keeps_calls_visible() {
    let api = MockCallApi::with_calls(vec![call("c2"), call("c1")]);
    let (handle, _live) = start(&api);
    wait_view(&handle, |v| v.calls.pending.len() == 2 && !v.loading).await;

    api.push_failure("Failed to fetch calls").await;
    handle.refresh().await.unwrap();

    let view = wait_view(&handle, |v| v.last_error.is_some() && !v.loading).await;
    assert_eq!(view.calls.pending, vec![call("c2"), call("c1")]);
    assert!(view.last_error.unwrap().contains("Failed to fetch calls"));

    handle.refresh().await.unwrap();
    wait_view(&handle, |v| v.last_error.is_none()).await;

    handle.shutdown().await;
}

#[tokio::test]
async fn snapshot_during_completion_keeps_local_completion() {
    let api = MockCallApi::with_calls(vec![call("c1")]);
    api.set_completion_delay(Some(Duration::from_millis(300))).await;
    let (handle, _live) = start(&api);
    wait_view(&handle, |v| v.calls.pending.len() == 1).await;

    handle.complete(id("c1")).await.unwrap();
    handle.refresh().await.unwrap();
    wait_fetches(&api, 2).await;

    // The server still reports c1 as assigned.
    let view = wait_view(&handle, |v| !v.loading).await;
    assert_eq!(view.calls.completed, vec![completed_call("c1")]);
    assert_eq!(view.unconfirmed, vec![id("c1")]);

    let view = wait_view(&handle, |v| v.unconfirmed.is_empty()).await;
    assert_eq!(view.calls.completed, vec![completed_call("c1")]);

    handle.shutdown().await;
}

#[tokio::test]
async fn duplicate_completion_sends_one_request() {
    let api = MockCallApi::with_calls(vec![call("c1")]);
    api.set_completion_delay(Some(Duration::from_millis(200))).await;
    let (handle, _live) = start(&api);
    wait_view(&handle, |v| v.calls.pending.len() == 1).await;

    handle.complete(id("c1")).await.unwrap();
    handle.complete(id("c1")).await.unwrap();
    wait_view(&handle, |v| v.calls.completed.len() == 1 && v.unconfirmed.is_empty()).await;

    assert_eq!(api.completions().await.len(), 1);
    handle.shutdown().await;
}

#[tokio::test]
async fn completing_unknown_call_sends_nothing() {
    let api = MockCallApi::with_calls(vec![call("c1")]);
    let (handle, _live) = start(&api);
    wait_view(&handle, |v| v.calls.pending.len() == 1).await;

    handle.complete(id("zz")).await.unwrap();
    let view = wait_view(&handle, |v| v.last_error.is_some()).await;
    assert!(view.last_error.unwrap().contains("zz"));
    assert_eq!(view.calls.pending, vec![call("c1")]);
    assert!(api.completions().await.is_empty());

    handle.shutdown().await;
}

#[tokio::test]
async fn keeps_working_after_live_channel_ends() {
    let api = MockCallApi::with_calls(vec![call("c1")]);
    let (handle, live) = start(&api);
    wait_view(&handle, |v| v.calls.pending.len() == 1).await;

    drop(live);
    api.set_calls(vec![call("c2"), call("c1")]).await;
    handle.refresh().await.unwrap();

    let view = wait_view(&handle, |v| v.calls.pending.len() == 2).await;
    assert_eq!(view.calls.pending, vec![call("c2"), call("c1")]);
    handle.shutdown().await;
}

#[tokio::test]
async fn shutdown_reports_closed() {
    let api = MockCallApi::with_calls(vec![call("c1")]);
    let (handle, _live) = start(&api);
    wait_view(&handle, |v| v.calls.pending.len() == 1).await;

    let view = handle.view();
    handle.shutdown().await;
    assert_eq!(view.borrow().connection, ChannelState::Closed);
    assert_eq!(view.borrow().calls.pending, vec![call("c1")]);
}

#[tokio::test]
async fn commands_fail_once_cancelled() {
    let api = MockCallApi::new();
    let cancel = CancellationToken::new();
    let (_live_tx, live_rx) = mpsc::channel(1);
    let handle = SyncController::spawn(
        Arc::new(api),
        LiveEvents::new(live_rx, CancellationToken::new()),
        NOTES,
        cancel.clone(),
    );

    cancel.cancel();
    let deadline = tokio::time::Instant::now() + WAIT;
    while handle.current().connection != ChannelState::Closed {
        assert!(tokio::time::Instant::now() < deadline, "controller did not stop");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(handle.refresh().await.is_err());
}
