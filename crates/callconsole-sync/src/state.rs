// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The merge rules for snapshot, push, and optimistic completion.
//!
//! [`CallSync`] is synchronous: each method is one discrete mutation. The
//! controller task feeds it events in arrival order and issues whatever
//! remote work the methods ask for.

use callconsole_core::{Call, CallId, ConsoleError};
use callconsole_live::ChannelState;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::pending::PendingAcks;
use crate::repository::CallRepository;
use crate::view::{derive_view, CallView};

/// Everything a front-end needs to draw the agent dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub calls: CallView,
    #[serde(serialize_with = "serialize_state")]
    pub connection: ChannelState,
    /// Completed locally, not yet confirmed by the server.
    pub unconfirmed: Vec<CallId>,
    /// Most recent recoverable error, cleared by the next good snapshot.
    pub last_error: Option<String>,
    /// A snapshot fetch is outstanding.
    pub loading: bool,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self {
            calls: CallView::default(),
            connection: ChannelState::Disconnected,
            unconfirmed: Vec::new(),
            last_error: None,
            loading: false,
        }
    }
}

fn serialize_state<S: serde::Serializer>(state: &ChannelState, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(state)
}

/// What to do after [`CallSync::begin_completion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStart {
    /// Applied locally; send the request.
    Send,
    /// A request for this call is already in flight.
    AlreadyInFlight,
    /// The call is already completed and confirmed.
    AlreadyCompleted,
    /// The call is not in the repository; nothing changed.
    UnknownCall,
}

#[derive(Debug, Default)]
pub struct CallSync {
    repo: CallRepository,
    pending: PendingAcks,
    connection: Option<ChannelState>,
    last_error: Option<String>,
    loading: bool,
}

impl CallSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repository(&self) -> &CallRepository {
        &self.repo
    }

    pub fn pending(&self) -> &PendingAcks {
        &self.pending
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Applies a snapshot fetch result.
    ///
    /// On success the repository is replaced and unconfirmed completions are
    /// re-applied. On failure existing data is kept and the error surfaced.
    pub fn apply_snapshot(&mut self, result: Result<Vec<Call>, ConsoleError>) {
        self.loading = false;
        match result {
            Ok(calls) => {
                info!(count = calls.len(), "snapshot applied");
                self.repo.replace_all(calls);
                self.pending.reconcile(&mut self.repo);
                self.last_error = None;
            }
            Err(e) => {
                warn!(error = %e, "snapshot fetch failed; keeping current calls");
                self.last_error = Some(format!("Failed to load calls: {e}"));
            }
        }
    }

    /// Applies a pushed call unconditionally.
    pub fn apply_push(&mut self, call: Call) {
        let call_id = call.call_id.clone();
        let outcome = self.repo.upsert(call);
        debug!(call_id = %call_id, ?outcome, "push applied");
    }

    pub fn apply_connection(&mut self, state: ChannelState) {
        self.connection = Some(state);
    }

    /// Marks the call completed locally and tags it unconfirmed.
    pub fn begin_completion(&mut self, call_id: &CallId) -> CompletionStart {
        match self.repo.get(call_id) {
            None => {
                self.last_error = Some(format!("Call {call_id} is not assigned to you"));
                return CompletionStart::UnknownCall;
            }
            Some(call) if call.status.is_completed() && self.pending.state(call_id).is_none() => {
                return CompletionStart::AlreadyCompleted;
            }
            Some(_) => {}
        }
        self.repo.mark_completed(call_id);
        if self.pending.begin(call_id) {
            CompletionStart::Send
        } else {
            CompletionStart::AlreadyInFlight
        }
    }

    /// Records the server's answer to a completion request. A failure is
    /// not rolled back.
    pub fn finish_completion(&mut self, call_id: &CallId, result: Result<(), ConsoleError>) {
        match result {
            Ok(()) => {
                self.pending.acknowledge(call_id);
                info!(call_id = %call_id, "completion confirmed");
            }
            Err(e) => {
                self.pending.fail(call_id);
                warn!(call_id = %call_id, error = %e, "completion request failed; kept locally");
                self.last_error = Some(format!("Failed to complete call {call_id}: {e}"));
            }
        }
    }

    /// Failed completions to send again; each is moved back to in flight.
    pub fn take_retries(&mut self) -> Vec<CallId> {
        let failed = self.pending.failed();
        for call_id in &failed {
            self.pending.begin(call_id);
        }
        failed
    }

    pub fn view(&self) -> DashboardView {
        DashboardView {
            calls: derive_view(&self.repo.snapshot_view()),
            connection: self.connection.unwrap_or(ChannelState::Disconnected),
            unconfirmed: self.pending.unconfirmed(),
            last_error: self.last_error.clone(),
            loading: self.loading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callconsole_test_utils::fixtures::{call, completed_call};

    fn down() -> ConsoleError {
        ConsoleError::Api {
            status: 503,
            message: "unavailable".into(),
        }
    }

    fn id(s: &str) -> CallId {
        CallId::from(s)
    }

    #[test]
    fn push_after_snapshot_is_listed_first() {
        let mut sync = CallSync::new();
        sync.apply_snapshot(Ok(vec![call("c1")]));
        sync.apply_push(call("c2"));

        let view = sync.view();
        assert_eq!(view.calls.pending, vec![call("c2"), call("c1")]);
        assert!(view.calls.completed.is_empty());
    }

    #[test]
    fn failed_completion_is_not_rolled_back() {
        let mut sync = CallSync::new();
        sync.apply_snapshot(Ok(vec![call("c1")]));

        assert_eq!(sync.begin_completion(&id("c1")), CompletionStart::Send);
        assert_eq!(sync.view().calls.completed, vec![completed_call("c1")]);

        sync.finish_completion(&id("c1"), Err(down()));
        let view = sync.view();
        assert_eq!(view.calls.completed, vec![completed_call("c1")]);
        assert_eq!(view.unconfirmed, vec![id("c1")]);
        assert!(view.last_error.unwrap().contains("c1"));
    }

    #[test]
    fn failed_refresh_keeps_data() {
        let mut sync = CallSync::new();
        sync.apply_snapshot(Ok(vec![call("c2"), call("c1")]));
        sync.set_loading(true);
        sync.apply_snapshot(Err(down()));

        let view = sync.view();
        assert_eq!(view.calls.pending.len(), 2);
        assert!(!view.loading);
        assert!(view.last_error.is_some());
    }

    #[test]
    fn snapshot_does_not_undo_unconfirmed_completion() {
        let mut sync = CallSync::new();
        sync.apply_snapshot(Ok(vec![call("c1")]));
        sync.begin_completion(&id("c1"));

        // Server has not processed the completion yet.
        sync.apply_snapshot(Ok(vec![call("c1")]));
        assert_eq!(sync.view().calls.completed, vec![completed_call("c1")]);
        assert_eq!(sync.view().unconfirmed, vec![id("c1")]);

        // Server caught up.
        sync.apply_snapshot(Ok(vec![completed_call("c1")]));
        assert!(sync.view().unconfirmed.is_empty());

        // A late failure for a settled completion changes nothing.
        sync.finish_completion(&id("c1"), Err(down()));
        assert!(sync.view().unconfirmed.is_empty());
    }

    #[test]
    fn retries_cover_failed_only() {
        let mut sync = CallSync::new();
        sync.apply_snapshot(Ok(vec![call("c1"), call("c2")]));
        sync.begin_completion(&id("c1"));
        sync.begin_completion(&id("c2"));
        sync.finish_completion(&id("c1"), Err(down()));

        assert_eq!(sync.take_retries(), vec![id("c1")]);
        assert!(sync.take_retries().is_empty(), "retried calls are in flight again");
        assert_eq!(sync.begin_completion(&id("c2")), CompletionStart::AlreadyInFlight);
    }

    #[test]
    fn confirmed_completion_is_not_resent() {
        let mut sync = CallSync::new();
        sync.apply_snapshot(Ok(vec![completed_call("c1"), call("c2")]));
        assert_eq!(sync.begin_completion(&id("c1")), CompletionStart::AlreadyCompleted);

        sync.begin_completion(&id("c2"));
        sync.finish_completion(&id("c2"), Err(down()));
        assert_eq!(sync.begin_completion(&id("c2")), CompletionStart::Send);
    }

    #[test]
    fn completing_unknown_call_changes_nothing() {
        let mut sync = CallSync::new();
        sync.apply_snapshot(Ok(vec![call("c1")]));
        assert_eq!(sync.begin_completion(&id("zz")), CompletionStart::UnknownCall);
        let view = sync.view();
        assert_eq!(view.calls.pending, vec![call("c1")]);
        assert!(view.unconfirmed.is_empty());
    }

    #[test]
    #[tracing_test::traced_test]
    fn failed_completion_is_logged() {
        let mut sync = CallSync::new();
        sync.apply_snapshot(Ok(vec![call("c9")]));
        sync.begin_completion(&id("c9"));
        sync.finish_completion(&id("c9"), Err(down()));
        assert!(logs_contain("completion request failed; kept locally"));
    }

    #[test]
    fn view_serializes_connection_as_text() {
        let mut sync = CallSync::new();
        sync.apply_connection(ChannelState::Connected);
        let json = serde_json::to_value(sync.view()).unwrap();
        assert_eq!(json["connection"], "connected");
    }
}
