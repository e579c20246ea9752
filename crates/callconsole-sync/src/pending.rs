// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracking of local completions the server has not yet confirmed.

use std::collections::BTreeMap;

use callconsole_core::CallId;
use tracing::debug;

use crate::repository::CallRepository;

/// Where an unconfirmed completion stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckState {
    /// The completion request has been sent and not answered.
    InFlight,
    /// The request failed; eligible for a retry.
    Failed,
}

/// Completions applied locally but not yet acknowledged.
///
/// A tag is removed when the server acknowledges the request, when a
/// snapshot already reports the call completed, or when a snapshot no longer
/// contains the call.
#[derive(Debug, Clone, Default)]
pub struct PendingAcks {
    entries: BTreeMap<CallId, AckState>,
}

impl PendingAcks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags `call_id` as in flight. Returns `false` if a request for it is
    /// already in flight.
    pub fn begin(&mut self, call_id: &CallId) -> bool {
        match self.entries.get(call_id) {
            Some(AckState::InFlight) => false,
            _ => {
                self.entries.insert(call_id.clone(), AckState::InFlight);
                true
            }
        }
    }

    pub fn acknowledge(&mut self, call_id: &CallId) {
        self.entries.remove(call_id);
    }

    /// Marks an in-flight request as failed. Ignored if the tag was already
    /// resolved by a snapshot.
    pub fn fail(&mut self, call_id: &CallId) {
        if let Some(state) = self.entries.get_mut(call_id) {
            *state = AckState::Failed;
        }
    }

    pub fn state(&self, call_id: &CallId) -> Option<AckState> {
        self.entries.get(call_id).copied()
    }

    /// Failed completions, in id order.
    pub fn failed(&self) -> Vec<CallId> {
        self.entries
            .iter()
            .filter(|(_, state)| **state == AckState::Failed)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// All unconfirmed completions, in id order.
    pub fn unconfirmed(&self) -> Vec<CallId> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-applies unconfirmed completions on top of a freshly replaced
    /// repository and drops the tags the snapshot settles.
    pub fn reconcile(&mut self, repo: &mut CallRepository) {
        self.entries.retain(|call_id, _| match repo.get(call_id) {
            None => {
                debug!(call_id = %call_id, "unconfirmed call left the snapshot");
                false
            }
            Some(call) if call.status.is_completed() => {
                debug!(call_id = %call_id, "completion confirmed by snapshot");
                false
            }
            Some(_) => {
                repo.mark_completed(call_id);
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callconsole_core::CallStatus;
    use callconsole_test_utils::fixtures::{call, completed_call};

    fn id(s: &str) -> CallId {
        CallId::from(s)
    }

    #[test]
    fn begin_rejects_duplicate_in_flight() {
        let mut acks = PendingAcks::new();
        assert!(acks.begin(&id("c1")));
        assert!(!acks.begin(&id("c1")));
        acks.fail(&id("c1"));
        assert!(acks.begin(&id("c1")), "a failed request may be retried");
    }

    #[test]
    fn fail_after_resolution_is_ignored() {
        let mut acks = PendingAcks::new();
        acks.begin(&id("c1"));
        acks.acknowledge(&id("c1"));
        acks.fail(&id("c1"));
        assert!(acks.is_empty());
    }

    #[test]
    fn reconcile_reapplies_and_settles() {
        let mut repo = CallRepository::new();
        let mut acks = PendingAcks::new();
        for c in ["c1", "c2", "c3"] {
            acks.begin(&id(c));
            acks.fail(&id(c));
        }

        // c1 still assigned on the server, c2 confirmed, c3 gone.
        repo.replace_all(vec![call("c1"), completed_call("c2"), call("c4")]);
        acks.reconcile(&mut repo);

        assert_eq!(acks.unconfirmed(), vec![id("c1")]);
        assert_eq!(acks.failed(), vec![id("c1")]);
        assert_eq!(repo.get(&id("c1")).unwrap().status, CallStatus::Completed);
        assert_eq!(repo.get(&id("c4")).unwrap().status, CallStatus::Assigned);
    }
}
