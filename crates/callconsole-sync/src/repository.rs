// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory set of the agent's calls, keyed by `call_id`.
//!
//! Every entry carries an arrival sequence number so the view can list the
//! most recently known call first. A snapshot is taken to arrive in server
//! order with its first element newest; a push is newer than everything
//! already held.

use std::collections::HashMap;

use callconsole_core::{Call, CallId, CallStatus};
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    call: Call,
    seq: u64,
}

/// Result of an [`CallRepository::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    /// Known call; only the status was merged.
    Merged,
}

#[derive(Debug, Clone, Default)]
pub struct CallRepository {
    entries: HashMap<CallId, Entry>,
    next_seq: u64,
}

impl CallRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole set with `calls`.
    ///
    /// Repeated ids collapse onto the first occurrence, which keeps its
    /// position and identity fields; their statuses are merged.
    pub fn replace_all(&mut self, calls: Vec<Call>) {
        let mut unique: Vec<Call> = Vec::with_capacity(calls.len());
        let mut index: HashMap<CallId, usize> = HashMap::with_capacity(calls.len());

        for call in calls {
            match index.get(&call.call_id) {
                Some(&at) => {
                    debug!(call_id = %call.call_id, "duplicate call in snapshot");
                    let held = &mut unique[at];
                    held.status = held.status.advance(call.status);
                }
                None => {
                    index.insert(call.call_id.clone(), unique.len());
                    unique.push(call);
                }
            }
        }

        let count = unique.len() as u64;
        let base = self.next_seq;
        self.next_seq += count;
        self.entries = unique
            .into_iter()
            .enumerate()
            .map(|(position, call)| {
                let seq = base + count - 1 - position as u64;
                (call.call_id.clone(), Entry { call, seq })
            })
            .collect();
    }

    /// Inserts an unseen call as the newest entry, or merges the status of a
    /// known one. Identity fields of a known call never change and a
    /// completed call never returns to assigned.
    pub fn upsert(&mut self, call: Call) -> Upsert {
        if let Some(entry) = self.entries.get_mut(&call.call_id) {
            if !entry.call.same_identity(&call) {
                debug!(call_id = %call.call_id, "ignoring changed identity fields");
            }
            entry.call.status = entry.call.status.advance(call.status);
            return Upsert::Merged;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries
            .insert(call.call_id.clone(), Entry { call, seq });
        Upsert::Inserted
    }

    /// Sets the call to completed. Returns `false` if the call is unknown.
    pub fn mark_completed(&mut self, call_id: &CallId) -> bool {
        match self.entries.get_mut(call_id) {
            Some(entry) => {
                entry.call.status = entry.call.status.advance(CallStatus::Completed);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, call_id: &CallId) -> Option<&Call> {
        self.entries.get(call_id).map(|entry| &entry.call)
    }

    pub fn contains(&self, call_id: &CallId) -> bool {
        self.entries.contains_key(call_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All calls, most recently known first.
    pub fn snapshot_view(&self) -> Vec<Call> {
        let mut entries: Vec<&Entry> = self.entries.values().collect();
        entries.sort_by(|a, b| b.seq.cmp(&a.seq));
        entries.into_iter().map(|entry| entry.call.clone()).collect()
    }
}
