// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Grouping of calls for display.

use callconsole_core::Call;
use serde::Serialize;

/// Calls split by status, each group in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CallView {
    pub pending: Vec<Call>,
    pub completed: Vec<Call>,
}

/// Header counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
}

/// Partitions `calls` into pending and completed.
pub fn derive_view(calls: &[Call]) -> CallView {
    let (completed, pending): (Vec<Call>, Vec<Call>) = calls
        .iter()
        .cloned()
        .partition(|call| call.status.is_completed());
    CallView { pending, completed }
}

impl CallView {
    pub fn totals(&self) -> Totals {
        Totals {
            total: self.pending.len() + self.completed.len(),
            pending: self.pending.len(),
            completed: self.completed.len(),
        }
    }
}
