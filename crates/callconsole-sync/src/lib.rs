// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keeps an agent's call list consistent across snapshot fetches, live
//! pushes, and optimistic completions.
//!
//! The pure merge rules live in [`CallRepository`] and [`CallSync`]; the
//! [`SyncController`] task applies them to events in arrival order, and
//! [`AgentSession`] wires it to a live channel.

pub mod controller;
pub mod fleet;
pub mod pending;
pub mod repository;
pub mod session;
pub mod state;
pub mod view;

pub use controller::{Command, ControllerHandle, SyncController};
pub use fleet::{FleetMonitor, FleetSnapshot};
pub use pending::{AckState, PendingAcks};
pub use repository::{CallRepository, Upsert};
pub use session::AgentSession;
pub use state::{CallSync, CompletionStart, DashboardView};
pub use view::{derive_view, CallView, Totals};
