// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring of one agent session: live channel plus controller under a
//! shared cancellation token.

use std::sync::Arc;

use callconsole_core::{CallApi, Credential};
use callconsole_live::{ChannelState, LiveChannel, LiveChannelConfig};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::controller::{ControllerHandle, SyncController};

/// A running agent session. Ending it closes the live connection, cancels
/// any pending reconnect, and stops the controller.
pub struct AgentSession {
    controller: ControllerHandle,
    live: LiveChannel,
    cancel: CancellationToken,
}

impl AgentSession {
    /// Opens the live channel and starts the controller, which immediately
    /// fetches a snapshot. Cancelling `parent` ends the session.
    pub fn start(
        api: Arc<dyn CallApi>,
        live_config: LiveChannelConfig,
        credential: Credential,
        notes: impl Into<String>,
        parent: &CancellationToken,
    ) -> Self {
        let cancel = parent.child_token();
        let (live, events) = LiveChannel::spawn(live_config, credential, cancel.child_token());
        let controller = SyncController::spawn(api, events, notes, cancel.child_token());
        info!("agent session started");

        Self {
            controller,
            live,
            cancel,
        }
    }

    pub fn controller(&self) -> &ControllerHandle {
        &self.controller
    }

    pub fn connection(&self) -> ChannelState {
        self.live.state()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Tears the session down and waits for both tasks.
    pub async fn end(self) {
        self.cancel.cancel();
        self.controller.shutdown().await;
        self.live.shutdown().await;
        info!("agent session ended");
    }
}
