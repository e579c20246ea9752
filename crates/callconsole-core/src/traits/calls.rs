// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call endpoints used by the agent console.

use async_trait::async_trait;

use crate::error::ConsoleError;
use crate::types::{Call, CallId};

/// Remote source of truth for the calls assigned to the session's agent.
#[async_trait]
pub trait CallApi: Send + Sync + 'static {
    /// Fetches the authoritative call set (`GET /calls`).
    async fn fetch_calls(&self) -> Result<Vec<Call>, ConsoleError>;

    /// Marks a call completed on the server (`POST /calls/{id}/complete`).
    async fn complete_call(&self, call_id: &CallId, notes: &str) -> Result<(), ConsoleError>;
}
