// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Administrative endpoints: fleet statistics and agent provisioning.

use async_trait::async_trait;

use crate::error::ConsoleError;
use crate::types::AgentStats;

/// Remote administration surface available to admin sessions.
#[async_trait]
pub trait AdminApi: Send + Sync + 'static {
    /// Lists every agent with its call counters (`GET /agents/stats`).
    async fn agent_stats(&self) -> Result<Vec<AgentStats>, ConsoleError>;

    /// Provisions a new agent account (`POST /agents`).
    async fn create_agent(&self, agent_name: &str, password: &str) -> Result<(), ConsoleError>;

    /// Deactivates an agent account (`DELETE /agents/{id}`).
    async fn delete_agent(&self, agent_id: &str) -> Result<(), ConsoleError>;
}
