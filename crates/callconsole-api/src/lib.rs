// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST adapter for the call-center server.
//!
//! [`ApiClient`] implements [`CallApi`] for agent sessions and [`AdminApi`]
//! for administrator sessions.

pub mod client;
pub mod types;

use async_trait::async_trait;
use callconsole_core::{AdminApi, AgentStats, Call, CallApi, CallId, ConsoleError};
use reqwest::Method;
use tracing::info;

pub use crate::client::ApiClient;
use crate::client::segment_path;
use crate::types::{CompleteCallRequest, CreateAgentRequest};

#[async_trait]
impl CallApi for ApiClient {
    async fn fetch_calls(&self) -> Result<Vec<Call>, ConsoleError> {
        let calls: Option<Vec<Call>> = self
            .request::<(), _>(Method::GET, "/calls", None, true)
            .await?;
        Ok(calls.unwrap_or_default())
    }

    async fn complete_call(&self, call_id: &CallId, notes: &str) -> Result<(), ConsoleError> {
        let body = CompleteCallRequest {
            status: "completed",
            notes,
        };
        let path = segment_path(&["calls", call_id.as_str(), "complete"])?;
        self.request::<_, serde_json::Value>(Method::POST, &path, Some(&body), true)
            .await?;
        info!(call_id = %call_id, "completion acknowledged by server");
        Ok(())
    }
}

#[async_trait]
impl AdminApi for ApiClient {
    async fn agent_stats(&self) -> Result<Vec<AgentStats>, ConsoleError> {
        let stats: Option<Vec<AgentStats>> = self
            .request::<(), _>(Method::GET, "/agents/stats", None, true)
            .await?;
        Ok(stats.unwrap_or_default())
    }

    async fn create_agent(&self, agent_name: &str, password: &str) -> Result<(), ConsoleError> {
        let body = CreateAgentRequest {
            agent_name,
            password,
        };
        self.request::<_, serde_json::Value>(Method::POST, "/agents", Some(&body), true)
            .await?;
        info!(agent_name, "agent created");
        Ok(())
    }

    async fn delete_agent(&self, agent_id: &str) -> Result<(), ConsoleError> {
        let path = segment_path(&["agents", agent_id])?;
        self.request::<(), serde_json::Value>(Method::DELETE, &path, None, true)
            .await?;
        info!(agent_id, "agent deleted");
        Ok(())
    }
}
