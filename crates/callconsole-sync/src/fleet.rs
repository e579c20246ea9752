// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin view of the agent fleet.

use std::sync::Arc;
use std::time::Duration;

use callconsole_core::{AdminApi, AgentStats, ConsoleError, SystemStats};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Latest fleet statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FleetSnapshot {
    pub agents: Vec<AgentStats>,
    /// Always recomputed from `agents`.
    pub stats: SystemStats,
    pub last_error: Option<String>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Fetches agent statistics and provisions agents.
pub struct FleetMonitor {
    api: Arc<dyn AdminApi>,
    snapshot: watch::Sender<FleetSnapshot>,
}

impl FleetMonitor {
    pub fn new(api: Arc<dyn AdminApi>) -> Self {
        let (snapshot, _) = watch::channel(FleetSnapshot::default());
        Self { api, snapshot }
    }

    pub fn snapshot(&self) -> FleetSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FleetSnapshot> {
        self.snapshot.subscribe()
    }

    /// Fetches the agent list. On failure the previous list is kept and the
    /// error recorded as well as returned.
    pub async fn refresh(&self) -> Result<(), ConsoleError> {
        match self.api.agent_stats().await {
            Ok(agents) => {
                let stats = SystemStats::from_agents(&agents);
                debug!(agents = stats.total_agents, pending = stats.pending_calls, "fleet refreshed");
                self.snapshot.send_replace(FleetSnapshot {
                    agents,
                    stats,
                    last_error: None,
                    refreshed_at: Some(Utc::now()),
                });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "fleet refresh failed; keeping previous statistics");
                self.snapshot.send_modify(|snapshot| {
                    snapshot.last_error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }

    /// Provisions an agent and refreshes the list.
    pub async fn create_agent(&self, agent_name: &str, password: &str) -> Result<(), ConsoleError> {
        self.api.create_agent(agent_name, password).await?;
        info!(agent_name, "agent provisioned");
        if let Err(e) = self.refresh().await {
            debug!(error = %e, "fleet list stale after provisioning");
        }
        Ok(())
    }

    /// Removes an agent and refreshes the list.
    pub async fn delete_agent(&self, agent_id: &str) -> Result<(), ConsoleError> {
        self.api.delete_agent(agent_id).await?;
        info!(agent_id, "agent removed");
        if let Err(e) = self.refresh().await {
            debug!(error = %e, "fleet list stale after removal");
        }
        Ok(())
    }

    /// Refreshes immediately and then every `interval` until cancelled.
    pub async fn run(&self, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.refresh().await {
                        debug!(error = %e, "scheduled fleet refresh failed");
                    }
                }
            }
        }
        debug!("fleet monitor stopped");
    }
}
