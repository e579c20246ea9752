// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Administrator commands: `stats`, `create-agent`, `delete-agent`.

use std::io::IsTerminal;
use std::sync::Arc;

use callconsole_api::ApiClient;
use callconsole_config::ConsoleConfig;
use callconsole_core::{AgentStats, ConsoleError, SystemStats};
use callconsole_session::SessionStore;
use callconsole_sync::{FleetMonitor, FleetSnapshot};
use colored::Colorize;
use secrecy::ExposeSecret;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::auth;
use crate::render::render_fleet;

/// Structured output for `stats --json`.
#[derive(Debug, Serialize)]
pub struct StatsReport<'a> {
    pub stats: &'a SystemStats,
    pub agents: &'a [AgentStats],
}

fn report_json(snapshot: &FleetSnapshot) -> String {
    let report = StatsReport {
        stats: &snapshot.stats,
        agents: &snapshot.agents,
    };
    serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
}

fn monitor(config: &ConsoleConfig) -> Result<FleetMonitor, ConsoleError> {
    let store = SessionStore::from_config(&config.session);
    let admin = auth::require_admin(&store)?;
    let api = ApiClient::new(&config.server)?.with_credential(admin.token);
    Ok(FleetMonitor::new(Arc::new(api)))
}

/// Prints fleet statistics once, or keeps refreshing with `watch`.
pub async fn run_stats(
    config: &ConsoleConfig,
    watch: bool,
    json: bool,
    plain: bool,
    cancel: CancellationToken,
) -> Result<(), ConsoleError> {
    let fleet = monitor(config)?;
    let use_color = !plain && std::io::stdout().is_terminal();
    let print = |snapshot: &FleetSnapshot| {
        if json {
            println!("{}", report_json(snapshot));
        } else {
            println!("{}", render_fleet(snapshot, use_color));
        }
    };

    if !watch {
        fleet.refresh().await?;
        print(&fleet.snapshot());
        return Ok(());
    }

    let mut updates = fleet.subscribe();
    let printer = async {
        while updates.changed().await.is_ok() {
            print(&*updates.borrow_and_update());
        }
    };
    tokio::select! {
        _ = fleet.run(config.admin.refresh_interval(), cancel) => {}
        _ = printer => {}
    }
    Ok(())
}

pub async fn run_create_agent(config: &ConsoleConfig, name: &str) -> Result<(), ConsoleError> {
    let fleet = monitor(config)?;
    let password = auth::prompt_password("Password for the new agent: ")?;
    fleet.create_agent(name, password.expose_secret()).await?;
    println!(
        "{} {name} ({} agents total)",
        "created agent".green(),
        fleet.snapshot().stats.total_agents
    );
    Ok(())
}

pub async fn run_delete_agent(config: &ConsoleConfig, agent_id: &str) -> Result<(), ConsoleError> {
    let fleet = monitor(config)?;
    fleet.delete_agent(agent_id).await?;
    println!("{} {agent_id}", "deleted agent".green());
    Ok(())
}
