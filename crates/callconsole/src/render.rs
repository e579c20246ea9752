// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text rendering of the agent dashboard and the fleet view.

use std::fmt::Write;

use callconsole_core::Call;
use callconsole_live::ChannelState;
use callconsole_sync::{DashboardView, FleetSnapshot};
use colored::{ColoredString, Colorize};

fn paint(text: &str, use_color: bool, style: impl Fn(&str) -> ColoredString) -> String {
    if use_color {
        style(text).to_string()
    } else {
        text.to_string()
    }
}

fn connection_badge(state: ChannelState, use_color: bool) -> String {
    let label = format!("[{state}]");
    match state {
        ChannelState::Connected => paint(&label, use_color, |s| s.green()),
        ChannelState::Connecting => paint(&label, use_color, |s| s.yellow()),
        ChannelState::Disconnected | ChannelState::Closed => paint(&label, use_color, |s| s.red()),
    }
}

fn call_line(call: &Call) -> String {
    format!(
        "{:<12} {:<16} {}",
        call.call_id.as_str(),
        call.customer_number,
        call.timestamp.format("%Y-%m-%d %H:%M UTC")
    )
}

/// Renders the agent dashboard.
pub fn render_dashboard(view: &DashboardView, use_color: bool) -> String {
    let totals = view.calls.totals();
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {} {}",
        paint("assigned calls", use_color, |s| s.bold()),
        connection_badge(view.connection, use_color)
    );
    let _ = writeln!(out, "  {}", "-".repeat(48));
    let _ = writeln!(
        out,
        "    total {}  pending {}  completed {}",
        totals.total, totals.pending, totals.completed
    );
    if view.loading {
        let _ = writeln!(out, "    {}", paint("loading...", use_color, |s| s.dimmed()));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "  {}", paint("Pending", use_color, |s| s.yellow()));
    if view.calls.pending.is_empty() {
        let _ = writeln!(out, "    (none)");
    }
    for call in &view.calls.pending {
        let _ = writeln!(out, "    {}", call_line(call));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "  {}", paint("Completed", use_color, |s| s.green()));
    if view.calls.completed.is_empty() {
        let _ = writeln!(out, "    (none)");
    }
    for call in &view.calls.completed {
        let line = call_line(call);
        if view.unconfirmed.contains(&call.call_id) {
            let _ = writeln!(out, "    {line} {}", paint("(unconfirmed)", use_color, |s| s.yellow()));
        } else {
            let _ = writeln!(out, "    {line}");
        }
    }

    if let Some(error) = &view.last_error {
        let _ = writeln!(out);
        let _ = writeln!(out, "  {} {error}", paint("!", use_color, |s| s.red()));
    }
    out
}

/// Renders fleet statistics and the agent table.
pub fn render_fleet(snapshot: &FleetSnapshot, use_color: bool) -> String {
    let stats = &snapshot.stats;
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(out, "  {}", paint("fleet", use_color, |s| s.bold()));
    let _ = writeln!(out, "  {}", "-".repeat(48));
    let _ = writeln!(
        out,
        "    agents {} ({} active)  calls {}  pending {}",
        stats.total_agents, stats.active_agents, stats.total_calls, stats.pending_calls
    );
    if let Some(at) = snapshot.refreshed_at {
        let _ = writeln!(
            out,
            "    {}",
            paint(&format!("updated {}", at.format("%H:%M:%S UTC")), use_color, |s| s.dimmed())
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "    {:<8} {:<20} {:<9} {:>6} {:>9}",
        "ID", "NAME", "STATUS", "CALLS", "COMPLETED"
    );
    for agent in &snapshot.agents {
        let status = format!("{:<9}", agent.status);
        let status = if agent.is_active() {
            paint(&status, use_color, |s| s.green())
        } else {
            paint(&status, use_color, |s| s.dimmed())
        };
        let _ = writeln!(
            out,
            "    {:<8} {:<20} {} {:>6} {:>9}",
            agent.agent_id, agent.agent_name, status, agent.total_calls, agent.completed_calls
        );
    }

    if let Some(error) = &snapshot.last_error {
        let _ = writeln!(out);
        let _ = writeln!(out, "  {} {error}", paint("!", use_color, |s| s.red()));
    }
    out
}
