// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for test records.

use chrono::{DateTime, Duration, TimeZone, Utc};

use callconsole_core::{AgentStats, Call, CallId, CallStatus};

/// Agent id used by the fixtures.
pub const AGENT_ID: &str = "100200";

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// An assigned call whose timestamp is derived from its numeric suffix.
pub fn call(id: &str) -> Call {
    let minutes: i64 = id
        .trim_start_matches(|c: char| !c.is_ascii_digit())
        .parse()
        .unwrap_or(0);
    Call {
        call_id: CallId::from(id),
        customer_number: format!("+1555010{minutes:04}"),
        timestamp: base_time() + Duration::minutes(minutes),
        assigned_agent_id: AGENT_ID.to_string(),
        status: CallStatus::Assigned,
    }
}

pub fn completed_call(id: &str) -> Call {
    Call {
        status: CallStatus::Completed,
        ..call(id)
    }
}

/// The push frame the server sends for a new assignment.
pub fn new_call_frame(call: &Call) -> String {
    serde_json::json!({ "type": "new_call", "data": call }).to_string()
}

pub fn agent(id: &str, status: &str, total: u64, completed: u64) -> AgentStats {
    AgentStats {
        agent_id: id.to_string(),
        agent_name: format!("Agent {id}"),
        status: status.to_string(),
        total_calls: total,
        completed_calls: completed,
    }
}
