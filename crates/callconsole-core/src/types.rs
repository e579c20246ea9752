// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data model shared across the console: calls, sessions, and fleet statistics.

use std::fmt;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumString};

/// Globally unique, immutable identifier of a call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(pub String);

impl CallId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CallId {
    fn from(value: &str) -> Self {
        CallId(value.to_string())
    }
}

impl From<String> for CallId {
    fn from(value: String) -> Self {
        CallId(value)
    }
}

/// Lifecycle status of a call.
///
/// Ordered so that `Assigned < Completed`; a status only ever moves up.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CallStatus {
    Assigned,
    Completed,
}

impl CallStatus {
    /// Combines the current status with an incoming one without ever reverting.
    pub fn advance(self, incoming: CallStatus) -> CallStatus {
        self.max(incoming)
    }

    pub fn is_completed(self) -> bool {
        self == CallStatus::Completed
    }
}

/// A customer contact routed to a specific agent.
///
/// Unknown wire fields (`id`, `notes`, `created_at`, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub call_id: CallId,
    pub customer_number: String,
    pub timestamp: DateTime<Utc>,
    pub assigned_agent_id: String,
    pub status: CallStatus,
}

impl Call {
    /// Returns true when `other` describes the same call identity.
    pub fn same_identity(&self, other: &Call) -> bool {
        self.call_id == other.call_id
            && self.customer_number == other.customer_number
            && self.timestamp == other.timestamp
            && self.assigned_agent_id == other.assigned_agent_id
    }
}

/// Opaque bearer credential issued by the identity service.
///
/// `Debug` is redacted; the raw value is only reachable through [`Credential::expose`].
#[derive(Clone)]
pub struct Credential(SecretString);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Credential(SecretString::from(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for Credential {}

impl Serialize for Credential {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Credential::new)
    }
}

/// Role of the authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Agent,
    Admin,
}

/// Identity of a logged-in agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIdentity {
    pub id: String,
    pub name: String,
    pub token: Credential,
}

/// Identity of a logged-in administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    pub username: String,
    pub token: Credential,
}

/// The single authenticated session, persisted as
/// `{"type": "agent"|"admin", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Session {
    Agent(AgentIdentity),
    Admin(AdminIdentity),
}

impl Session {
    pub fn role(&self) -> Role {
        match self {
            Session::Agent(_) => Role::Agent,
            Session::Admin(_) => Role::Admin,
        }
    }

    /// Agent id or admin username.
    pub fn principal(&self) -> &str {
        match self {
            Session::Agent(agent) => &agent.id,
            Session::Admin(admin) => &admin.username,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Session::Agent(agent) => &agent.name,
            Session::Admin(admin) => &admin.username,
        }
    }

    pub fn credential(&self) -> &Credential {
        match self {
            Session::Agent(agent) => &agent.token,
            Session::Admin(admin) => &admin.token,
        }
    }
}

/// Per-agent call counters as reported by `GET /agents/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStats {
    pub agent_id: String,
    pub agent_name: String,
    pub status: String,
    pub total_calls: u64,
    pub completed_calls: u64,
}

impl AgentStats {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

/// Fleet-wide aggregate derived from the current agent list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStats {
    pub total_agents: usize,
    pub active_agents: usize,
    pub total_calls: u64,
    pub pending_calls: u64,
}

impl SystemStats {
    /// Aggregates over `agents`; always equal to a fresh recomputation.
    pub fn from_agents(agents: &[AgentStats]) -> Self {
        let total_calls: u64 = agents.iter().map(|a| a.total_calls).sum();
        let completed_calls: u64 = agents.iter().map(|a| a.completed_calls).sum();
        SystemStats {
            total_agents: agents.len(),
            active_agents: agents.iter().filter(|a| a.is_active()).count(),
            total_calls,
            pending_calls: total_calls.saturating_sub(completed_calls),
        }
    }
}
