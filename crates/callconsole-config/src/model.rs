// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the callconsole.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a typo in a config key
//! is reported at startup instead of silently falling back to a default.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level console configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConsoleConfig {
    /// REST and push endpoints of the call-center server.
    #[serde(default)]
    pub server: ServerConfig,

    /// Live update channel behavior.
    #[serde(default)]
    pub live: LiveConfig,

    /// Where the authenticated session is persisted.
    #[serde(default)]
    pub session: SessionConfig,

    /// Admin fleet monitor settings.
    #[serde(default)]
    pub admin: AdminConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Call-center server endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Base URL of the REST API, including the `/api/v1` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// WebSocket endpoint delivering assigned-call events.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,

    /// Per-request timeout so a stalled server fails instead of hanging.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Notes attached to every completion request.
    #[serde(default = "default_completion_notes")]
    pub completion_notes: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ws_url: default_ws_url(),
            request_timeout_secs: default_request_timeout_secs(),
            completion_notes: default_completion_notes(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_base_url() -> String {
    "http://localhost:8082/api/v1".to_string()
}

fn default_ws_url() -> String {
    "ws://localhost:8082/ws/assigned".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_completion_notes() -> String {
    "Call completed successfully".to_string()
}

/// Live update channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LiveConfig {
    /// Fixed delay between a disconnect and the next connection attempt.
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,

    /// Consecutive failed attempts before giving up. `None` retries forever.
    #[serde(default)]
    pub max_reconnect_attempts: Option<u32>,

    /// Capacity of the event queue between the channel and the controller.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_secs: default_reconnect_delay_secs(),
            max_reconnect_attempts: None,
            event_buffer: default_event_buffer(),
        }
    }
}

impl LiveConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

fn default_reconnect_delay_secs() -> u64 {
    5
}

fn default_event_buffer() -> usize {
    256
}

/// Session persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Path of the single session slot.
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

fn default_session_path() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("callconsole").join("session.json"))
        .unwrap_or_else(|| PathBuf::from("callconsole-session.json"))
}

/// Admin fleet monitor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    /// Interval between automatic fleet statistics refreshes.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl AdminConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

fn default_refresh_interval_secs() -> u64 {
    10
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
