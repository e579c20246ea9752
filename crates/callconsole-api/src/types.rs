// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request and response bodies exchanged with the call-center server.

use serde::{Deserialize, Serialize};

/// Every response is wrapped as `{success, message, error, data}`.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// The most useful human-readable explanation the server gave.
    pub fn explanation(&self) -> Option<String> {
        match (&self.message, &self.error) {
            (Some(message), Some(error)) if !error.is_empty() => Some(format!("{message}: {error}")),
            (Some(message), _) => Some(message.clone()),
            (None, Some(error)) => Some(error.clone()),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AgentLoginRequest<'a> {
    pub agent_id: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct AdminLoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginData {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct CompleteCallRequest<'a> {
    pub status: &'a str,
    pub notes: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CreateAgentRequest<'a> {
    pub agent_name: &'a str,
    pub password: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_data_is_none() {
        let env: Envelope<Vec<u32>> =
            serde_json::from_str(r#"{"success":true,"data":null}"#).unwrap();
        assert_eq!(env.success, Some(true));
        assert!(env.data.is_none());
    }

    #[test]
    fn explanation_combines_message_and_error() {
        let env: Envelope<serde_json::Value> = serde_json::from_str(
            r#"{"success":false,"message":"Failed to fetch calls","error":"db down"}"#,
        )
        .unwrap();
        assert_eq!(
            env.explanation().as_deref(),
            Some("Failed to fetch calls: db down")
        );
    }
}
