// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the call-center REST API.
//!
//! Handles bearer authentication, the `{success, message, data}` envelope,
//! and a single retry of idempotent reads on transient failures.

use std::time::Duration;

use callconsole_config::ServerConfig;
use callconsole_core::{ConsoleError, Credential};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::types::{AdminLoginRequest, AgentLoginRequest, Envelope, LoginData};

/// REST client bound to one server and, once logged in, one credential.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    credential: Option<Credential>,
    max_retries: u32,
    retry_delay: Duration,
}

impl ApiClient {
    /// Builds an unauthenticated client from the `[server]` config section.
    pub fn new(config: &ServerConfig) -> Result<Self, ConsoleError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ConsoleError::transport("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credential: None,
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Returns a client that sends `Authorization: Bearer <credential>`.
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Overrides how often and how long to wait before retrying a read.
    pub fn with_retry_policy(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// `POST /auth/login`; returns the agent's bearer credential.
    pub async fn login(
        &self,
        agent_id: &str,
        password: &SecretString,
    ) -> Result<Credential, ConsoleError> {
        let body = AgentLoginRequest {
            agent_id,
            password: password.expose_secret(),
        };
        self.exchange_credentials("/auth/login", &body).await
    }

    /// `POST /admin/login`; returns the administrator's bearer credential.
    pub async fn admin_login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Credential, ConsoleError> {
        let body = AdminLoginRequest {
            username,
            password: password.expose_secret(),
        };
        self.exchange_credentials("/admin/login", &body).await
    }

    async fn exchange_credentials<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Credential, ConsoleError> {
        let data: Option<LoginData> = self
            .request(Method::POST, path, Some(body), false)
            .await
            .map_err(|e| match e {
                ConsoleError::Api { status, message } if (400..500).contains(&status) => {
                    ConsoleError::Auth(message)
                }
                other => other,
            })?;

        match data {
            Some(login) if !login.token.is_empty() => Ok(Credential::new(login.token)),
            _ => Err(ConsoleError::protocol("login response carried no token")),
        }
    }

    /// Sends one request and unwraps the response envelope.
    ///
    /// Reads (`GET`) are retried on transient failures; writes are sent once.
    pub(crate) async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authenticated: bool,
    ) -> Result<Option<T>, ConsoleError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let retries = if method == Method::GET {
            self.max_retries
        } else {
            0
        };
        let mut attempt = 0;

        loop {
            match self.send_once(&method, path, body, authenticated).await {
                Err(e) if e.is_transient() && attempt < retries => {
                    attempt += 1;
                    warn!(%method, path, attempt, error = %e, "transient failure, will retry");
                    tokio::time::sleep(self.retry_delay).await;
                }
                result => return result,
            }
        }
    }

    async fn send_once<B, T>(
        &self,
        method: &Method,
        path: &str,
        body: Option<&B>,
        authenticated: bool,
    ) -> Result<Option<T>, ConsoleError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let mut builder = self.client.request(method.clone(), &url);

        if authenticated {
            let credential = self.credential.as_ref().ok_or(ConsoleError::NotLoggedIn)?;
            let value = HeaderValue::from_str(&format!("Bearer {}", credential.expose()))
                .map_err(|_| ConsoleError::Auth("credential is not a valid header value".into()))?;
            builder = builder.header(AUTHORIZATION, value);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ConsoleError::transport(format!("{method} {path} failed"), e))?;
        let status = response.status();
        debug!(%method, path, status = %status, "response received");

        let text = response
            .text()
            .await
            .map_err(|e| ConsoleError::transport("failed to read response body", e))?;

        if !status.is_success() {
            return Err(ConsoleError::Api {
                status: status.as_u16(),
                message: failure_message(status, &text),
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&text).map_err(|e| {
            ConsoleError::protocol(format!("unexpected response to {method} {path}: {e}"))
        })?;

        if envelope.success == Some(false) {
            return Err(ConsoleError::Api {
                status: status.as_u16(),
                message: envelope
                    .explanation()
                    .unwrap_or_else(|| "request was not successful".to_string()),
            });
        }

        Ok(envelope.data)
    }
}

/// Builds an absolute request path from raw segments, percent-encoding each
/// so an id cannot change which endpoint is addressed.
pub(crate) fn segment_path(segments: &[&str]) -> Result<String, ConsoleError> {
    let mut url = Url::parse("http://localhost/")
        .map_err(|e| ConsoleError::Internal(format!("path base rejected: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| ConsoleError::Internal("path base cannot take segments".into()))?
        .clear()
        .extend(segments);
    Ok(url.path().to_string())
}

/// Extracts the server's explanation from an error body, falling back to the
/// raw body or the status reason.
fn failure_message(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<Envelope<serde_json::Value>>(body) {
        if let Some(explanation) = envelope.explanation() {
            return explanation;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        trimmed.to_string()
    }
}
