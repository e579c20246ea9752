// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory stand-ins for the REST server.
//!
//! `MockCallApi` serves queued snapshot results and records completion
//! requests; `MockAdminApi` keeps an editable agent list.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use callconsole_core::{AdminApi, AgentStats, Call, CallApi, CallId, ConsoleError};

fn unavailable(message: &str) -> ConsoleError {
    ConsoleError::Api {
        status: 503,
        message: message.to_string(),
    }
}

/// Mock call endpoints.
///
/// `fetch_calls` pops the next queued result; with an empty queue it serves
/// the current call list set through [`MockCallApi::set_calls`].
#[derive(Clone, Default)]
pub struct MockCallApi {
    calls: Arc<Mutex<Vec<Call>>>,
    queued: Arc<Mutex<VecDeque<Result<Vec<Call>, String>>>>,
    completions: Arc<Mutex<Vec<(CallId, String)>>>,
    fail_completions: Arc<AtomicBool>,
    completion_delay: Arc<Mutex<Option<Duration>>>,
    fetches: Arc<AtomicUsize>,
}

impl MockCallApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose every fetch returns `calls` until told otherwise.
    pub fn with_calls(calls: Vec<Call>) -> Self {
        Self {
            calls: Arc::new(Mutex::new(calls)),
            ..Self::default()
        }
    }

    pub async fn set_calls(&self, calls: Vec<Call>) {
        *self.calls.lock().await = calls;
    }

    /// Queues a one-off successful snapshot.
    pub async fn push_snapshot(&self, calls: Vec<Call>) {
        self.queued.lock().await.push_back(Ok(calls));
    }

    /// Queues a one-off failed snapshot.
    pub async fn push_failure(&self, message: &str) {
        self.queued.lock().await.push_back(Err(message.to_string()));
    }

    /// Makes every subsequent completion request fail (or succeed again).
    pub fn fail_completions(&self, fail: bool) {
        self.fail_completions.store(fail, Ordering::SeqCst);
    }

    /// Delays each completion response, keeping it in flight.
    pub async fn set_completion_delay(&self, delay: Option<Duration>) {
        *self.completion_delay.lock().await = delay;
    }

    /// Every completion request received, in order, including failed ones.
    pub async fn completions(&self) -> Vec<(CallId, String)> {
        self.completions.lock().await.clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CallApi for MockCallApi {
    async fn fetch_calls(&self) -> Result<Vec<Call>, ConsoleError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let next = self.queued.lock().await.pop_front();
        match next {
            Some(Ok(calls)) => Ok(calls),
            Some(Err(message)) => Err(unavailable(&message)),
            None => Ok(self.calls.lock().await.clone()),
        }
    }

    async fn complete_call(&self, call_id: &CallId, notes: &str) -> Result<(), ConsoleError> {
        self.completions
            .lock()
            .await
            .push((call_id.clone(), notes.to_string()));

        let delay = *self.completion_delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_completions.load(Ordering::SeqCst) {
            return Err(unavailable("Failed to complete call"));
        }

        let mut calls = self.calls.lock().await;
        if let Some(call) = calls.iter_mut().find(|c| &c.call_id == call_id) {
            call.status = call.status.advance(callconsole_core::CallStatus::Completed);
        }
        Ok(())
    }
}

/// Mock admin endpoints backed by an agent list.
#[derive(Clone, Default)]
pub struct MockAdminApi {
    agents: Arc<Mutex<Vec<AgentStats>>>,
    fail_stats: Arc<AtomicBool>,
    next_id: Arc<AtomicUsize>,
    stats_requests: Arc<AtomicUsize>,
}

impl MockAdminApi {
    pub fn with_agents(agents: Vec<AgentStats>) -> Self {
        Self {
            agents: Arc::new(Mutex::new(agents)),
            next_id: Arc::new(AtomicUsize::new(100_000)),
            ..Self::default()
        }
    }

    pub fn fail_stats(&self, fail: bool) {
        self.fail_stats.store(fail, Ordering::SeqCst);
    }

    pub async fn agents(&self) -> Vec<AgentStats> {
        self.agents.lock().await.clone()
    }

    pub fn stats_requests(&self) -> usize {
        self.stats_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdminApi for MockAdminApi {
    async fn agent_stats(&self) -> Result<Vec<AgentStats>, ConsoleError> {
        self.stats_requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_stats.load(Ordering::SeqCst) {
            return Err(unavailable("Failed to fetch agent stats"));
        }
        Ok(self.agents.lock().await.clone())
    }

    async fn create_agent(&self, agent_name: &str, _password: &str) -> Result<(), ConsoleError> {
        let mut agents = self.agents.lock().await;
        if agents.iter().any(|a| a.agent_name == agent_name) {
            return Err(ConsoleError::Api {
                status: 409,
                message: "Agent already exists".into(),
            });
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        agents.push(AgentStats {
            agent_id: format!("{id:06}"),
            agent_name: agent_name.to_string(),
            status: "active".into(),
            total_calls: 0,
            completed_calls: 0,
        });
        Ok(())
    }

    async fn delete_agent(&self, agent_id: &str) -> Result<(), ConsoleError> {
        let mut agents = self.agents.lock().await;
        let before = agents.len();
        agents.retain(|a| a.agent_id != agent_id);
        if agents.len() == before {
            return Err(ConsoleError::Api {
                status: 404,
                message: "Agent not found".into(),
            });
        }
        Ok(())
    }
}
