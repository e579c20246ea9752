// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The task that owns the call state for one agent session.
//!
//! Commands, live events, and the results of remote requests are all
//! handled on this one task, so mutations never interleave. Remote requests
//! run on a `JoinSet` and their results come back through it.

use std::sync::Arc;

use callconsole_core::{Call, CallApi, CallId, ConsoleError};
use callconsole_live::{ChannelState, LiveEvent, LiveEvents};
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::state::{CallSync, CompletionStart, DashboardView};

const COMMAND_BUFFER: usize = 32;

/// Requests from the front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Complete(CallId),
    Refresh,
    RetryUnconfirmed,
}

/// Result of a remote request, delivered back to the controller task.
enum Outcome {
    Snapshot(Result<Vec<Call>, ConsoleError>),
    Completion {
        call_id: CallId,
        result: Result<(), ConsoleError>,
    },
}

pub struct SyncController {
    sync: CallSync,
    api: Arc<dyn CallApi>,
    notes: Arc<str>,
    commands: mpsc::Receiver<Command>,
    live: Option<LiveEvents>,
    in_flight: JoinSet<Outcome>,
    snapshot_running: bool,
    refresh_queued: bool,
    view: watch::Sender<DashboardView>,
    cancel: CancellationToken,
}

impl SyncController {
    /// Spawns the controller. It fetches a snapshot immediately and then
    /// consumes `live` until `cancel` fires or every handle is dropped.
    pub fn spawn(
        api: Arc<dyn CallApi>,
        live: LiveEvents,
        notes: impl Into<String>,
        cancel: CancellationToken,
    ) -> ControllerHandle {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (view_tx, view_rx) = watch::channel(DashboardView::default());

        let controller = SyncController {
            sync: CallSync::new(),
            api,
            notes: Arc::from(notes.into()),
            commands: commands_rx,
            live: Some(live),
            in_flight: JoinSet::new(),
            snapshot_running: false,
            refresh_queued: false,
            view: view_tx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(controller.run());

        ControllerHandle {
            commands: commands_tx,
            view: view_rx,
            cancel,
            task: Some(task),
        }
    }

    async fn run(mut self) {
        info!("sync controller started");
        self.start_snapshot();
        self.publish();

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                Some(joined) = self.in_flight.join_next() => match joined {
                    Ok(outcome) => self.handle_outcome(outcome),
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => error!(error = %e, "remote request task failed"),
                },
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => {
                        debug!("all controller handles dropped");
                        break;
                    }
                },
                event = next_live(&mut self.live) => match event {
                    Some(event) => self.handle_live(event),
                    None => {
                        info!("live channel ended; continuing without push updates");
                        self.live = None;
                    }
                },
            }
            self.publish();
        }

        self.in_flight.abort_all();
        self.sync.apply_connection(ChannelState::Closed);
        self.publish();
        info!("sync controller stopped");
    }

    fn handle_command(&mut self, command: Command) {
        debug!(?command, "command received");
        match command {
            Command::Complete(call_id) => match self.sync.begin_completion(&call_id) {
                CompletionStart::Send => self.send_completion(call_id),
                CompletionStart::AlreadyInFlight => {
                    debug!(call_id = %call_id, "completion already in flight")
                }
                CompletionStart::AlreadyCompleted => {
                    debug!(call_id = %call_id, "call already completed")
                }
                CompletionStart::UnknownCall => {
                    info!(call_id = %call_id, "ignoring completion of unknown call")
                }
            },
            Command::Refresh => self.start_snapshot(),
            Command::RetryUnconfirmed => {
                let retries = self.sync.take_retries();
                info!(count = retries.len(), "retrying unconfirmed completions");
                for call_id in retries {
                    self.send_completion(call_id);
                }
            }
        }
    }

    fn handle_live(&mut self, event: LiveEvent) {
        match event {
            LiveEvent::Status(state) => {
                debug!(%state, "live channel state");
                self.sync.apply_connection(state);
            }
            LiveEvent::CallArrived(call) => self.sync.apply_push(call),
        }
    }

    fn handle_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Snapshot(result) => {
                self.snapshot_running = false;
                self.sync.apply_snapshot(result);
                if self.refresh_queued {
                    self.refresh_queued = false;
                    self.start_snapshot();
                }
            }
            Outcome::Completion { call_id, result } => {
                self.sync.finish_completion(&call_id, result)
            }
        }
    }

    /// Starts a snapshot fetch, or queues one if a fetch is already running
    /// so results never apply out of order.
    fn start_snapshot(&mut self) {
        if self.snapshot_running {
            self.refresh_queued = true;
            return;
        }
        self.snapshot_running = true;
        self.sync.set_loading(true);

        let api = Arc::clone(&self.api);
        self.in_flight
            .spawn(async move { Outcome::Snapshot(api.fetch_calls().await) });
    }

    fn send_completion(&mut self, call_id: CallId) {
        let api = Arc::clone(&self.api);
        let notes = Arc::clone(&self.notes);
        self.in_flight.spawn(async move {
            let result = api.complete_call(&call_id, &notes).await;
            Outcome::Completion { call_id, result }
        });
    }

    fn publish(&self) {
        let next = self.sync.view();
        self.view.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

async fn next_live(live: &mut Option<LiveEvents>) -> Option<LiveEvent> {
    match live {
        Some(events) => events.recv().await,
        None => std::future::pending().await,
    }
}

/// Front-end side of a running [`SyncController`].
///
/// Dropping the handle stops the controller.
#[derive(Debug)]
pub struct ControllerHandle {
    commands: mpsc::Sender<Command>,
    view: watch::Receiver<DashboardView>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ControllerHandle {
    /// Completes a call optimistically; the view updates before the server answers.
    pub async fn complete(&self, call_id: CallId) -> Result<(), ConsoleError> {
        self.send(Command::Complete(call_id)).await
    }

    pub async fn refresh(&self) -> Result<(), ConsoleError> {
        self.send(Command::Refresh).await
    }

    pub async fn retry_unconfirmed(&self) -> Result<(), ConsoleError> {
        self.send(Command::RetryUnconfirmed).await
    }

    pub async fn send(&self, command: Command) -> Result<(), ConsoleError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ConsoleError::Internal("sync controller has stopped".into()))
    }

    /// A receiver that observes every published view.
    pub fn view(&self) -> watch::Receiver<DashboardView> {
        self.view.clone()
    }

    pub fn current(&self) -> DashboardView {
        self.view.borrow().clone()
    }

    /// Stops the controller and waits for it to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!(error = %e, "sync controller task failed");
            }
        }
    }
}

impl Drop for ControllerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
