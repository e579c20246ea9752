// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `callconsole console`: the interactive agent dashboard.
//!
//! The dashboard is redrawn whenever the controller publishes a new view.
//! Input is read on a dedicated thread because the line editor blocks.

use std::io::IsTerminal;
use std::sync::Arc;

use callconsole_api::ApiClient;
use callconsole_config::ConsoleConfig;
use callconsole_core::{CallId, ConsoleError, Session};
use callconsole_live::LiveChannelConfig;
use callconsole_session::SessionStore;
use callconsole_sync::{AgentSession, ControllerHandle};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::auth;
use crate::render::render_dashboard;

const HELP: &str = "commands: complete <call-id> | refresh | retry | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ConsoleCommand {
    Complete(CallId),
    Refresh,
    Retry,
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `Ok(None)`.
fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "complete" | "done" => match (words.next(), words.next()) {
            (Some(id), None) => ConsoleCommand::Complete(CallId::from(id)),
            _ => return Err("usage: complete <call-id>".into()),
        },
        "refresh" | "r" => ConsoleCommand::Refresh,
        "retry" => ConsoleCommand::Retry,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        other => return Err(format!("unknown command `{other}`; {HELP}")),
    };
    Ok(Some(command))
}

enum Input {
    Line(String),
    Closed,
}

fn spawn_input_thread(tx: mpsc::Sender<Input>) -> Result<(), ConsoleError> {
    let mut editor = DefaultEditor::new()
        .map_err(|e| ConsoleError::Internal(format!("failed to initialize readline: {e}")))?;
    let prompt = format!("{}> ", "console".green());

    std::thread::Builder::new()
        .name("console-input".into())
        .spawn(move || {
            loop {
                match editor.readline(&prompt) {
                    Ok(line) => {
                        if !line.trim().is_empty() {
                            let _ = editor.add_history_entry(&line);
                        }
                        if tx.blocking_send(Input::Line(line)).is_err() {
                            break;
                        }
                    }
                    Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                        let _ = tx.blocking_send(Input::Closed);
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "readline failed");
                        let _ = tx.blocking_send(Input::Closed);
                        break;
                    }
                }
            }
        })
        .map_err(|e| ConsoleError::Internal(format!("failed to start input thread: {e}")))?;
    Ok(())
}

/// Returns false when the console should exit.
async fn dispatch(controller: &ControllerHandle, line: &str) -> Result<bool, ConsoleError> {
    match parse_command(line) {
        Ok(None) => {}
        Ok(Some(ConsoleCommand::Quit)) => return Ok(false),
        Ok(Some(ConsoleCommand::Help)) => println!("{HELP}"),
        Ok(Some(ConsoleCommand::Complete(call_id))) => controller.complete(call_id).await?,
        Ok(Some(ConsoleCommand::Refresh)) => controller.refresh().await?,
        Ok(Some(ConsoleCommand::Retry)) => controller.retry_unconfirmed().await?,
        Err(message) => eprintln!("{}", message.yellow()),
    }
    Ok(true)
}

/// Runs the agent console until `quit`, end of input, or `cancel`.
pub async fn run_console(
    config: &ConsoleConfig,
    plain: bool,
    cancel: CancellationToken,
) -> Result<(), ConsoleError> {
    let store = SessionStore::from_config(&config.session);
    let agent = auth::require_agent(&store)?;

    let api = ApiClient::new(&config.server)?.with_credential(agent.token.clone());
    let live = LiveChannelConfig::from_config(&config.server, &config.live)?;
    let session = AgentSession::start(
        Arc::new(api),
        live,
        agent.token.clone(),
        config.server.completion_notes.clone(),
        &cancel,
    );

    let use_color = !plain && std::io::stdout().is_terminal();
    println!("{} {}", "callconsole".bold().green(), auth::describe(&Session::Agent(agent)));
    println!("{HELP}");

    let (input_tx, mut input) = mpsc::channel(8);
    spawn_input_thread(input_tx)?;

    let mut view = session.controller().view();
    let result = loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break Ok(()),
            changed = view.changed() => {
                if changed.is_err() {
                    debug!("controller stopped publishing");
                    break Ok(());
                }
                let text = render_dashboard(&view.borrow_and_update(), use_color);
                println!("{text}");
            }
            line = input.recv() => match line {
                Some(Input::Line(line)) => match dispatch(session.controller(), &line).await {
                    Ok(true) => {}
                    Ok(false) => break Ok(()),
                    Err(e) => break Err(e),
                },
                Some(Input::Closed) | None => break Ok(()),
            },
        }
    };

    session.end().await;
    result
}
