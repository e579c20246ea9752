// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `login`, `admin-login`, `logout`, and `whoami`.

use callconsole_api::ApiClient;
use callconsole_config::ConsoleConfig;
use callconsole_core::{AdminIdentity, AgentIdentity, ConsoleError, Session};
use callconsole_session::SessionStore;
use colored::Colorize;
use secrecy::SecretString;
use tracing::info;

/// Reads a password from the terminal without echo.
pub fn prompt_password(prompt: &str) -> Result<SecretString, ConsoleError> {
    rpassword::prompt_password(prompt)
        .map(SecretString::from)
        .map_err(|e| ConsoleError::Internal(format!("failed to read password: {e}")))
}

/// Exchanges agent credentials for a token and persists the session.
pub async fn login_agent(
    api: &ApiClient,
    store: &SessionStore,
    agent_id: &str,
    password: &SecretString,
) -> Result<Session, ConsoleError> {
    let token = api.login(agent_id, password).await?;
    let session = Session::Agent(AgentIdentity {
        id: agent_id.to_string(),
        name: agent_id.to_string(),
        token,
    });
    store.save(&session)?;
    info!(agent_id, "agent logged in");
    Ok(session)
}

/// Exchanges administrator credentials for a token and persists the session.
pub async fn login_admin(
    api: &ApiClient,
    store: &SessionStore,
    username: &str,
    password: &SecretString,
) -> Result<Session, ConsoleError> {
    let token = api.admin_login(username, password).await?;
    let session = Session::Admin(AdminIdentity {
        username: username.to_string(),
        token,
    });
    store.save(&session)?;
    info!(username, "administrator logged in");
    Ok(session)
}

pub fn require_agent(store: &SessionStore) -> Result<AgentIdentity, ConsoleError> {
    match store.load()? {
        Some(Session::Agent(agent)) => Ok(agent),
        Some(Session::Admin(_)) => Err(ConsoleError::WrongRole {
            required: "agent".into(),
        }),
        None => Err(ConsoleError::NotLoggedIn),
    }
}

pub fn require_admin(store: &SessionStore) -> Result<AdminIdentity, ConsoleError> {
    match store.load()? {
        Some(Session::Admin(admin)) => Ok(admin),
        Some(Session::Agent(_)) => Err(ConsoleError::WrongRole {
            required: "admin".into(),
        }),
        None => Err(ConsoleError::NotLoggedIn),
    }
}

/// One-line description of a session. Never includes the credential.
pub fn describe(session: &Session) -> String {
    match session {
        Session::Agent(agent) => format!("agent {} (id {})", agent.name, agent.id),
        Session::Admin(admin) => format!("admin {}", admin.username),
    }
}

pub async fn run_login(config: &ConsoleConfig, agent_id: &str) -> Result<(), ConsoleError> {
    let password = prompt_password("Password: ")?;
    let api = ApiClient::new(&config.server)?;
    let store = SessionStore::from_config(&config.session);
    let session = login_agent(&api, &store, agent_id, &password).await?;
    println!("{} {}", "logged in as".green(), describe(&session));
    Ok(())
}

pub async fn run_admin_login(config: &ConsoleConfig, username: &str) -> Result<(), ConsoleError> {
    let password = prompt_password("Password: ")?;
    let api = ApiClient::new(&config.server)?;
    let store = SessionStore::from_config(&config.session);
    let session = login_admin(&api, &store, username, &password).await?;
    println!("{} {}", "logged in as".green(), describe(&session));
    Ok(())
}

pub fn run_logout(config: &ConsoleConfig) -> Result<(), ConsoleError> {
    SessionStore::from_config(&config.session).clear()?;
    println!("logged out");
    Ok(())
}

pub fn run_whoami(config: &ConsoleConfig) -> Result<(), ConsoleError> {
    match SessionStore::from_config(&config.session).load()? {
        Some(session) => println!("{}", describe(&session)),
        None => println!("not logged in"),
    }
    Ok(())
}
