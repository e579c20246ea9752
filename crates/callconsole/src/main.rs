// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! callconsole - terminal console for call-center agents and administrators.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod admin;
mod auth;
mod console;
mod render;
mod shutdown;

use std::path::PathBuf;

use callconsole_config::ConsoleConfig;
use callconsole_core::ConsoleError;
use clap::{Parser, Subcommand};
use colored::Colorize;

/// callconsole - terminal console for call-center agents and administrators.
#[derive(Parser, Debug)]
#[command(name = "callconsole", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in as an agent (password is prompted).
    Login {
        #[arg(long)]
        agent_id: String,
    },
    /// Log in as an administrator (password is prompted).
    AdminLogin {
        #[arg(long)]
        username: String,
    },
    /// Forget the stored session.
    Logout,
    /// Show the stored session.
    Whoami,
    /// Open the live agent console.
    Console,
    /// Show fleet statistics (admin).
    Stats {
        /// Keep refreshing until interrupted.
        #[arg(long)]
        watch: bool,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Provision a new agent (admin; password is prompted).
    CreateAgent {
        #[arg(long)]
        name: String,
    },
    /// Remove an agent (admin).
    DeleteAgent { agent_id: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => callconsole_config::load_and_validate_path(path),
        None => callconsole_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            callconsole_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.log_level);

    if let Err(e) = run(cli.command, cli.plain, &config).await {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

async fn run(command: Commands, plain: bool, config: &ConsoleConfig) -> Result<(), ConsoleError> {
    match command {
        Commands::Login { agent_id } => auth::run_login(config, &agent_id).await,
        Commands::AdminLogin { username } => auth::run_admin_login(config, &username).await,
        Commands::Logout => auth::run_logout(config),
        Commands::Whoami => auth::run_whoami(config),
        Commands::Console => {
            let cancel = shutdown::install_signal_handler();
            console::run_console(config, plain, cancel).await
        }
        Commands::Stats { watch, json } => {
            let cancel = shutdown::install_signal_handler();
            admin::run_stats(config, watch, json, plain, cancel).await
        }
        Commands::CreateAgent { name } => admin::run_create_agent(config, &name).await,
        Commands::DeleteAgent { agent_id } => admin::run_delete_agent(config, &agent_id).await,
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so they stay out of rendered output.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("callconsole={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
