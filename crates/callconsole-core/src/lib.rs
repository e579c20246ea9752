// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the callconsole workspace.
//!
//! Defines the call and session data model, the shared [`ConsoleError`]
//! type, and the service traits the synchronization layer talks through.

pub mod error;
pub mod traits;
pub mod types;

pub use error::ConsoleError;
pub use traits::{AdminApi, CallApi};
pub use types::{
    AdminIdentity, AgentIdentity, AgentStats, Call, CallId, CallStatus, Credential, Role,
    Session, SystemStats,
};
