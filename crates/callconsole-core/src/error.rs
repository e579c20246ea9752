// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every callconsole library crate.

use thiserror::Error;

/// The primary error type returned by the API client, session store,
/// live channel, and synchronization controller.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Configuration errors (bad URL, missing section value).
    #[error("configuration error: {0}")]
    Config(String),

    /// Local storage errors (session file unreadable or unwritable).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The server could not be reached or the connection broke mid-request.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The server answered, but with a non-2xx status or `success: false`.
    #[error("server rejected request ({status}): {message}")]
    Api { status: u16, message: String },

    /// Login was refused by the identity service.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A payload did not match the expected wire shape.
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// The operation needs a stored session and there is none.
    #[error("no active session; log in first")]
    NotLoggedIn,

    /// The operation needs a session with a different role.
    #[error("this command requires an {required} session")]
    WrongRole { required: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConsoleError {
    /// Builds a [`ConsoleError::Transport`] that keeps the underlying cause.
    pub fn transport<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ConsoleError::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Builds a [`ConsoleError::Protocol`].
    pub fn protocol(message: impl Into<String>) -> Self {
        ConsoleError::Protocol {
            message: message.into(),
        }
    }

    /// True when the failure is a transient server-side condition (5xx, 429)
    /// or a broken connection.
    pub fn is_transient(&self) -> bool {
        match self {
            ConsoleError::Transport { .. } => true,
            ConsoleError::Api { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }
}
