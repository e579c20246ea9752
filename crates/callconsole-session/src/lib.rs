// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence for the one authenticated session.
//!
//! The session lives in a single JSON file shaped as
//! `{"type": "agent"|"admin", "data": {...}}`. A record that cannot be
//! parsed is deleted and reported as "no session", so a damaged file never
//! locks the operator out.

use std::io;
use std::path::{Path, PathBuf};

use callconsole_config::SessionConfig;
use callconsole_core::{ConsoleError, Session};
use tracing::{debug, warn};

/// Owns the session slot on disk.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored session.
    ///
    /// Returns `Ok(None)` when nothing is stored or the record is corrupt; in
    /// the latter case the record is removed. Only I/O failures other than
    /// "not found" are errors.
    pub fn load(&self) -> Result<Option<Session>, ConsoleError> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage(e)),
        };

        match serde_json::from_slice::<Session>(&raw) {
            Ok(session) => {
                debug!(role = %session.role(), principal = session.principal(), "session loaded");
                Ok(Some(session))
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding unreadable session record");
                self.clear()?;
                Ok(None)
            }
        }
    }

    /// Persists `session`, replacing whatever was stored.
    ///
    /// The record is written to a sibling temp file and renamed into place.
    pub fn save(&self, session: &Session) -> Result<(), ConsoleError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(storage)?;
            }
        }

        let body = serde_json::to_vec_pretty(session).map_err(storage)?;
        let tmp = self.temp_path();
        std::fs::write(&tmp, body).map_err(storage)?;
        restrict_permissions(&tmp)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(storage(e));
        }

        debug!(role = %session.role(), principal = session.principal(), "session saved");
        Ok(())
    }

    /// Removes the stored session. Clearing an empty slot succeeds.
    pub fn clear(&self) -> Result<(), ConsoleError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "session cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage(e)),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "session.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn storage<E>(e: E) -> ConsoleError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ConsoleError::Storage {
        source: Box::new(e),
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), ConsoleError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(storage)
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), ConsoleError> {
    Ok(())
}
