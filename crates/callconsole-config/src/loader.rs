// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./callconsole.toml` > `~/.config/callconsole/callconsole.toml`
//! > `/etc/callconsole/callconsole.toml`, with `CALLCONSOLE_` environment
//! variable overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ConsoleConfig;

/// Sections addressable from `CALLCONSOLE_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &["server", "live", "session", "admin", "logging"];

pub(crate) const SYSTEM_CONFIG_PATH: &str = "/etc/callconsole/callconsole.toml";
pub(crate) const LOCAL_CONFIG_PATH: &str = "callconsole.toml";

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("callconsole").join("callconsole.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/callconsole/callconsole.toml`
/// 3. `~/.config/callconsole/callconsole.toml`
/// 4. `./callconsole.toml`
/// 5. `CALLCONSOLE_*` environment variables
pub fn load_config() -> Result<ConsoleConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from an inline TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ConsoleConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConsoleConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ConsoleConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConsoleConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full hierarchical Figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ConsoleConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Environment provider mapping `CALLCONSOLE_LIVE_RECONNECT_DELAY_SECS` to
/// `live.reconnect_delay_secs`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// keys that themselves contain underscores stay intact.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("CALLCONSOLE_").map(|key| env_key_to_path(key.as_str()).into())
}

pub(crate) fn env_key_to_path(key: &str) -> String {
    let lowered = key.to_ascii_lowercase();
    for section in ENV_SECTIONS {
        if let Some(rest) = lowered
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    lowered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(env_key_to_path("SERVER_BASE_URL"), "server.base_url");
        assert_eq!(
            env_key_to_path("live_max_reconnect_attempts"),
            "live.max_reconnect_attempts"
        );
        assert_eq!(env_key_to_path("LOGGING_LOG_LEVEL"), "logging.log_level");
        assert_eq!(env_key_to_path("unrelated"), "unrelated");
    }
}
