// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: URL schemes, non-zero intervals,
//! and known log levels.

use url::Url;

use crate::diagnostic::ConfigError;
use crate::model::ConsoleConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &ConsoleConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    check_url(
        &mut errors,
        "server.base_url",
        &config.server.base_url,
        &["http", "https"],
    );
    check_url(
        &mut errors,
        "server.ws_url",
        &config.server.ws_url,
        &["ws", "wss"],
    );

    if config.server.request_timeout_secs == 0 {
        errors.push(validation("server.request_timeout_secs must be greater than 0"));
    }

    if config.live.reconnect_delay_secs == 0 {
        errors.push(validation("live.reconnect_delay_secs must be greater than 0"));
    }

    if config.live.max_reconnect_attempts == Some(0) {
        errors.push(validation(
            "live.max_reconnect_attempts must be at least 1 (omit it to retry forever)",
        ));
    }

    if config.live.event_buffer == 0 {
        errors.push(validation("live.event_buffer must be greater than 0"));
    }

    if config.session.path.as_os_str().is_empty() {
        errors.push(validation("session.path must not be empty"));
    }

    if config.admin.refresh_interval_secs == 0 {
        errors.push(validation("admin.refresh_interval_secs must be greater than 0"));
    }

    let level = config.logging.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.log_level `{}` is not one of: {}",
                config.logging.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ConfigError>, key: &str, value: &str, schemes: &[&str]) {
    match Url::parse(value) {
        Ok(url) if schemes.contains(&url.scheme()) => {}
        Ok(url) => errors.push(ConfigError::Validation {
            message: format!(
                "{key} must use one of the schemes {}, got `{}`",
                schemes.join("/"),
                url.scheme()
            ),
        }),
        Err(e) => errors.push(ConfigError::Validation {
            message: format!("{key} `{value}` is not a valid URL: {e}"),
        }),
    }
}

fn validation(message: &str) -> ConfigError {
    ConfigError::Validation {
        message: message.to_string(),
    }
}
