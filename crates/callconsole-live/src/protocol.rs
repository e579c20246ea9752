// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoding of `{type, data}` push frames.

use callconsole_core::{Call, ConsoleError};
use serde::Deserialize;

/// A decoded push frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushMessage {
    /// `new_call`: a call was just assigned to this agent.
    NewCall(Call),
    /// `connected`: server greeting, with its optional message text.
    Connected(Option<String>),
    /// Any other frame type; carried only so it can be logged.
    Other(String),
}

#[derive(Debug, Deserialize)]
struct Frame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

/// Decodes one text frame.
///
/// Fails for invalid JSON, a missing `type`, or a `new_call` whose `data`
/// is not a well-formed call. Unknown types are not errors.
pub fn decode(text: &str) -> Result<PushMessage, ConsoleError> {
    let frame: Frame = serde_json::from_str(text)
        .map_err(|e| ConsoleError::protocol(format!("push frame is not a typed JSON object: {e}")))?;

    match frame.kind.as_str() {
        "new_call" => {
            let data = frame
                .data
                .ok_or_else(|| ConsoleError::protocol("new_call frame carries no data"))?;
            let call: Call = serde_json::from_value(data)
                .map_err(|e| ConsoleError::protocol(format!("new_call data is not a call: {e}")))?;
            Ok(PushMessage::NewCall(call))
        }
        "connected" => Ok(PushMessage::Connected(frame.message)),
        other => Ok(PushMessage::Other(other.to_string())),
    }
}
