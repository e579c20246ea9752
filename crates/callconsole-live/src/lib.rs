// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live update channel for newly assigned calls.
//!
//! [`LiveChannel::spawn`] dials `ws_url?token=<credential>`, forwards every
//! well-formed `new_call` frame as [`LiveEvent::CallArrived`], and reconnects
//! after a fixed delay whenever the connection drops. Closing the channel
//! also ends its [`LiveEvents`] stream, buffered events included.

pub mod channel;
pub mod protocol;

pub use channel::{ChannelState, LiveChannel, LiveChannelConfig, LiveEvent, LiveEvents};
pub use protocol::{decode, PushMessage};
