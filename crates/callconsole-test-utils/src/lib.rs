// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for callconsole integration tests.
//!
//! - [`MockCallApi`] and [`MockAdminApi`] stand in for the REST server
//! - [`PushServer`] is a local push endpoint driven from the test
//! - [`fixtures`] builds calls and agent records

pub mod fixtures;
pub mod mock_api;
pub mod push_server;

pub use mock_api::{MockAdminApi, MockCallApi};
pub use push_server::PushServer;
