// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service seams between the synchronization layer and the remote server.
//!
//! All traits use `#[async_trait]` so implementations can be held as
//! `Arc<dyn Trait + Send + Sync>`.

pub mod admin;
pub mod calls;

pub use admin::AdminApi;
pub use calls::CallApi;
