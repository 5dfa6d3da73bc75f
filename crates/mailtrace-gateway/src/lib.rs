// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Mailtrace tracker.
//!
//! Exposes the tracking pixel endpoint and the dashboard REST API on top of
//! axum, holding the storage, mailer, and summarizer collaborators as shared
//! state.

pub mod handlers;
pub mod server;

pub use server::{GatewayState, ServerConfig, build_router, start_server};
