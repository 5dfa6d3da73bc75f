// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Mailtrace tracker.

use thiserror::Error;

/// The primary error type used across all Mailtrace adapter traits and core operations.
#[derive(Debug, Error)]
pub enum MailtraceError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Mail transport errors (SMTP connection, address parsing, send rejection).
    #[error("mailer error: {message}")]
    Mailer {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Summary provider errors (API failure, malformed completion payload).
    #[error("summarizer error: {message}")]
    Summarizer {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
