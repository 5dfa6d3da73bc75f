// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Mailtrace email tracker.
//!
//! This crate provides the foundational trait definitions, error type, and
//! domain model used throughout the Mailtrace workspace. The storage, SMTP,
//! and summarizer crates implement the adapter traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MailtraceError;
pub use types::{
    AiSummary, Email, EmailSummary, Notification, NotificationKind, ReadReceipt, ReadStatus,
    SummaryInput, SummaryPriority, SummarySource,
};

// Re-export adapter traits at crate root.
pub use traits::{Mailer, StorageAdapter, Summarizer};
