// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for Mailtrace's external collaborators.
//!
//! The tracking core talks to persistence, mail transport, and summary
//! generation exclusively through these traits so each can be swapped or
//! stubbed in tests.

pub mod mailer;
pub mod storage;
pub mod summarizer;

pub use mailer::Mailer;
pub use storage::StorageAdapter;
pub use summarizer::Summarizer;
