// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMTP dispatch adapter for the Mailtrace tracker.
//!
//! Implements the [`mailtrace_core::Mailer`] trait on top of lettre's async
//! SMTP transport.

pub mod mailer;

pub use mailer::SmtpMailer;
