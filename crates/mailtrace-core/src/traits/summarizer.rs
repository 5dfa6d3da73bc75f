// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Summary generator trait.

use async_trait::async_trait;

use crate::error::MailtraceError;
use crate::types::{EmailSummary, SummaryInput};

/// Adapter for the AI summary generator.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Produces a single digest over the given emails.
    async fn summarize_emails(
        &self,
        inputs: &[SummaryInput],
    ) -> Result<EmailSummary, MailtraceError>;
}
