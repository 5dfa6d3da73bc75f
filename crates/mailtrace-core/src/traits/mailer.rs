// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mail transport trait for outbound dispatch.

use async_trait::async_trait;

use crate::error::MailtraceError;

/// Adapter for the outbound mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends an HTML email and returns the Message-Id it was dispatched with.
    async fn send_html(
        &self,
        recipient: &str,
        subject: &str,
        html: &str,
    ) -> Result<String, MailtraceError>;
}
