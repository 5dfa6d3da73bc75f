// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lettre-backed SMTP mailer.
//!
//! Dispatches tracked HTML mail over a STARTTLS submission relay. Each
//! message carries an explicit Message-Id minted here so callers can
//! correlate dispatches with what lands in the recipient's mailbox.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::{ContentType, MessageId};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;
use uuid::Uuid;

use mailtrace_config::model::SmtpConfig;
use mailtrace_core::{Mailer, MailtraceError};

/// SMTP mailer implementing the [`Mailer`] trait.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a mailer from config. Requires credentials; the from address
    /// falls back to the relay username.
    pub fn new(config: &SmtpConfig) -> Result<Self, MailtraceError> {
        let username = config.username.clone().ok_or_else(|| {
            MailtraceError::Config("smtp.username is required to send mail".into())
        })?;
        let password = config.password.clone().ok_or_else(|| {
            MailtraceError::Config("smtp.password is required to send mail".into())
        })?;

        let from_address = config
            .from_address
            .clone()
            .unwrap_or_else(|| username.clone());
        let from: Mailbox = from_address.parse().map_err(|e| {
            MailtraceError::Config(format!("invalid smtp.from_address `{from_address}`: {e}"))
        })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| MailtraceError::Mailer {
                message: format!("failed to configure SMTP relay {}: {e}", config.host),
                source: Some(Box::new(e)),
            })?
            .port(config.port)
            .credentials(Credentials::new(username, clean_secret(&password)))
            .build();

        Ok(Self { transport, from })
    }

    /// Build a message with an explicit Message-Id. Returns (message, id).
    fn build_message(
        &self,
        recipient: &str,
        subject: &str,
        html: &str,
    ) -> Result<(Message, String), MailtraceError> {
        let to: Mailbox = recipient.parse().map_err(|e| MailtraceError::Mailer {
            message: format!("invalid recipient address `{recipient}`: {e}"),
            source: Some(Box::new(e)),
        })?;

        let message_id = format!("{}@{}", Uuid::new_v4(), self.from.email.domain());

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(MessageId::from(message_id.clone()))
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .map_err(|e| MailtraceError::Mailer {
                message: format!("failed to build message: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok((message, message_id))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_html(
        &self,
        recipient: &str,
        subject: &str,
        html: &str,
    ) -> Result<String, MailtraceError> {
        let (message, message_id) = self.build_message(recipient, subject, html)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailtraceError::Mailer {
                message: format!("SMTP send to {recipient} failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        debug!(recipient, message_id = %message_id, "email dispatched");
        Ok(message_id)
    }
}

/// Strip whitespace that sneaks in from copied app passwords.
fn clean_secret(secret: &str) -> String {
    secret.chars().filter(|c| !c.is_whitespace()).collect()
}
