// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Built-in [`Mailer`] adapters.
//!
//! Real transports (SMTP relays, provider APIs) are supplied by the
//! embedding application.

use crate::error::MailerError;
use crate::ports::Mailer;
use async_trait::async_trait;
use tracing::info;

/// Transport for deployments with email turned off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn send_to(
        &self,
        _subject: &str,
        _body: &str,
        _recipients: &[String],
    ) -> Result<(), MailerError> {
        Err(MailerError::Disabled)
    }
}

/// Transport that logs each message instead of delivering it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn send_to(
        &self,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> Result<(), MailerError> {
        info!(
            subject,
            recipients = ?recipients,
            body_len = body.len(),
            "Email logged instead of sent"
        );
        Ok(())
    }
}
