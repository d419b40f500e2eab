// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Recording mailer with scripted failures.

use async_trait::async_trait;
use email_send_limiter::{Mailer, MailerError};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

/// One recorded `send_to` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
}

#[derive(Debug, Default)]
pub struct RecordingMailer {
    disabled: bool,
    /// Calls including any of these recipients are rejected
    rejects: HashSet<String>,
    /// Time each call takes after it is recorded
    delay: Option<Duration>,
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    pub fn rejecting(mut self, recipient: &str) -> Self {
        self.rejects.insert(recipient.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn recipient_batches(&self) -> Vec<Vec<String>> {
        self.sent().into_iter().map(|mail| mail.recipients).collect()
    }

    /// Number of calls that included `recipient`.
    pub fn times_mailed(&self, recipient: &str) -> usize {
        self.sent()
            .iter()
            .filter(|mail| mail.recipients.iter().any(|r| r == recipient))
            .count()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    fn is_enabled(&self) -> bool {
        !self.disabled
    }

    async fn send_to(
        &self,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> Result<(), MailerError> {
        self.sent.lock().unwrap().push(SentMail {
            subject: subject.to_string(),
            body: body.to_string(),
            recipients: recipients.to_vec(),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match recipients.iter().find(|r| self.rejects.contains(*r)) {
            Some(r) => Err(MailerError::Rejected(format!("550 no such user {r}"))),
            None => Ok(()),
        }
    }
}
