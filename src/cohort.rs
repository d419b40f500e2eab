// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Quota evaluation and recipient partitioning.
//!
//! Every recipient of a send lands in exactly one cohort:
//!
//! - **deliver**: under quota, gets the email and one more timestamp
//! - **warn**: just went over quota, gets the email once more as its warning
//! - **suppress**: over quota and already warned, gets nothing

use crate::history::EmailHistory;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;

/// Outcome of evaluating one recipient against the quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Deliver,
    Warn,
    Suppress,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deliver => "deliver",
            Self::Warn => "warn",
            Self::Suppress => "suppress",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cohorts that result in a mailer call and a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cohort {
    Deliver,
    Warn,
}

impl Cohort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deliver => "deliver",
            Self::Warn => "warn",
        }
    }

    /// Value passed as `warning_just_sent` when refreshing this cohort.
    pub fn warning_just_sent(&self) -> bool {
        matches!(self, Self::Warn)
    }
}

impl fmt::Display for Cohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide what happens to a recipient with the given history.
pub fn evaluate(history: &EmailHistory, threshold: u32) -> Outcome {
    if !history.is_over_limit(threshold) {
        Outcome::Deliver
    } else if !history.limit_warning_sent {
        Outcome::Warn
    } else {
        Outcome::Suppress
    }
}

/// Recipients and updated records of one cohort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CohortBatch {
    pub recipients: Vec<String>,
    pub records: Vec<EmailHistory>,
}

impl CohortBatch {
    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    fn push(&mut self, record: EmailHistory) {
        self.recipients.push(record.email.clone());
        self.records.push(record);
    }
}

/// Partition of one `send_to` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendPlan {
    pub deliver: CohortBatch,
    pub warn: CohortBatch,
    /// Records of suppressed recipients, unchanged.
    pub suppressed: Vec<EmailHistory>,
}

impl SendPlan {
    /// Evaluate every recipient against `threshold`.
    ///
    /// `histories` may be partial; absent recipients start from an empty
    /// history. Recipient order is preserved within each cohort and
    /// duplicates are kept.
    pub fn build(
        recipients: &[String],
        histories: Vec<EmailHistory>,
        threshold: u32,
        now: DateTime<Utc>,
    ) -> Self {
        let by_email: HashMap<String, EmailHistory> = histories
            .into_iter()
            .map(|h| (h.email.clone(), h))
            .collect();

        let mut plan = Self::default();
        for recipient in recipients {
            // Clone rather than remove so duplicates see the same stored state.
            let mut record = by_email
                .get(recipient)
                .cloned()
                .unwrap_or_else(|| EmailHistory::new(recipient.as_str()));

            match evaluate(&record, threshold) {
                Outcome::Deliver => {
                    record.sent_timestamps_24h.push(now);
                    record.limit_warning_sent = false;
                    plan.deliver.push(record);
                }
                Outcome::Warn => {
                    record.limit_warning_sent = true;
                    plan.warn.push(record);
                }
                Outcome::Suppress => plan.suppressed.push(record),
            }
        }
        plan
    }

    pub fn batch(&self, cohort: Cohort) -> &CohortBatch {
        match cohort {
            Cohort::Deliver => &self.deliver,
            Cohort::Warn => &self.warn,
        }
    }

    /// Records to persist for `cohort`, or `None` when nothing changed.
    ///
    /// Suppressed records ride along unchanged with the deliver batch.
    pub fn refresh_records(&self, cohort: Cohort) -> Option<Vec<EmailHistory>> {
        match cohort {
            Cohort::Deliver if !self.deliver.is_empty() => Some(
                self.deliver
                    .records
                    .iter()
                    .chain(self.suppressed.iter())
                    .cloned()
                    .collect(),
            ),
            Cohort::Warn if !self.warn.is_empty() => Some(self.warn.records.clone()),
            _ => None,
        }
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::Deliver => self.deliver.recipients.len(),
            Outcome::Warn => self.warn.recipients.len(),
            Outcome::Suppress => self.suppressed.len(),
        }
    }
}
