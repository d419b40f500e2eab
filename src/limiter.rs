// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-recipient 24h quota in front of a [`Mailer`].
//!
//! Each `send_to` call:
//! 1. fetches the recipients' histories from the [`HistoryStore`]
//! 2. partitions them into deliver / warn / suppress cohorts
//! 3. sends once per non-empty cohort (the warn cohort gets the same message)
//! 4. refreshes the histories of every cohort that changed
//!
//! Delivery and refresh failures do not short-circuit the remaining steps;
//! the first one is returned once everything has been attempted.

use crate::clock::SystemClock;
use crate::cohort::{Cohort, Outcome, SendPlan};
use crate::config::LimiterConfig;
use crate::error::{LimiterError, Result};
use crate::locks::RecipientLocks;
use crate::metrics::LimiterMetrics;
use crate::ports::{Clock, HistoryStore, Mailer};
use std::sync::Arc;
use tracing::{debug, info, warn};

const COHORTS: [Cohort; 2] = [Cohort::Deliver, Cohort::Warn];

/// Quota-enforcing wrapper around a mailer and a history store.
pub struct EmailLimiter<M, S> {
    mailer: M,
    store: S,
    /// Max sends per recipient per rolling 24h; 0 disables limiting
    threshold: u32,
    clock: Arc<dyn Clock>,
    metrics: Option<LimiterMetrics>,
    locks: Option<RecipientLocks>,
}

impl<M, S> EmailLimiter<M, S>
where
    M: Mailer,
    S: HistoryStore,
{
    /// Create a limiter allowing `threshold` sends per recipient per 24h.
    ///
    /// Overlapping sends to the same recipient through this instance are
    /// serialized; see [`without_recipient_locks`](Self::without_recipient_locks).
    pub fn new(mailer: M, store: S, threshold: u32) -> Self {
        Self {
            mailer,
            store,
            threshold,
            clock: Arc::new(SystemClock),
            metrics: None,
            locks: Some(RecipientLocks::new()),
        }
    }

    pub fn from_config(mailer: M, store: S, config: &LimiterConfig) -> Self {
        let limiter = Self::new(mailer, store, config.max_emails_24h);
        if config.serialize_recipients {
            limiter
        } else {
            limiter.without_recipient_locks()
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_metrics(mut self, metrics: LimiterMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Skip the per-recipient lock held from fetch to refresh.
    ///
    /// Overlapping sends to one recipient then all decide from the same
    /// history and may exceed the quota together. Use only when the store
    /// or the caller already serializes per recipient.
    pub fn without_recipient_locks(mut self) -> Self {
        self.locks = None;
        self
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn mailer(&self) -> &M {
        &self.mailer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether the underlying transport is enabled.
    ///
    /// `send_to` does not check this; callers do.
    pub fn is_enabled(&self) -> bool {
        self.mailer.is_enabled()
    }

    /// Send `subject`/`body` to every recipient still within quota.
    ///
    /// Recipients that just went over quota receive the message once more as
    /// their limit warning; recipients already warned receive nothing.
    pub async fn send_to(&self, subject: &str, body: &str, recipients: &[String]) -> Result<()> {
        if recipients.is_empty() {
            return Err(LimiterError::NoRecipients);
        }

        if self.threshold == 0 {
            debug!(count = recipients.len(), "Limiting disabled, forwarding to mailer");
            self.record(|m| m.record_outcome(Outcome::Deliver, recipients.len()));
            let result = self.mailer.send_to(subject, body, recipients).await;
            self.record(|m| m.record_mailer_call(Cohort::Deliver, result.is_ok()));
            return result.map_err(|source| LimiterError::Deliver {
                cohort: Cohort::Deliver,
                source,
            });
        }

        let guards = match &self.locks {
            Some(locks) => Some(locks.acquire(recipients).await),
            None => None,
        };

        let result = self.send_limited(subject, body, recipients).await;

        if let Some(guards) = guards {
            drop(guards);
            if let Some(locks) = &self.locks {
                locks.cleanup();
            }
        }
        result
    }

    async fn send_limited(&self, subject: &str, body: &str, recipients: &[String]) -> Result<()> {
        let histories = self.store.fetch_histories(recipients).await.map_err(|err| {
            warn!(error = %err, count = recipients.len(), "Fetching email histories failed");
            LimiterError::Fetch(err)
        })?;

        let plan = SendPlan::build(recipients, histories, self.threshold, self.clock.now());
        debug!(
            deliver = plan.count(Outcome::Deliver),
            warn = plan.count(Outcome::Warn),
            suppress = plan.count(Outcome::Suppress),
            threshold = self.threshold,
            "Partitioned recipients"
        );
        self.record(|m| {
            for outcome in [Outcome::Deliver, Outcome::Warn, Outcome::Suppress] {
                m.record_outcome(outcome, plan.count(outcome));
            }
        });

        let mut first_error = None;
        for cohort in COHORTS {
            if let Err(err) = self.deliver(cohort, &plan, subject, body).await {
                first_error.get_or_insert(err);
            }
        }
        for cohort in COHORTS {
            if let Err(err) = self.persist(cohort, &plan).await {
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn deliver(
        &self,
        cohort: Cohort,
        plan: &SendPlan,
        subject: &str,
        body: &str,
    ) -> Result<()> {
        let batch = plan.batch(cohort);
        if batch.is_empty() {
            return Ok(());
        }

        let result = self.mailer.send_to(subject, body, &batch.recipients).await;
        self.record(|m| m.record_mailer_call(cohort, result.is_ok()));
        match result {
            Ok(()) => {
                info!(%cohort, count = batch.recipients.len(), "Email sent");
                Ok(())
            }
            Err(source) => {
                warn!(
                    %cohort,
                    error = %source,
                    count = batch.recipients.len(),
                    "Email send failed"
                );
                Err(LimiterError::Deliver { cohort, source })
            }
        }
    }

    async fn persist(&self, cohort: Cohort, plan: &SendPlan) -> Result<()> {
        let Some(records) = plan.refresh_records(cohort) else {
            return Ok(());
        };

        let result = self
            .store
            .refresh_histories(&records, cohort.warning_just_sent())
            .await;
        self.record(|m| m.record_refresh_call(cohort, result.is_ok()));
        result.map_err(|source| {
            warn!(
                %cohort,
                error = %source,
                count = records.len(),
                "Refreshing email histories failed"
            );
            LimiterError::Persist { cohort, source }
        })
    }

    fn record(&self, f: impl FnOnce(&LimiterMetrics)) {
        if let Some(metrics) = &self.metrics {
            f(metrics);
        }
    }
}
