// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for limiter decisions and collaborator calls.

use crate::cohort::{Cohort, Outcome};
use prometheus::{IntCounterVec, Opts, Registry};

/// Counters updated by [`EmailLimiter`](crate::limiter::EmailLimiter).
///
/// Created unregistered; call [`register`](Self::register) to expose them.
#[derive(Clone)]
pub struct LimiterMetrics {
    recipients: IntCounterVec,
    mailer_calls: IntCounterVec,
    refresh_calls: IntCounterVec,
}

impl LimiterMetrics {
    pub fn new() -> prometheus::Result<Self> {
        Ok(Self {
            recipients: IntCounterVec::new(
                Opts::new(
                    "email_limiter_recipients_total",
                    "Recipients evaluated, by outcome",
                ),
                &["outcome"],
            )?,
            mailer_calls: IntCounterVec::new(
                Opts::new(
                    "email_limiter_mailer_calls_total",
                    "Mailer calls, by cohort and result",
                ),
                &["cohort", "result"],
            )?,
            refresh_calls: IntCounterVec::new(
                Opts::new(
                    "email_limiter_refresh_calls_total",
                    "History refresh calls, by cohort and result",
                ),
                &["cohort", "result"],
            )?,
        })
    }

    pub fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.recipients.clone()))?;
        registry.register(Box::new(self.mailer_calls.clone()))?;
        registry.register(Box::new(self.refresh_calls.clone()))?;
        Ok(())
    }

    pub fn record_outcome(&self, outcome: Outcome, count: usize) {
        if count > 0 {
            self.recipients
                .with_label_values(&[outcome.as_str()])
                .inc_by(count as u64);
        }
    }

    pub fn record_mailer_call(&self, cohort: Cohort, ok: bool) {
        self.mailer_calls
            .with_label_values(&[cohort.as_str(), result_label(ok)])
            .inc();
    }

    pub fn record_refresh_call(&self, cohort: Cohort, ok: bool) {
        self.refresh_calls
            .with_label_values(&[cohort.as_str(), result_label(ok)])
            .inc();
    }

    pub fn outcome_count(&self, outcome: Outcome) -> u64 {
        self.recipients.with_label_values(&[outcome.as_str()]).get()
    }

    pub fn mailer_call_count(&self, cohort: Cohort, ok: bool) -> u64 {
        self.mailer_calls
            .with_label_values(&[cohort.as_str(), result_label(ok)])
            .get()
    }

    pub fn refresh_call_count(&self, cohort: Cohort, ok: bool) -> u64 {
        self.refresh_calls
            .with_label_values(&[cohort.as_str(), result_label(ok)])
            .get()
    }
}

fn result_label(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "error"
    }
}
