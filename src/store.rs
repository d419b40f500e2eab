// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! In-memory [`HistoryStore`].
//!
//! Ages timestamps out of the configured window on every fetch. Refresh
//! merges each record into the stored one instead of overwriting it, so two
//! writers that fetched the same history both keep their timestamps.
//! Merging does not stop both writers from sending; the limiter's
//! per-recipient locks do that within one instance.

use crate::clock::SystemClock;
use crate::config::HistoryConfig;
use crate::error::StoreError;
use crate::history::EmailHistory;
use crate::ports::{Clock, HistoryStore};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Thread-safe in-memory history store.
pub struct MemoryHistoryStore {
    /// Age after which a timestamp stops counting
    window: Duration,
    clock: Arc<dyn Clock>,
    records: RwLock<HashMap<String, EmailHistory>>,
    /// Recipients moved into the warned state, for auditing
    warnings_recorded: AtomicU64,
}

impl MemoryHistoryStore {
    pub fn new(config: &HistoryConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &HistoryConfig, clock: Arc<dyn Clock>) -> Self {
        let window =
            Duration::from_std(config.window()).unwrap_or_else(|_| Duration::weeks(52 * 100));
        Self {
            window,
            clock,
            records: RwLock::new(HashMap::new()),
            warnings_recorded: AtomicU64::new(0),
        }
    }

    fn cutoff(&self) -> DateTime<Utc> {
        self.clock
            .now()
            .checked_sub_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Stored record for `email`, with timestamps as last written.
    pub async fn get(&self, email: &str) -> Option<EmailHistory> {
        self.records.read().await.get(email).cloned()
    }

    /// Seed or overwrite a record directly.
    pub async fn insert(&self, record: EmailHistory) {
        self.records
            .write()
            .await
            .insert(record.email.clone(), record);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Number of recipients refreshed with `warning_just_sent = true`.
    pub fn warnings_recorded(&self) -> u64 {
        self.warnings_recorded.load(Ordering::Relaxed)
    }

    /// Clear the warning flag so the next over-limit send warns again.
    ///
    /// Returns false when the recipient has no record.
    pub async fn reset_warning(&self, email: &str) -> bool {
        let mut records = self.records.write().await;
        match records.get_mut(email) {
            Some(record) => {
                record.limit_warning_sent = false;
                info!(email, "Limit warning reset");
                true
            }
            None => false,
        }
    }

    /// Remove records with no timestamps left in the window and no active
    /// warning. Returns how many were removed.
    pub async fn prune(&self) -> usize {
        let cutoff = self.cutoff();
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| {
            record.retain_since(cutoff);
            record.sent_count() > 0 || record.limit_warning_sent
        });
        let removed = before - records.len();
        if removed > 0 {
            debug!(removed, "Pruned idle email histories");
        }
        removed
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn fetch_histories(
        &self,
        recipients: &[String],
    ) -> Result<Vec<EmailHistory>, StoreError> {
        let cutoff = self.cutoff();
        let records = self.records.read().await;

        let mut seen: HashSet<&str> = HashSet::new();
        let mut histories = Vec::new();
        for email in recipients {
            if !seen.insert(email.as_str()) {
                continue;
            }
            if let Some(record) = records.get(email) {
                let mut windowed = record.clone();
                windowed.retain_since(cutoff);
                histories.push(windowed);
            }
        }
        Ok(histories)
    }

    async fn refresh_histories(
        &self,
        records: &[EmailHistory],
        warning_just_sent: bool,
    ) -> Result<(), StoreError> {
        let cutoff = self.cutoff();
        let mut stored = self.records.write().await;
        for record in records {
            match stored.get_mut(&record.email) {
                Some(existing) => merge_into(existing, record, cutoff),
                None => {
                    stored.insert(record.email.clone(), record.clone());
                }
            }
        }
        drop(stored);

        if warning_just_sent {
            self.warnings_recorded
                .fetch_add(records.len() as u64, Ordering::Relaxed);
            info!(count = records.len(), "Recorded limit warnings");
        } else {
            debug!(count = records.len(), "Refreshed email histories");
        }
        Ok(())
    }
}

/// Fold `incoming` into `stored` without dropping writes `incoming` never saw.
///
/// Timestamps merge as a multiset: those already stored are matched once
/// each, the rest are appended. A set warning flag is only cleared when
/// `incoming` was built from every timestamp still in the window.
fn merge_into(stored: &mut EmailHistory, incoming: &EmailHistory, cutoff: DateTime<Utc>) {
    stored.retain_since(cutoff);

    let mut unseen = stored.sent_timestamps_24h.clone();
    let mut added = Vec::new();
    for ts in &incoming.sent_timestamps_24h {
        match unseen.iter().position(|t| t == ts) {
            Some(i) => {
                unseen.swap_remove(i);
            }
            None => added.push(*ts),
        }
    }

    stored.sent_timestamps_24h.extend(added);
    stored.sent_timestamps_24h.sort();
    stored.retain_since(cutoff);
    stored.limit_warning_sent =
        incoming.limit_warning_sent || (stored.limit_warning_sent && !unseen.is_empty());
}
